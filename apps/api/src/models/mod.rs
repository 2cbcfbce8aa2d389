pub mod application;
pub mod assessment;
pub mod interview;
pub mod job;
