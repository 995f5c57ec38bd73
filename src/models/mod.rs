pub mod activity_log;
pub mod admin;
pub mod question;
pub mod result;
pub mod school;
pub mod student;
