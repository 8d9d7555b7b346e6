pub mod config;
pub mod contact;
pub mod dashboard;
pub mod init;
pub mod projects;
pub mod wizard;
