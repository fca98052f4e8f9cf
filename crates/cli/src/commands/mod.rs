pub mod blog;
pub mod config;
pub mod doctor;
pub mod publishers;
pub mod sns;
