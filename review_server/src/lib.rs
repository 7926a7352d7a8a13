pub mod config;
pub mod errors;
pub mod scheduler;
pub mod service;
