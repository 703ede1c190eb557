pub mod config;
pub mod cover;
pub mod database;
pub mod domain;
