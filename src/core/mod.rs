//! Configuration and domain types shared by the API and worker sides

pub mod config;
pub mod models;
