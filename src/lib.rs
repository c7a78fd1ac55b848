pub mod ai;
pub mod cli;
pub mod commands;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod pipeline;
pub mod platforms;
