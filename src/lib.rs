pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod proxy;
pub mod scanner;
