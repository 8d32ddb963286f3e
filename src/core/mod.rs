pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod model;
