pub mod config;
pub mod converter;
pub mod error;
pub mod indexer;
pub mod logger;
pub mod pool;
pub mod run;
pub mod tiler;
