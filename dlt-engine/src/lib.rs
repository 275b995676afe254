pub mod config;
pub mod engine;
pub mod format;
pub mod frequency;
pub mod history;
pub mod pool;
pub mod sampler;
pub mod scoring;
pub mod strategies;
