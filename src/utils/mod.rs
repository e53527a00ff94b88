pub mod aggregate;
pub mod config;
pub mod duration;
pub mod rate_limiter;
pub mod response_builder;
pub mod state;
