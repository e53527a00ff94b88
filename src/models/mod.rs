pub mod cache;
pub mod ergast;
pub mod error;
pub mod lap;
pub mod response;
