pub mod config;
pub mod error;
pub mod styling;
pub mod trace;

pub use error::TraceError;
