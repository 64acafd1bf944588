//! Host environment checks

pub mod preflight;

pub use preflight::{check_host, REQUIRED_TOOLS};
