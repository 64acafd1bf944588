//! Core domain models for provisor
//!
//! This module defines the fundamental data structures that represent
//! settings, operator configuration, steps and run state.

pub mod catalog;
pub mod config;
pub mod plan;
pub mod settings;
pub mod state;
pub mod step;

pub use config::*;
pub use plan::*;
pub use settings::*;
pub use state::*;
pub use step::*;
