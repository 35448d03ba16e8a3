//! Core domain models for Pipeline
//!
//! This module defines the fundamental data structures that represent
//! pipelines, steps, and their configuration.

pub mod config;
pub mod pipeline;
pub mod step;
pub mod condition;
pub mod state;

pub use pipeline::*;
pub use step::*;
pub use condition::*;
pub use state::*;
