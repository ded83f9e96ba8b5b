//! # ytmix Common Library
//!
//! Shared code for the ytmix tools including:
//! - Common error and result types
//! - Bootstrap configuration loading (TOML)
//! - Human-readable timestamp formatting

pub mod config;
pub mod error;
pub mod human_time;

pub use error::{Error, Result};
