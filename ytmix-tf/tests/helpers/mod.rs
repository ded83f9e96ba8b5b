//! Test Helper Utilities
//!
//! Shared utilities for testing ytmix-tf

#![allow(dead_code)]

pub mod audio_generator;
pub mod fakes;

pub use audio_generator::{generate_test_wav, silent_asset, ToneConfig};
pub use fakes::{ident, FakeSource, Scripted, ScriptedRecognizer};
