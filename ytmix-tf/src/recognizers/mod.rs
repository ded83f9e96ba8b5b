//! Recognition provider adapters
//!
//! Each adapter implements [`crate::types::Recognizer`] and maps every
//! provider fault to a [`crate::error::RecognitionFailure`].

pub mod songrec;

pub use songrec::{identification_from_payload, SongRecRecognizer};
