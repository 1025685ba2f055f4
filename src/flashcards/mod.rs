//! Flashcard rows and AI edit proposals
//!
//! This module provides:
//! - The row and request models shared with the grid editor
//! - The proposal types produced by the response validator
//! - Merging of validated proposals onto a caller's rows
//! - The same merge over rows saved as JSON files

pub mod applier;
pub mod files;
pub mod models;

pub use applier::{apply_updates, ApplyReport, UpdateScope};
pub use files::{apply_result_files, AppliedFiles, RowFilesError};
pub use models::*;
