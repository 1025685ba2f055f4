//! AI-assisted bulk editing for flashcard sets.
//!
//! The library exposes the edit pipeline ([`assist::AssistService`]), the
//! HTTP surface around it ([`server`]) and the caller-side merge of proposed
//! changes ([`flashcards::apply_updates`]).

pub mod assist;
pub mod config;
pub mod flashcards;
pub mod server;

pub use assist::{AssistError, AssistResult, AssistService};
pub use config::AssistConfig;
pub use flashcards::{apply_updates, ApplyReport, AssistantResult, EditRequest, UpdateScope};
