//! AI-assisted bulk editing of flashcards
//!
//! A prompt plus the cards in scope go out to a chat-completion model with a
//! strict JSON schema; the answer comes back as validated per-card changes.

pub mod errors;
pub mod models;
pub mod request;
pub mod response;
pub mod service;
pub mod transport;

pub use errors::{AssistError, AssistResult, ErrorKind};
pub use request::build_edit_request;
pub use response::parse_assistant_response;
pub use service::AssistService;
pub use transport::{CompletionTransport, OpenRouterTransport};
