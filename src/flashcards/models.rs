//! Data models for flashcard rows and AI edit proposals

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A flashcard as it appears in a set's grid
///
/// Identifiers and metadata are owned by the caller's store; only `front`,
/// `back` and `difficulty` are ever changed by an edit proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardRow {
    pub set_id: String,
    pub flashcard_id: String,
    #[serde(default)]
    pub front: String,
    #[serde(default)]
    pub back: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(
        rename = "created_at",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub position: i64,
}

impl FlashcardRow {
    pub fn new(set_id: impl Into<String>, flashcard_id: impl Into<String>) -> Self {
        Self {
            set_id: set_id.into(),
            flashcard_id: flashcard_id.into(),
            front: String::new(),
            back: String::new(),
            difficulty: None,
            tags: None,
            created_at: None,
            position: 0,
        }
    }
}

/// The cards and set metadata a single edit request is scoped to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequestContext {
    /// Cards the user selected. Empty means every card in the set is eligible.
    #[serde(default)]
    pub selected_cards: Vec<FlashcardRow>,
    #[serde(default)]
    pub set_title: String,
    #[serde(default)]
    pub total_cards: u64,
}

impl EditRequestContext {
    pub fn has_selection(&self) -> bool {
        !self.selected_cards.is_empty()
    }
}

/// Body accepted by the edit endpoint and the `propose` command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub model_id: String,
    #[serde(default)]
    pub context: EditRequestContext,
}

/// Partial change to a card. `None` (absent or `null`) leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,
    /// Kept as the exact JSON number the model produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Number>,
}

impl CardChanges {
    pub fn is_empty(&self) -> bool {
        self.front.is_none() && self.back.is_none() && self.difficulty.is_none()
    }
}

/// A change the model proposes for one card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedUpdate {
    pub flashcard_id: String,
    pub changes: CardChanges,
}

/// Validated outcome of one edit request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantResult {
    /// Human-readable explanation of what the model changed
    pub message: String,
    pub updates: Vec<ProposedUpdate>,
}
