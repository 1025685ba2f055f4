//! Building the chat-completion request for an edit

use serde::Serialize;
use serde_json::{json, Value};

use super::errors::{AssistError, AssistResult};
use super::models::{ChatCompletionRequest, ChatMessage, JsonSchemaFormat, ResponseFormat};
use crate::flashcards::{EditRequestContext, FlashcardRow};

/// Name given to the structured-output schema
pub const RESPONSE_SCHEMA_NAME: &str = "flashcard_updates";

const ROLE_INSTRUCTION: &str = "You are an assistant that edits flashcards in a study set. \
Each flashcard has a front (the question or prompt), a back (the answer) and an optional \
numeric difficulty. Follow the user's instructions and propose changes to the cards.";

const SHAPE_INSTRUCTION: &str = "Respond with a JSON object containing exactly two fields: \
\"message\", a short string explaining what you changed, and \"updates\", an array of \
objects of the form {\"flashcardId\": string, \"changes\": {\"front\": string|null, \
\"back\": string|null, \"difficulty\": number|null}}. Use the flashcardId values exactly as \
given. Set a field to null to leave it unchanged. Only include cards you actually change; \
return an empty updates array if no change is needed.";

#[derive(Serialize)]
struct UserPayload<'a> {
    prompt: &'a str,
    flashcards: &'a [FlashcardRow],
    set_info: SetInfo<'a>,
}

#[derive(Serialize)]
struct SetInfo<'a> {
    title: &'a str,
    total_cards: u64,
}

/// Build the provider request for `prompt` over the cards in `context`.
///
/// Both the prompt and the model id are sent trimmed. Fails with an input
/// error when either is blank.
pub fn build_edit_request(
    prompt: &str,
    model_id: &str,
    context: &EditRequestContext,
) -> AssistResult<ChatCompletionRequest> {
    let prompt = prompt.trim();
    let model_id = model_id.trim();

    if prompt.is_empty() {
        return Err(AssistError::Input("prompt is required".to_string()));
    }
    if model_id.is_empty() {
        return Err(AssistError::Input("model_id is required".to_string()));
    }

    let payload = UserPayload {
        prompt,
        flashcards: &context.selected_cards,
        set_info: SetInfo {
            title: &context.set_title,
            total_cards: context.total_cards,
        },
    };
    let user_content = serde_json::to_string_pretty(&payload)
        .map_err(|e| AssistError::Input(format!("Failed to serialize flashcards: {}", e)))?;

    Ok(ChatCompletionRequest {
        model: model_id.to_string(),
        messages: vec![
            ChatMessage::system(system_instruction(context)),
            ChatMessage::user(user_content),
        ],
        response_format: ResponseFormat::JsonSchema {
            json_schema: JsonSchemaFormat {
                name: RESPONSE_SCHEMA_NAME.to_string(),
                strict: true,
                schema: response_schema(),
            },
        },
    })
}

/// System instruction: role, scoping rule, and response shape
pub fn system_instruction(context: &EditRequestContext) -> String {
    let scope = if context.has_selection() {
        let count = context.selected_cards.len();
        format!(
            "The user has selected {} flashcard{}. Only propose changes to these selected \
             cards and do not modify any other card in the set.",
            count,
            if count == 1 { "" } else { "s" }
        )
    } else {
        "No cards are selected, so you may propose changes to any card in the set.".to_string()
    };

    format!("{}\n\n{}\n\n{}", ROLE_INSTRUCTION, scope, SHAPE_INSTRUCTION)
}

/// Strict JSON schema the model's answer must follow
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "message": { "type": "string" },
            "updates": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "flashcardId": { "type": "string" },
                        "changes": {
                            "type": "object",
                            "properties": {
                                "front": { "type": ["string", "null"] },
                                "back": { "type": ["string", "null"] },
                                "difficulty": { "type": ["number", "null"] }
                            },
                            "required": ["front", "back", "difficulty"],
                            "additionalProperties": false
                        }
                    },
                    "required": ["flashcardId", "changes"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["message", "updates"],
        "additionalProperties": false
    })
}
