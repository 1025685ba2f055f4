//! Validating the provider's answer
//!
//! Three stages, each with its own error kind: the envelope must carry a
//! first choice with content, the content must be JSON, and the JSON must
//! have the update shape. Only shape is checked here; whether the ids exist
//! is the applier's concern.

use serde_json::{Map, Value};

use super::errors::{AssistError, AssistResult};
use super::models::ChatCompletionResponse;
use crate::flashcards::{AssistantResult, CardChanges, ProposedUpdate};

/// Turn a raw provider response into a validated result.
pub fn parse_assistant_response(raw: Value) -> AssistResult<AssistantResult> {
    let content = extract_content(raw)?;

    let parsed: Value = serde_json::from_str(&content).map_err(|e| {
        log::debug!("Unparseable AI content: {}", content);
        AssistError::Parse(e)
    })?;

    validate_result(parsed)
}

/// Content of the first choice in a chat-completion envelope
fn extract_content(raw: Value) -> AssistResult<String> {
    let envelope: ChatCompletionResponse = serde_json::from_value(raw)
        .map_err(|e| AssistError::MalformedResponse(format!("unexpected envelope: {}", e)))?;

    if let Some(error) = envelope.error {
        let message = error
            .message
            .unwrap_or_else(|| "provider returned an error".to_string());
        return Err(AssistError::MalformedResponse(match error.code {
            Some(code) => format!("{} (code {})", message, code),
            None => message,
        }));
    }

    envelope
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| {
            AssistError::MalformedResponse("no message content in first choice".to_string())
        })
}

/// Check the parsed content against the update shape.
pub fn validate_result(parsed: Value) -> AssistResult<AssistantResult> {
    let Value::Object(mut root) = parsed else {
        return Err(AssistError::schema("$", "must be a JSON object"));
    };

    let message = match root.remove("message") {
        Some(Value::String(message)) => message,
        _ => return Err(AssistError::schema("message", "must be a string")),
    };

    let entries = match root.remove("updates") {
        Some(Value::Array(entries)) => entries,
        _ => return Err(AssistError::schema("updates", "must be an array")),
    };

    let updates = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| validate_update(index, entry))
        .collect::<AssistResult<Vec<_>>>()?;

    Ok(AssistantResult { message, updates })
}

fn validate_update(index: usize, entry: Value) -> AssistResult<ProposedUpdate> {
    let path = format!("updates[{}]", index);

    let Value::Object(mut entry) = entry else {
        return Err(AssistError::schema(path, "must be an object"));
    };

    let flashcard_id = match entry.remove("flashcardId") {
        Some(Value::String(id)) if !id.trim().is_empty() => id,
        _ => {
            return Err(AssistError::schema(
                format!("{}.flashcardId", path),
                "must be a non-empty string",
            ))
        }
    };

    let changes = match entry.remove("changes") {
        Some(Value::Object(changes)) if !changes.is_empty() => changes,
        _ => {
            return Err(AssistError::schema(
                format!("{}.changes", path),
                "must be a non-empty object",
            ))
        }
    };

    Ok(ProposedUpdate {
        flashcard_id,
        changes: decode_changes(&path, changes)?,
    })
}

fn decode_changes(path: &str, changes: Map<String, Value>) -> AssistResult<CardChanges> {
    for (field, expected) in [("front", "string"), ("back", "string"), ("difficulty", "number")] {
        let ok = match changes.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::String(_)) => expected == "string",
            Some(Value::Number(_)) => expected == "number",
            Some(_) => false,
        };
        if !ok {
            return Err(AssistError::schema(
                format!("{}.changes.{}", path, field),
                format!("must be a {} or null", expected),
            ));
        }
    }

    let extra: Vec<&String> = changes
        .keys()
        .filter(|k| !matches!(k.as_str(), "front" | "back" | "difficulty"))
        .collect();
    if !extra.is_empty() {
        log::debug!("Ignoring unsupported change fields at {}: {:?}", path, extra);
    }

    serde_json::from_value(Value::Object(changes))
        .map_err(|e| AssistError::schema(format!("{}.changes", path), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::errors::ErrorKind;
    use serde_json::{json, Number};

    fn envelope(content: &str) -> Value {
        json!({
            "id": "gen-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
        })
    }

    fn schema_path(err: AssistError) -> String {
        match err {
            AssistError::Schema { path, .. } => path,
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_well_formed_response_round_trips() {
        let content = json!({
            "message": "Tightened wording",
            "updates": [
                { "flashcardId": "c1", "changes": { "front": "What is ATP?", "back": null, "difficulty": null } },
                { "flashcardId": "c2", "changes": { "difficulty": 2.5 } },
                { "flashcardId": "c3", "changes": { "back": "Mitochondria" } }
            ]
        })
        .to_string();

        let result = parse_assistant_response(envelope(&content)).unwrap();

        assert_eq!(result.message, "Tightened wording");
        assert_eq!(result.updates.len(), 3);
        assert_eq!(result.updates[0].flashcard_id, "c1");
        assert_eq!(result.updates[0].changes.front.as_deref(), Some("What is ATP?"));
        assert_eq!(result.updates[0].changes.back, None);
        assert_eq!(result.updates[1].changes.difficulty, Number::from_f64(2.5));
    }

    #[test]
    fn test_empty_updates_is_valid() {
        let result =
            parse_assistant_response(envelope(r#"{"message":"Nothing to do","updates":[]}"#))
                .unwrap();
        assert!(result.updates.is_empty());
    }

    #[test]
    fn test_missing_updates_is_schema_error() {
        let err = parse_assistant_response(envelope(r#"{"message":"ok"}"#)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaError);
        assert_eq!(schema_path(err), "updates");
    }

    #[test]
    fn test_updates_not_array_is_schema_error() {
        let err =
            parse_assistant_response(envelope(r#"{"message":"ok","updates":{"c1":{}}}"#))
                .unwrap_err();
        assert_eq!(schema_path(err), "updates");
    }

    #[test]
    fn test_message_not_string_is_schema_error() {
        let err =
            parse_assistant_response(envelope(r#"{"message":42,"updates":[]}"#)).unwrap_err();
        assert_eq!(schema_path(err), "message");
    }

    #[test]
    fn test_truncated_content_is_parse_error() {
        let err = parse_assistant_response(envelope(r#"{"message": "ok", "up"#)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
        assert!(err.to_string().contains("EOF"));
    }

    #[test]
    fn test_missing_flashcard_id_cites_index() {
        let content = json!({
            "message": "ok",
            "updates": [
                { "flashcardId": "c1", "changes": { "front": "x" } },
                { "changes": { "front": "y" } }
            ]
        })
        .to_string();

        let err = parse_assistant_response(envelope(&content)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaError);
        assert!(err.to_string().contains("updates[1]"));
        assert_eq!(schema_path(err), "updates[1].flashcardId");
    }

    #[test]
    fn test_empty_flashcard_id_rejected() {
        let content = r#"{"message":"ok","updates":[{"flashcardId":"","changes":{"front":"x"}}]}"#;
        let err = parse_assistant_response(envelope(content)).unwrap_err();
        assert_eq!(schema_path(err), "updates[0].flashcardId");
    }

    #[test]
    fn test_empty_changes_rejected() {
        let content = r#"{"message":"ok","updates":[{"flashcardId":"c1","changes":{}}]}"#;
        let err = parse_assistant_response(envelope(content)).unwrap_err();
        assert_eq!(schema_path(err), "updates[0].changes");
    }

    #[test]
    fn test_wrong_field_type_rejected() {
        let content =
            r#"{"message":"ok","updates":[{"flashcardId":"c1","changes":{"difficulty":"hard"}}]}"#;
        let err = parse_assistant_response(envelope(content)).unwrap_err();
        assert_eq!(schema_path(err), "updates[0].changes.difficulty");
    }

    #[test]
    fn test_non_object_content_rejected() {
        let err = parse_assistant_response(envelope("[1, 2]")).unwrap_err();
        assert_eq!(schema_path(err), "$");
    }

    #[test]
    fn test_missing_choices_is_malformed() {
        let err = parse_assistant_response(json!({ "id": "gen-1" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponseError);
    }

    #[test]
    fn test_empty_content_is_malformed() {
        let err = parse_assistant_response(envelope("  ")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponseError);

        let err = parse_assistant_response(json!({
            "choices": [{ "message": { "role": "assistant", "content": null } }]
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponseError);
    }

    #[test]
    fn test_provider_error_body_is_malformed() {
        let err = parse_assistant_response(json!({
            "error": { "message": "Rate limit exceeded", "code": 429 }
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponseError);
        assert!(err.to_string().contains("Rate limit exceeded"));
    }
}
