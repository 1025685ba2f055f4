//! The edit pipeline: credential → request → provider → validated result

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::errors::{AssistError, AssistResult};
use super::request::build_edit_request;
use super::response::parse_assistant_response;
use super::transport::{CompletionTransport, OpenRouterTransport};
use crate::config::{ApiKey, ProviderConfig};
use crate::flashcards::{AssistantResult, EditRequest};

/// Produces edit proposals for flashcard sets.
///
/// Holds no per-request state, so one instance is shared by every request.
pub struct AssistService {
    api_key: Option<ApiKey>,
    transport: Arc<dyn CompletionTransport>,
}

impl AssistService {
    pub fn new(api_key: Option<ApiKey>, transport: Arc<dyn CompletionTransport>) -> Self {
        Self { api_key, transport }
    }

    /// Service backed by OpenRouter using `config`'s endpoint and credential
    pub fn from_config(config: &ProviderConfig) -> AssistResult<Self> {
        let transport = OpenRouterTransport::new(config)?;
        if config.api_key().is_none() {
            log::warn!("No OpenRouter API key configured; edit requests will fail");
        }
        Ok(Self::new(config.api_key(), Arc::new(transport)))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Run one edit request end to end.
    pub async fn propose_edits(&self, request: &EditRequest) -> AssistResult<AssistantResult> {
        let request_id = Uuid::new_v4();

        let result = self.run(request_id, request).await;
        match &result {
            Ok(res) => log::info!(
                "Edit request {}: {} update(s) proposed",
                request_id,
                res.updates.len()
            ),
            Err(e) => log::error!("Edit request {} failed ({}): {}", request_id, e.kind().as_str(), e),
        }
        result
    }

    /// Like [`propose_edits`](Self::propose_edits), but gives up when `token` is cancelled.
    pub async fn propose_edits_until_cancelled(
        &self,
        request: &EditRequest,
        token: &CancellationToken,
    ) -> AssistResult<AssistantResult> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                log::info!("Edit request cancelled");
                Err(AssistError::Cancelled)
            }
            result = self.propose_edits(request) => result,
        }
    }

    async fn run(&self, request_id: Uuid, request: &EditRequest) -> AssistResult<AssistantResult> {
        let api_key = self.api_key.as_ref().ok_or(AssistError::MissingApiKey)?;

        let chat_request =
            build_edit_request(&request.prompt, &request.model_id, &request.context)?;

        log::info!(
            "Edit request {}: model {}, {} selected card(s) of {} in {:?}",
            request_id,
            chat_request.model,
            request.context.selected_cards.len(),
            request.context.total_cards,
            request.context.set_title
        );

        let raw = self.transport.complete(api_key, &chat_request).await?;
        parse_assistant_response(raw)
    }
}
