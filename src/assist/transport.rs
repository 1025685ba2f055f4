//! Sending chat-completion requests to the provider

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;

use super::errors::{AssistError, AssistResult};
use super::models::ChatCompletionRequest;
use crate::config::{ApiKey, ProviderConfig};

/// One round trip to a chat-completion API
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Send `request` and return the provider's JSON body.
    async fn complete(
        &self,
        api_key: &ApiKey,
        request: &ChatCompletionRequest,
    ) -> AssistResult<Value>;
}

/// OpenRouter client
pub struct OpenRouterTransport {
    client: Client,
    endpoint: String,
    referrer: String,
    title: String,
}

impl OpenRouterTransport {
    pub fn new(config: &ProviderConfig) -> AssistResult<Self> {
        config
            .validate()
            .map_err(|e| AssistError::Configuration(e.to_string()))?;

        let mut builder = Client::builder().connect_timeout(Duration::from_secs(10));
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint.clone(),
            referrer: config.referrer.clone(),
            title: config.title.clone(),
        })
    }
}

#[async_trait]
impl CompletionTransport for OpenRouterTransport {
    async fn complete(
        &self,
        api_key: &ApiKey,
        request: &ChatCompletionRequest,
    ) -> AssistResult<Value> {
        log::debug!("POST {} (model {})", self.endpoint, request.model);

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", api_key.expose()))
            .header("HTTP-Referer", &self.referrer)
            .header("X-Title", &self.title)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log::warn!("OpenRouter returned {}: {}", status, body);
            return Err(AssistError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            AssistError::MalformedResponse(format!("provider returned a non-JSON body: {}", e))
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Transport that replays a fixed outcome and counts calls
    pub struct ScriptedTransport {
        outcome: Box<dyn Fn() -> AssistResult<Value> + Send + Sync>,
        calls: AtomicUsize,
        pub last_request: Mutex<Option<Value>>,
    }

    impl ScriptedTransport {
        /// Respond with a chat envelope whose first choice carries `content`.
        pub fn replying(content: &str) -> Self {
            let envelope = serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": content } }]
            });
            Self::with(move || Ok(envelope.clone()))
        }

        pub fn with<F>(outcome: F) -> Self
        where
            F: Fn() -> AssistResult<Value> + Send + Sync + 'static,
        {
            Self {
                outcome: Box::new(outcome),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionTransport for ScriptedTransport {
        async fn complete(
            &self,
            _api_key: &ApiKey,
            request: &ChatCompletionRequest,
        ) -> AssistResult<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = serde_json::to_value(request).ok();
            (self.outcome)()
        }
    }
}
