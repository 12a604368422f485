//! Flavor facts about countries.
//!
//! The fact service never fails from the caller's point of view: network
//! and service errors are logged here and replaced with fixed fallback text.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::config::AppConfig;
use crate::llm_client::{LlmClient, LlmError};

/// Shown when the service answers with nothing for a short fact.
pub const EMPTY_FACT: &str = "This country has a rich and diverse culture!";

/// Shown when a short fact cannot be fetched.
pub const FALLBACK_FACT: &str = "Keep going! You're doing great at geography!";

/// Shown when the service answers with nothing for a detailed summary.
pub const EMPTY_DETAIL: &str = "Information currently being updated by our global explorers.";

/// Shown when a detailed summary cannot be fetched.
pub const FALLBACK_DETAIL: &str =
    "We couldn't reach the archives right now, but this country is definitely worth a visit!";

const SYSTEM_PROMPT: &str =
    "You are the narrator of a geography trivia game. Answer in plain text without markdown.";

/// Source of short and detailed country descriptions.
#[async_trait]
pub trait FactService: Send + Sync {
    /// One surprising sentence about the country.
    async fn short_fact(&self, country_name: &str) -> String;

    /// A few sentences covering capital, a landmark and something unique.
    async fn detailed_info(&self, country_name: &str) -> String;
}

/// Fact service backed by a text-generation model.
#[derive(Debug, Clone)]
pub struct LlmFactService {
    client: LlmClient,
}

impl LlmFactService {
    /// Creates a fact service using `client`.
    #[instrument(skip(client))]
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Turns a generation result into display text.
    fn settle(result: Result<String, LlmError>, empty: &str, fallback: &str) -> String {
        match result {
            Ok(text) if text.trim().is_empty() => empty.to_string(),
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "Fact request failed, using fallback text");
                fallback.to_string()
            }
        }
    }
}

#[async_trait]
impl FactService for LlmFactService {
    #[instrument(skip(self))]
    async fn short_fact(&self, country_name: &str) -> String {
        let prompt = format!(
            "Provide a short (one sentence), interesting, and surprising fact about the country: {}. Make it fun for a game player.",
            country_name
        );
        let result = self.client.generate(SYSTEM_PROMPT, &prompt).await;
        Self::settle(result, EMPTY_FACT, FALLBACK_FACT)
    }

    #[instrument(skip(self))]
    async fn detailed_info(&self, country_name: &str) -> String {
        let prompt = format!(
            "Provide a detailed 3-sentence summary about the country {}. Include its capital, a famous landmark, and something unique about its geography or history.",
            country_name
        );
        let result = self.client.generate(SYSTEM_PROMPT, &prompt).await;
        Self::settle(result, EMPTY_DETAIL, FALLBACK_DETAIL)
    }
}

/// Fact service that never touches the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFactService;

#[async_trait]
impl FactService for OfflineFactService {
    async fn short_fact(&self, _country_name: &str) -> String {
        FALLBACK_FACT.to_string()
    }

    async fn detailed_info(&self, _country_name: &str) -> String {
        FALLBACK_DETAIL.to_string()
    }
}

/// Builds the fact service described by `config`.
///
/// Falls back to [`OfflineFactService`] when the provider is offline, its
/// API key is missing, or the HTTP client cannot be built.
#[instrument(skip(config), fields(provider = %config.fact_provider()))]
pub fn fact_service_from_config(config: &AppConfig) -> Arc<dyn FactService> {
    let llm_config = match config.create_llm_config() {
        Ok(Some(llm_config)) => llm_config,
        Ok(None) => {
            info!("Using offline fact service");
            return Arc::new(OfflineFactService);
        }
        Err(e) => {
            warn!(error = %e, "Fact provider unavailable, using offline fact service");
            return Arc::new(OfflineFactService);
        }
    };

    match LlmClient::new(llm_config) {
        Ok(client) => {
            info!(model = %client.config().model(), "Using LLM fact service");
            Arc::new(LlmFactService::new(client))
        }
        Err(e) => {
            warn!(error = %e, "Could not create LLM client, using offline fact service");
            Arc::new(OfflineFactService)
        }
    }
}
