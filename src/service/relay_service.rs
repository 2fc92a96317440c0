use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::agent::GenerationClient;
use crate::errors::AppError;
use crate::models::{AskRequest, AskResponse};
use crate::service::citations::normalize_citations;
use crate::service::pacer::Pacer;

/// Stateless relay between the chat client and the generation API.
///
/// Each accepted message becomes exactly one upstream call; nothing is kept
/// between requests apart from the pacing clock.
#[derive(Clone)]
pub struct RelayService {
    generator: Arc<dyn GenerationClient>,
    pacer: Arc<Pacer>,
    max_message_chars: usize,
}

impl RelayService {
    pub fn new(
        generator: Arc<dyn GenerationClient>,
        pacer: Pacer,
        max_message_chars: usize,
    ) -> Self {
        Self { generator, pacer: Arc::new(pacer), max_message_chars }
    }

    pub async fn ask(&self, request: AskRequest) -> Result<AskResponse, AppError> {
        // ── Validation ────────────────────────────────────────────────────────
        let message = request.message.trim();
        if message.is_empty() {
            return Err(AppError::empty_field("message"));
        }
        let length = message.chars().count();
        if length > self.max_message_chars {
            return Err(AppError::FieldTooLong {
                field_name: "message".to_string(),
                max_length: self.max_message_chars,
                actual_length: length,
            });
        }

        // ── One upstream call ─────────────────────────────────────────────────
        self.pacer.wait_turn().await;
        debug!("Forwarding {length}-char message upstream");
        let generation = self.generator.generate(message).await?;

        let citations = normalize_citations(&generation.sources);
        info!(
            "Relayed answer with {} citations ({} raw sources)",
            citations.len(),
            generation.sources.len()
        );

        Ok(AskResponse {
            text: generation.text,
            citations,
            timestamp: Utc::now(),
        })
    }
}
