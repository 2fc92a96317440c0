//! Wire types for the Gemini `generateContent` REST endpoint.
//!
//! Only the fields the relay reads are modelled; everything else in the
//! upstream payload is ignored.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Generation, Source};

// ── Request ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

impl<'a> GenerateContentRequest<'a> {
    /// A single user turn with search grounding enabled.
    pub fn single_turn(message: &'a str, temperature: f32) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: message }],
            }],
            tools: vec![Tool { google_search: GoogleSearch {} }],
            generation_config: GenerationConfig { temperature },
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}

impl Candidate {
    fn text(&self) -> String {
        self.content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

impl GenerateContentResponse {
    /// Extracts the answer text and every web grounding source.
    ///
    /// The text comes from the first candidate that produced any; sources are
    /// collected across all candidates in upstream order.
    pub fn into_generation(self) -> Result<Generation, AppError> {
        let text = self
            .candidates
            .iter()
            .map(Candidate::text)
            .find(|t| !t.trim().is_empty());

        let Some(text) = text else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .or_else(|| self.candidates.iter().find_map(|c| c.finish_reason.clone()));
            return Err(AppError::malformed_upstream(match reason {
                Some(reason) => format!("no generated text (reason: {reason})"),
                None => "no generated text".to_string(),
            }));
        };

        let sources = self
            .candidates
            .into_iter()
            .filter_map(|c| c.grounding_metadata)
            .flat_map(|g| g.grounding_chunks)
            .filter_map(|chunk| chunk.web)
            .filter_map(|web| {
                web.uri.map(|uri| Source { title: web.title, uri })
            })
            .collect();

        Ok(Generation { text, sources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Result<Generation, AppError> {
        serde_json::from_str::<GenerateContentResponse>(json)
            .expect("fixture should deserialize")
            .into_generation()
    }

    #[test]
    fn request_uses_single_turn_with_search_tool() {
        let req = GenerateContentRequest::single_turn("What is the capital of France?", 0.7);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(
            value["contents"][0]["parts"][0]["text"],
            "What is the capital of France?"
        );
        assert_eq!(value["contents"].as_array().unwrap().len(), 1);
        assert!(value["tools"][0]["google_search"].is_object());
        assert!((value["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn joins_text_parts_and_collects_web_sources() {
        let generation = decode(
            r#"{
              "candidates": [{
                "content": { "parts": [ { "text": "Paris is the capital " }, { "text": "of France." } ] },
                "groundingMetadata": {
                  "groundingChunks": [
                    { "web": { "uri": "https://en.wikipedia.org/wiki/Paris", "title": "Wikipedia" } },
                    { "retrievedContext": { "uri": "ignored" } },
                    { "web": { "uri": "https://www.britannica.com/place/Paris" } }
                  ]
                }
              }]
            }"#,
        )
        .unwrap();

        assert_eq!(generation.text, "Paris is the capital of France.");
        assert_eq!(
            generation.sources,
            vec![
                Source {
                    title: Some("Wikipedia".into()),
                    uri: "https://en.wikipedia.org/wiki/Paris".into(),
                },
                Source { title: None, uri: "https://www.britannica.com/place/Paris".into() },
            ]
        );
    }

    #[test]
    fn missing_grounding_is_not_an_error() {
        let generation =
            decode(r#"{ "candidates": [ { "content": { "parts": [ { "text": "Hi" } ] } } ] }"#)
                .unwrap();
        assert_eq!(generation.text, "Hi");
        assert!(generation.sources.is_empty());
    }

    #[test]
    fn no_text_is_malformed() {
        let err = decode(r#"{ "promptFeedback": { "blockReason": "SAFETY" } }"#).unwrap_err();
        assert!(matches!(err, AppError::MalformedUpstreamResponse { .. }));
        assert!(err.to_string().contains("SAFETY"));

        let err = decode(r#"{ "candidates": [ { "finishReason": "RECITATION" } ] }"#).unwrap_err();
        assert!(err.to_string().contains("RECITATION"));
    }

    #[test]
    fn unexpected_shape_fails_to_deserialize() {
        assert!(serde_json::from_str::<GenerateContentResponse>(r#"{ "candidates": "nope" }"#).is_err());
    }
}
