//! Gemini-based moment selection.
//!
//! Sends the word-level transcript to the Gemini API and parses the response
//! into clip moments. The model's output is advisory: anything that does not
//! parse as the expected JSON array degrades to zero moments instead of
//! failing the request.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use podclip_models::{ClipMoment, TranscriptSegment, MAX_MOMENTS_PER_REQUEST};

use crate::error::{PipelineError, PipelineResult};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const GEMINI_MODEL: &str = "gemini-2.5-flash";

const MOMENT_PROMPT: &str = r#"This is a podcast video transcript consisting of words, along with each word's start and end time. I am looking to create clips between a minimum of 30 and maximum of 60 seconds long. The clip should never exceed 60 seconds.

Your task is to find and extract stories, or questions and their corresponding answers from the transcript.
Each clip should begin with the question and conclude with the answer.
It is acceptable for the clip to include a few additional sentences before a question if it aids in contextualizing the question.

Please adhere to the following rules:
- Ensure that clips do not overlap with one another.
- Start and end timestamps of the clips should align perfectly with the sentence boundaries in the transcript.
- Only use the start and end timestamps provided in the input. Modifying timestamps is not allowed.
- Format the output as a list of JSON objects, each representing a clip with 'start' and 'end' timestamps: [{"start": seconds, "end": seconds}, ...]. The output must be strictly valid JSON.
- Aim to generate longer clips between 40-60 seconds, and ensure to include as much content from the context as viable.

Avoid including:
- Moments of greeting, thanking, or saying goodbye.
- Non-question and answer interactions.

If there are no valid clips to extract, the output should be an empty list [], in JSON format."#;

/// Gemini API client.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    client: Client,
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

impl GeminiClient {
    /// Create a new client from the environment.
    pub fn from_env() -> PipelineResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| PipelineError::config_error("GEMINI_API_KEY not set"))?;
        Ok(Self::with_base_url(api_key, DEFAULT_BASE_URL))
    }

    /// Create a client against a specific endpoint (used by tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    /// Select up to three clip moments from a transcript.
    ///
    /// Request failures propagate; unparseable model output does not.
    pub async fn select_moments(
        &self,
        transcript: &[TranscriptSegment],
    ) -> PipelineResult<Vec<ClipMoment>> {
        let prompt = build_prompt(transcript)?;
        let text = self.generate(&prompt).await?;
        debug!("Moment selection response: {}", text);

        let moments = parse_moments(&text);
        info!("Selected {} clip moments", moments.len());
        Ok(moments)
    }

    /// Call the generateContent endpoint and return the response text.
    async fn generate(&self, prompt: &str) -> PipelineResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, GEMINI_MODEL, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::model_request(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::model_request(format!(
                "Gemini API returned {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            PipelineError::model_request(format!("Failed to parse Gemini response: {}", e))
        })?;

        gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| PipelineError::model_request("No content in Gemini response"))
    }
}

/// Serialize the transcript into the selection prompt.
fn build_prompt(transcript: &[TranscriptSegment]) -> PipelineResult<String> {
    let transcript_json = serde_json::to_string(transcript)
        .map_err(|e| PipelineError::model_request(format!("transcript serialization: {}", e)))?;
    Ok(format!(
        "{}\n\nThe transcript is as follows:\n\n{}",
        MOMENT_PROMPT, transcript_json
    ))
}

/// Parse the model's text into moments, failing open.
///
/// Tolerates a markdown code fence around the array. Malformed output or a
/// non-array yields zero moments; moments with `end <= start` are dropped;
/// at most the first three valid moments are kept.
pub(crate) fn parse_moments(text: &str) -> Vec<ClipMoment> {
    let cleaned = strip_code_fence(text.trim());

    match serde_json::from_str::<Vec<ClipMoment>>(cleaned) {
        Ok(moments) => moments
            .into_iter()
            .filter(|m| {
                if m.is_valid() {
                    true
                } else {
                    warn!("Dropping invalid moment {:?}", m);
                    false
                }
            })
            .take(MAX_MOMENTS_PER_REQUEST)
            .collect(),
        Err(e) => {
            warn!("Model output is not a moment list ({}); using no moments", e);
            Vec::new()
        }
    }
}

/// Strip a surrounding markdown code fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_plain_array() {
        let moments = parse_moments(r#"[{"start": 10.0, "end": 45.5}]"#);
        assert_eq!(moments, vec![ClipMoment::new(10.0, 45.5)]);
    }

    #[test]
    fn test_parse_fenced_array() {
        let moments = parse_moments("```json\n[{\"start\": 0, \"end\": 2}]\n```");
        assert_eq!(moments, vec![ClipMoment::new(0.0, 2.0)]);
    }

    #[test]
    fn test_parse_fenced_empty_array() {
        assert!(parse_moments("```json\n[]\n```").is_empty());
    }

    #[test]
    fn test_parse_bare_fence() {
        let moments = parse_moments("```\n[{\"start\": 1, \"end\": 3}]\n```");
        assert_eq!(moments, vec![ClipMoment::new(1.0, 3.0)]);
    }

    #[test]
    fn test_malformed_output_fails_open() {
        assert!(parse_moments("I could not find any clips, sorry!").is_empty());
        assert!(parse_moments("{\"start\": 1, \"end\": 2}").is_empty());
        assert!(parse_moments("").is_empty());
    }

    #[test]
    fn test_invalid_moments_dropped() {
        let moments = parse_moments(
            r#"[{"start": 5, "end": 5}, {"start": 9, "end": 3}, {"start": 0, "end": 30}]"#,
        );
        assert_eq!(moments, vec![ClipMoment::new(0.0, 30.0)]);
    }

    #[test]
    fn test_at_most_three_moments() {
        let moments = parse_moments(
            r#"[{"start":0,"end":30},{"start":40,"end":70},{"start":80,"end":110},{"start":120,"end":150}]"#,
        );
        assert_eq!(moments.len(), 3);
        assert_eq!(moments[2], ClipMoment::new(80.0, 110.0));
    }

    #[tokio::test]
    async fn test_select_moments_with_stub_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!(
                "/v1beta/models/{}:generateContent",
                GEMINI_MODEL
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "parts": [{"text": "[{\"start\": 0, \"end\": 2}]"}]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url("test-key", server.uri());
        let transcript = vec![
            TranscriptSegment::new(0.0, 1.0, "Hi"),
            TranscriptSegment::new(1.0, 2.0, "there"),
        ];

        let moments = client.select_moments(&transcript).await.unwrap();
        assert_eq!(moments, vec![ClipMoment::new(0.0, 2.0)]);
    }

    #[tokio::test]
    async fn test_select_moments_fenced_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "```json\n[]\n```"}]}
                }]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url("test-key", server.uri());
        let moments = client.select_moments(&[]).await.unwrap();
        assert!(moments.is_empty());
    }

    #[tokio::test]
    async fn test_api_error_propagates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url("test-key", server.uri());
        let err = client.select_moments(&[]).await.unwrap_err();
        assert!(matches!(err, PipelineError::ModelRequest(_)));
    }

    #[test]
    fn test_prompt_contains_transcript() {
        let prompt = build_prompt(&[TranscriptSegment::new(0.0, 1.0, "Hi")]).unwrap();
        assert!(prompt.contains("\"word\":\"Hi\""));
        assert!(prompt.contains("30"));
    }
}
