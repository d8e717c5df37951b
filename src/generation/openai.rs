//! OpenAI-compatible generator
//!
//! Implements ContentGenerator by making chat completion calls to any
//! OpenAI-compatible API endpoint (OpenAI, Ollama, vLLM, LM Studio, etc.).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analyzer::InsightRequest;
use crate::config::OpenAiSettings;
use crate::error::{Error, Result};
use crate::persona::Persona;
use crate::types::{ContentKind, ContentPiece};

use super::{ContentGenerator, GeneratedContent};

const WRITER_INSTRUCTIONS: &str = "You are a content writer for NovaMind, an AI startup that helps \
small creative agencies automate their daily workflows (think Notion + Zapier + ChatGPT combined).";

const ANALYST_INSTRUCTIONS: &str = "You are a marketing analytics expert for NovaMind. \
Always provide data-driven insights and actionable recommendations.";

/// Characters of the original body quoted in variation prompts
const VARIATION_EXCERPT_CHARS: usize = 1200;

// ─────────────────────────────────────────────────────────────────
// OpenAI API types (request/response)
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// JSON contract the prompts ask for
#[derive(Debug, Deserialize)]
struct ContentJson {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subject_line: Option<String>,
    content: String,
}

// ─────────────────────────────────────────────────────────────────
// OpenAI Generator
// ─────────────────────────────────────────────────────────────────

/// OpenAI-compatible API generator
pub struct OpenAiGenerator {
    settings: OpenAiSettings,
    client: Client,
}

impl OpenAiGenerator {
    /// Create a new generator with the given settings
    pub fn new(settings: OpenAiSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::generation(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            base_url = %settings.base_url,
            model = %settings.model,
            "OpenAI-compatible generator created"
        );

        Ok(Self { settings, client })
    }

    /// Build the authorization header value (if API key is set)
    fn auth_header(&self) -> Option<String> {
        if self.settings.api_key.is_empty() {
            None
        } else {
            Some(format!("Bearer {}", self.settings.api_key))
        }
    }

    /// Make one chat completion request.
    ///
    /// Failed requests are not repeated here; the orchestrator owns the
    /// per-slot retry budget.
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request_body = ChatCompletionRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: Some(0.7),
        };

        let url = format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'));

        let mut req = self.client.post(&url).json(&request_body);
        if let Some(ref auth) = self.auth_header() {
            req = req.header("Authorization", auth);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                warn!(error = %e, "Connection error");
                Error::generation(format!("Connection error: {}", e))
            } else {
                Error::generation(format!("Request error: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 || status.is_server_error() {
                warn!(status = %status, "Transient API error: {}", body);
            } else {
                debug!(status = %status, "API error: {}", body);
            }
            return Err(Error::generation(format!("API error {}: {}", status, body)));
        }

        let parsed = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| Error::GenerationMalformed {
                message: format!("Failed to parse API response: {}", e),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::GenerationMalformed {
                message: "No choices in API response".to_string(),
            })
    }

    /// Run a prompt that must answer with the content JSON contract
    async fn generate_json(&self, prompt: String) -> Result<GeneratedContent> {
        let raw = self
            .chat_completion(vec![
                ChatMessage::system(WRITER_INSTRUCTIONS),
                ChatMessage::user(prompt),
            ])
            .await?;
        parse_content(&raw)
    }
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate_blog(&self, topic: &str) -> Result<GeneratedContent> {
        debug!(topic, "Requesting blog post");
        self.generate_json(blog_prompt(topic)).await
    }

    async fn generate_newsletter(&self, topic: &str, persona: &Persona) -> Result<GeneratedContent> {
        debug!(topic, persona = %persona.id, "Requesting newsletter");
        self.generate_json(newsletter_prompt(topic, persona)).await
    }

    async fn generate_variation(
        &self,
        original: &ContentPiece,
        feedback: &str,
    ) -> Result<GeneratedContent> {
        debug!(content_id = %original.id, "Requesting improved variation");
        self.generate_json(variation_prompt(original, feedback)).await
    }

    async fn write_insight(&self, request: &InsightRequest) -> Result<String> {
        let data = serde_json::to_string_pretty(request)?;
        let prompt = format!(
            "Analyze the following email campaign performance data for the topic \"{}\".\n\n\
             Performance Data:\n{}\n\n\
             In 3-5 sentences, say which segment and content performed best and why, \
             how the weakest piece compares, and one concrete change for the next variation. \
             Respond with plain text only.",
            request.topic, data
        );

        let text = self
            .chat_completion(vec![
                ChatMessage::system(ANALYST_INSTRUCTIONS),
                ChatMessage::user(prompt),
            ])
            .await?;

        let text = text.trim();
        if text.is_empty() {
            return Err(Error::GenerationMalformed {
                message: "Empty insight".to_string(),
            });
        }
        Ok(text.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────
// Prompts
// ─────────────────────────────────────────────────────────────────

fn blog_prompt(topic: &str) -> String {
    let (min, max) = ContentKind::Blog.word_range();
    format!(
        "Write a blog post about: {topic}\n\n\
         Requirements:\n\
         - Length: {min}-{max} words\n\
         - Target audience: Small creative agencies and automation enthusiasts\n\
         - Tone: Professional yet approachable, innovative\n\
         - Include: Introduction, 2-3 main sections, conclusion with CTA\n\
         - Focus on practical value and real-world applications\n\n\
         Respond with ONLY valid JSON using this exact format:\n\
         {{\"title\": \"Your compelling title here\", \"content\": \"Full blog post content in markdown format here\"}}"
    )
}

fn newsletter_prompt(topic: &str, persona: &Persona) -> String {
    let (min, max) = ContentKind::Newsletter.word_range();
    format!(
        "You are writing a newsletter for NovaMind targeting {name}.\n\n\
         Topic: {topic}\n\
         Focus Areas: {focus}\n\
         Tone: {tone}\n\n\
         Create a personalized newsletter ({min}-{max} words) that:\n\
         - Highlights aspects most relevant to this persona\n\
         - Uses language and examples that resonate with them\n\
         - Includes a clear CTA to read the full blog post\n\
         - Has an engaging subject line\n\n\
         Respond with ONLY valid JSON using this exact format:\n\
         {{\"subject_line\": \"Your subject line here\", \"content\": \"Full newsletter content here\"}}",
        name = persona.name,
        focus = persona.focus_list(),
        tone = persona.tone,
    )
}

fn variation_prompt(original: &ContentPiece, feedback: &str) -> String {
    let (min, max) = original.kind.word_range();
    let excerpt: String = original.body.chars().take(VARIATION_EXCERPT_CHARS).collect();
    format!(
        "Rewrite the following {kind} so it performs better with its audience.\n\n\
         Performance feedback:\n{feedback}\n\n\
         Original title: {title}\n\
         Original content:\n{excerpt}\n\n\
         Keep the core message, use the feedback to sharpen the hook and the call to action, \
         and keep it to {min}-{max} words.\n\n\
         Respond with ONLY valid JSON using this exact format:\n\
         {{\"title\": \"Improved title here\", \"content\": \"Full improved content here\"}}",
        kind = original.kind,
        title = original.title,
    )
}

// ─────────────────────────────────────────────────────────────────
// Response parsing
// ─────────────────────────────────────────────────────────────────

/// Strip a markdown code fence around a JSON answer
fn clean_response(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse the `{title | subject_line, content}` contract
fn parse_content(raw: &str) -> Result<GeneratedContent> {
    let parsed: ContentJson = serde_json::from_str(clean_response(raw)).map_err(|e| {
        Error::GenerationMalformed {
            message: format!("Response is not the expected JSON: {}", e),
        }
    })?;

    let title = parsed
        .title
        .or(parsed.subject_line)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error::GenerationMalformed {
            message: "Response has no title or subject_line".to_string(),
        })?;

    if parsed.content.trim().is_empty() {
        return Err(Error::GenerationMalformed {
            message: "Response content is empty".to_string(),
        });
    }

    Ok(GeneratedContent::new(title, parsed.content))
}

/// Local endpoint that answers every request with HTTP 500 and counts them
#[cfg(test)]
pub(crate) async fn failing_endpoint() -> (String, std::sync::Arc<std::sync::atomic::AtomicUsize>) {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn request_complete(buf: &[u8]) -> bool {
        let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let body_len = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        buf.len() >= header_end + 4 + body_len
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = requests.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let counter = counter.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                while !request_complete(&buf) {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 4\r\nconnection: close\r\n\r\nboom",
                    )
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}/v1", addr), requests)
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
