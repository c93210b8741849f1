//! Gemini API client for transcription, translation, and clip suggestions.
//!
//! Every operation returns the model's raw text; locating and parsing the
//! embedded JSON array is the ingestion layer's job (`crate::ai`), so a
//! malformed response surfaces as a `ResponseFormat` error with the original
//! text available for diagnosis.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{MediacutError, Result};

/// Threshold for using the Files API instead of inline data (20 MB).
const INLINE_SIZE_THRESHOLD: u64 = 20 * 1024 * 1024;

/// Maximum retries for API calls.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const BASE_DELAY_MS: u64 = 1000;

/// Audio payload for an analysis request.
#[derive(Debug, Clone)]
pub enum AudioPayload {
    /// Base64-encoded Ogg audio, inlined into the request.
    Inline(String),
    /// Files API URI of previously uploaded audio.
    Uri(String),
}

/// Everything the analysis prompt is built from.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeRequest {
    pub context: String,
    pub glossary: String,
    pub speaker_count: Option<u32>,
    pub remove_filler_words: bool,
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash".to_string(),
        }
    }

    /// Point the client at a different endpoint (tests use a local mock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// Read an audio file and choose inline data or a Files API upload
    /// based on its size.
    pub async fn load_audio(&self, path: &Path) -> Result<AudioPayload> {
        let metadata = fs::metadata(path).await?;
        if metadata.len() < INLINE_SIZE_THRESHOLD {
            debug!("Using inline audio data ({} bytes)", metadata.len());
            let bytes = fs::read(path).await?;
            Ok(AudioPayload::Inline(
                base64::engine::general_purpose::STANDARD.encode(bytes),
            ))
        } else {
            debug!("Uploading audio to Files API ({} bytes)", metadata.len());
            let uri = self.upload_file(path).await?;
            debug!("Audio uploaded: {}", uri);
            Ok(AudioPayload::Uri(uri))
        }
    }

    /// Upload a file via the Files API and return its URI.
    pub async fn upload_file(&self, path: &Path) -> Result<String> {
        let file_bytes = fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.ogg");

        let url = format!("{}/upload/v1beta/files?key={}", self.base_url, self.api_key);

        let response = self
            .client
            .post(&url)
            .header("X-Goog-Upload-Protocol", "raw")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header("Content-Type", "audio/ogg")
            .header("X-Goog-Upload-File-Name", file_name)
            .body(file_bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MediacutError::Api(format!(
                "File upload failed: {}",
                error_text
            )));
        }

        let upload_response: FileUploadResponse = response.json().await?;
        Ok(upload_response.file.uri)
    }

    fn build_analyze_prompts(&self, request: &AnalyzeRequest) -> (String, String) {
        let mut system = String::from(
            "You are a professional video editor assistant. \
             Transcribe the audio and identify logical segments.",
        );
        if let Some(count) = request.speaker_count {
            system.push_str(&format!(
                " There are {} speakers in this audio. Label them as Speaker 1, Speaker 2, etc.",
                count
            ));
        }
        if request.remove_filler_words {
            system.push_str(" Omit filler words such as um, uh, and er from the transcription.");
        }

        let user = format!(
            "Analyze the following audio.\n\
             Context: {}\n\
             Glossary: {}\n\
             Output the transcription as a strict JSON array of objects with \
             'start', 'end', 'speaker', and 'text' fields. \
             Timestamps must be in 'MM:SS' format.",
            request.context, request.glossary
        );

        (system, user)
    }

    /// Transcribe audio into time-coded segments. Returns the raw response
    /// text, which contains a JSON segment array somewhere inside it.
    pub async fn analyze_audio(
        &self,
        request: &AnalyzeRequest,
        audio: &AudioPayload,
    ) -> Result<String> {
        let (system, user) = self.build_analyze_prompts(request);

        let audio_part = match audio {
            AudioPayload::Inline(data) => Part::InlineData {
                inline_data: InlineData {
                    mime_type: "audio/ogg".to_string(),
                    data: data.clone(),
                },
            },
            AudioPayload::Uri(uri) => Part::FileData {
                file_data: FileData {
                    mime_type: "audio/ogg".to_string(),
                    file_uri: uri.clone(),
                },
            },
        };

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part::Text { text: user }, audio_part],
            }],
            system_instruction: Some(SystemInstruction {
                parts: vec![Part::Text { text: system }],
            }),
            generation_config: Some(GenerationConfig {
                temperature: Some(0.0),
                max_output_tokens: Some(8192),
            }),
        };

        self.call_generate_content(body).await
    }

    /// Translate a transcript into another language, keeping timing and
    /// speakers intact. Returns raw response text.
    pub async fn translate_transcript(
        &self,
        transcript_json: &str,
        target_language: &str,
        context: &str,
    ) -> Result<String> {
        let system = "You are a professional subtitle translator.".to_string();
        let user = format!(
            "Translate the 'text' field of every segment in the following \
             transcript to {}. Keep 'start', 'end', and 'speaker' unchanged. \
             Context: {}\n\
             Return a strict JSON array in the same shape.\n\n{}",
            target_language, context, transcript_json
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part::Text { text: user }],
            }],
            system_instruction: Some(SystemInstruction {
                parts: vec![Part::Text { text: system }],
            }),
            generation_config: Some(GenerationConfig {
                temperature: Some(0.0),
                max_output_tokens: Some(8192),
            }),
        };

        self.call_generate_content(body).await
    }

    /// Ask the model for the most engaging clips of a transcript. Returns
    /// raw response text containing a JSON clip array.
    pub async fn generate_clips(
        &self,
        transcript_json: &str,
        count: u32,
        min_duration_secs: u32,
        max_duration_secs: u32,
    ) -> Result<String> {
        let system = "You are a viral content expert. Identify the most engaging \
                      moments in a video transcript for social media clips."
            .to_string();
        let user = format!(
            "Analyze the following transcript and identify the top {} most \
             interesting clips.\n\
             Constraints:\n\
             - Each clip must be between {} and {} seconds long.\n\
             - Clips should be self-contained and engaging.\n\
             - A clip may splice several disjoint ranges; return a strict JSON \
             array of objects with fields: 'segments' (array of {{'start', 'end'}} \
             in MM:SS), 'title' (catchy title), 'reason' (why this is good).\n\n\
             Transcript:\n{}",
            count, min_duration_secs, max_duration_secs, transcript_json
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part::Text { text: user }],
            }],
            system_instruction: Some(SystemInstruction {
                parts: vec![Part::Text { text: system }],
            }),
            generation_config: None,
        };

        self.call_generate_content(body).await
    }

    /// POST to generateContent with exponential-backoff retries on server
    /// errors; client errors (4xx) fail immediately.
    async fn call_generate_content(&self, body: GenerateContentRequest) -> Result<String> {
        let url = self.generate_url();
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = BASE_DELAY_MS * 2u64.pow(attempt - 1);
                debug!("Retry attempt {} after {}ms delay", attempt, delay);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            let response = self
                .client
                .post(&url)
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    debug!("Gemini API response status: {}", status);

                    if status.is_success() {
                        let parsed: GenerateContentResponse = resp.json().await?;
                        return Ok(extract_text(&parsed));
                    }

                    let error_body = resp.text().await.unwrap_or_default();

                    if status.as_u16() >= 400 && status.as_u16() < 500 {
                        return Err(MediacutError::Api(format!(
                            "Gemini API error ({}): {}",
                            status, error_body
                        )));
                    }

                    warn!("Gemini API server error ({}): {}", status, error_body);
                    last_error = Some(MediacutError::Api(format!(
                        "Gemini API server error: {}",
                        status
                    )));
                }
                Err(e) => {
                    warn!("Gemini API request failed: {}", e);
                    last_error = Some(e.into());
                }
            }
        }

        Err(last_error.unwrap_or_else(|| MediacutError::Api("Unknown error".to_string())))
    }
}

fn extract_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .map(|p| match p {
            ResponsePart::Text { text } => text.clone(),
        })
        .unwrap_or_default()
}

// Request/Response types

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
    FileData { file_data: FileData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResponsePart {
    Text { text: String },
}

#[derive(Deserialize)]
struct FileUploadResponse {
    file: UploadedFile,
}

#[derive(Deserialize)]
struct UploadedFile {
    uri: String,
}
