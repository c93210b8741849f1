//! Gemini client tests against a local mock server.
//!
//! The client's base URL is configurable, so these exercise the real request
//! construction, retry policy, and response extraction without touching the
//! network.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mediacut::ai::gemini::{AnalyzeRequest, AudioPayload, GeminiClient};
use mediacut::ai::{parse_clips, parse_segments};
use mediacut::MediacutError;

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key".to_string()).with_base_url(server.uri())
}

fn model_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {
                "parts": [{"text": text}],
                "role": "model"
            }
        }]
    })
}

#[tokio::test]
async fn test_analyze_audio_returns_parseable_segments() {
    let server = MockServer::start().await;

    let reply = "Here is the transcript:\n\
        [{\"start\": \"00:00\", \"end\": \"00:04\", \"speaker\": \"Speaker 1\", \"text\": \"Welcome back.\"},\n\
         {\"start\": \"00:04\", \"end\": \"00:09\", \"speaker\": \"Speaker 2\", \"text\": \"Thanks for having me.\"}]";

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(reply)))
        .expect(1)
        .mount(&server)
        .await;

    let request = AnalyzeRequest {
        context: "podcast".to_string(),
        ..Default::default()
    };
    let payload = AudioPayload::Inline("ZmFrZSBhdWRpbw==".to_string());

    let response = client(&server)
        .analyze_audio(&request, &payload)
        .await
        .unwrap();
    let segments = parse_segments(&response).unwrap();

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].speaker, "Speaker 1");
    assert_eq!(segments[1].text, "Thanks for having me.");
}

#[tokio::test]
async fn test_translate_transcript_round_trip() {
    let server = MockServer::start().await;

    let reply = "[{\"start\": \"00:00\", \"end\": \"00:04\", \"speaker\": \"Speaker 1\", \"text\": \"Bon retour.\"}]";

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(reply)))
        .expect(1)
        .mount(&server)
        .await;

    let transcript = "[{\"start\":\"00:00\",\"end\":\"00:04\",\"speaker\":\"Speaker 1\",\"text\":\"Welcome back.\"}]";
    let response = client(&server)
        .translate_transcript(transcript, "French", "")
        .await
        .unwrap();

    let segments = parse_segments(&response).unwrap();
    assert_eq!(segments[0].text, "Bon retour.");
}

#[tokio::test]
async fn test_generate_clips_parses_mixed_shapes() {
    let server = MockServer::start().await;

    let reply = "[{\"start\": \"00:10\", \"end\": \"00:40\", \"title\": \"The hook\", \"reason\": \"strong open\"},\n\
        {\"segments\": [{\"start\": \"01:00\", \"end\": \"01:20\"}, {\"start\": \"02:00\", \"end\": \"02:10\"}],\n\
         \"title\": \"Best exchange\", \"reason\": \"back and forth\"}]";

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(reply)))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .generate_clips("[]", 2, 15, 60)
        .await
        .unwrap();
    let clips = parse_clips(&response).unwrap();

    assert_eq!(clips.len(), 2);
    assert_eq!(clips[0].segments.len(), 1);
    assert_eq!(clips[1].segments.len(), 2);
    assert_eq!(clips[1].title, "Best exchange");
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server)
        .translate_transcript("[]", "French", "")
        .await;

    assert!(matches!(result, Err(MediacutError::Api(_))));
}

#[tokio::test]
async fn test_server_error_is_retried_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply("[]")))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .translate_transcript("[]", "French", "")
        .await
        .unwrap();

    assert_eq!(response, "[]");
}

#[tokio::test]
async fn test_prose_without_array_is_a_format_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(
            "I'm sorry, I couldn't hear any speech in this audio.",
        )))
        .mount(&server)
        .await;

    let response = client(&server)
        .translate_transcript("[]", "French", "")
        .await
        .unwrap();

    assert!(matches!(
        parse_segments(&response),
        Err(MediacutError::ResponseFormat(_))
    ));
}

#[tokio::test]
async fn test_upload_file_returns_uri() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "file": {"uri": "https://example.com/files/abc123"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("big.ogg");
    std::fs::write(&audio, b"fake audio bytes").unwrap();

    let uri = client(&server).upload_file(&audio).await.unwrap();
    assert_eq!(uri, "https://example.com/files/abc123");
}
