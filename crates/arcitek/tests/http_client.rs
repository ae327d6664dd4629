//! HTTP client behaviour against a mock generation backend.

use arcitek::domain::{
    ImageRequest, ImageStyle, MusicDomain, MusicGenre, MusicRequest, NarrationRequest, Resolution,
    StoryGenre, StoryLength, StoryRequest, Voice,
};
use arcitek::export::{DirectoryExporter, ExportItem};
use arcitek::{
    ErrorKind, GenerationOrchestrator, GenerationService, HttpGenerationService, ServiceError,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpGenerationService {
    HttpGenerationService::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn music_request_body_and_relative_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate-music"))
        .and(body_json(json!({
            "prompt": "epic drums",
            "genre": "orchestral",
            "duration": 30
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "url": "/api/outputs/music/music_1.wav",
            "filename": "music_1.wav",
            "format": "WAV",
            "quality": "96kHz/24-bit"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let track = client(&server)
        .generate_music(&MusicRequest::new("epic drums", MusicGenre::Orchestral, 30))
        .await
        .unwrap();

    assert_eq!(
        track.url.as_str(),
        format!("{}/api/outputs/music/music_1.wav", server.uri())
    );
    assert_eq!(track.filename.as_deref(), Some("music_1.wav"));
    assert_eq!(track.quality.as_deref(), Some("96kHz/24-bit"));
}

#[tokio::test]
async fn image_uses_wire_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate-image"))
        .and(body_json(json!({
            "prompt": "a city",
            "style": "3d-render",
            "resolution": "2k"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://cdn.example/city.png",
            "resolution": "2560x1440",
            "megapixels": 3.7
        })))
        .mount(&server)
        .await;

    let image = client(&server)
        .generate_image(&ImageRequest::new(
            "a city",
            ImageStyle::Render3d,
            Resolution::TwoK,
        ))
        .await
        .unwrap();

    assert_eq!(image.url.as_str(), "https://cdn.example/city.png");
    assert_eq!(image.megapixels, Some(3.7));
}

#[tokio::test]
async fn story_is_unwrapped_from_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate-story"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "story": {
                "title": "Neon Rain",
                "content": "It rained.",
                "word_count": 2
            }
        })))
        .mount(&server)
        .await;

    let story = client(&server)
        .generate_story(&StoryRequest::new(
            "noir",
            StoryGenre::Mystery,
            StoryLength::Flash,
        ))
        .await
        .unwrap();

    assert_eq!(story.title, "Neon Rain");
    assert_eq!(story.word_count, Some(2));
}

#[tokio::test]
async fn narration_sends_speed_and_voice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/narrate-story"))
        .and(body_json(json!({"text": "It rained.", "voice": "fable", "speed": 1.5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "/api/outputs/narration/n.mp3",
            "duration": 4.2
        })))
        .mount(&server)
        .await;

    let audio = client(&server)
        .narrate_story(&NarrationRequest::new("It rained.", Voice::Fable, 1.5))
        .await
        .unwrap();

    assert!(audio.url.as_str().ends_with("/api/outputs/narration/n.mp3"));
    assert_eq!(audio.duration, Some(4.2));
}

#[tokio::test]
async fn backend_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate-music"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "CUDA out of memory"})),
        )
        .mount(&server)
        .await;

    let service = Arc::new(client(&server));
    let err = service
        .generate_music(&MusicRequest::new("x", MusicGenre::Jazz, 30))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(matches!(err, ServiceError::Status { ref message, .. } if message == "CUDA out of memory"));

    let orchestrator = GenerationOrchestrator::<MusicDomain>::new(service);
    let outcome = orchestrator
        .submit(MusicRequest::new("x", MusicGenre::Jazz, 30))
        .await
        .unwrap();
    let error = outcome.error().unwrap();
    assert_eq!(error.kind, ErrorKind::Service);
    assert_eq!(error.message, "CUDA out of memory");
}

#[tokio::test]
async fn plain_text_error_body_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate-image"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client(&server)
        .generate_image(&ImageRequest::new("x", ImageStyle::Anime, Resolution::Hd))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Status { status: 502, ref message, .. } if message == "Bad Gateway"
    ));
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate-story"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "no envelope"})))
        .mount(&server)
        .await;

    let err = client(&server)
        .generate_story(&StoryRequest::new(
            "x",
            StoryGenre::Horror,
            StoryLength::Short,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Decode { .. }));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate-music"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"url": "/late.wav"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let service = HttpGenerationService::new(&server.uri(), Duration::from_millis(100)).unwrap();
    let err = service
        .generate_music(&MusicRequest::new("x", MusicGenre::Rock, 30))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Transport { ref source, .. } if source.is_timeout()));
}

#[tokio::test]
async fn health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "online",
            "service": "ArciTEK.AI Backend",
            "version": "1.0.0"
        })))
        .mount(&server)
        .await;

    let health = client(&server).health().await.unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.version.as_deref(), Some("1.0.0"));
}

#[tokio::test]
async fn exporter_fetches_artifact_into_directory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/outputs/image/img.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
        .mount(&server)
        .await;

    let service = Arc::new(client(&server));
    let image = arcitek::domain::GeneratedImage {
        url: format!("{}/api/outputs/image/img.png", server.uri()).into(),
        filename: None,
        resolution: None,
        megapixels: None,
    };

    let dir = tempfile::tempdir().unwrap();
    let exporter = DirectoryExporter::new(dir.path(), service);
    let first = exporter.save(&ExportItem::image(&image)).await.unwrap();
    let second = exporter.save(&ExportItem::image(&image)).await.unwrap();

    assert_eq!(first, dir.path().join("arcitekAI-image.png"));
    assert_eq!(second, dir.path().join("arcitekAI-image-1.png"));
    assert_eq!(std::fs::read(&first).unwrap(), vec![0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn missing_artifact_fails_export() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/outputs/music/gone.wav"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "File not found"})))
        .mount(&server)
        .await;

    let service = Arc::new(client(&server));
    let err = service
        .fetch_artifact("/api/outputs/music/gone.wav")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}
