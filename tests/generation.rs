//! End-to-end generation against a mock Gemini endpoint.

use httpmock::prelude::*;
use product_studio::{
    compile, AspectRatio, BackgroundStyle, Gender, GeminiStudioClient, ImageGeneratorExt, Mode,
    SceneType, Session, Settings, SourceImage, StudioError,
};
use serde_json::json;

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash-image:generateContent";

fn client(server: &MockServer) -> GeminiStudioClient {
    GeminiStudioClient::builder()
        .api_key("integration-key")
        .base_url(server.base_url())
        .build()
        .unwrap()
}

fn image_response(data: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {
                "parts": [
                    { "text": "Here is the composed shot." },
                    { "inlineData": { "mimeType": "image/png", "data": data } }
                ]
            },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn jpeg_upload_is_sent_as_png_and_result_is_png_data_url() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(GENERATE_PATH)
            .header("x-goog-api-key", "integration-key")
            .body_includes(r#""mimeType":"image/png","data":"XYZ==""#)
            .body_excludes("image/jpeg");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(image_response("ABC123"));
    });

    let result = client(&server)
        .generate("data:image/jpeg;base64,XYZ==", &Settings::default())
        .await
        .unwrap();

    assert_eq!(result, "data:image/png;base64,ABC123");
    mock.assert();
}

#[tokio::test]
async fn response_without_image_is_no_image_returned() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(200).json_body(json!({
            "candidates": [{ "content": { "parts": [{ "text": "No." }] }, "finishReason": "STOP" }]
        }));
    });

    let err = client(&server)
        .generate("data:image/png;base64,AAAA", &Settings::default())
        .await
        .unwrap_err();

    assert!(matches!(err, StudioError::NoImageReturned { .. }));
}

#[tokio::test]
async fn sequential_calls_send_independent_instructions() {
    let server = MockServer::start();
    let studio = server.mock(|when, then| {
        when.method(POST)
            .path(GENERATE_PATH)
            .body_includes("professional Marble style")
            .body_excludes("environment")
            .body_includes(r#""aspectRatio":"1:1""#);
        then.status(200).json_body(image_response("U1RVRElP"));
    });
    let lifestyle = server.mock(|when, then| {
        when.method(POST)
            .path(GENERATE_PATH)
            .body_includes("The setting is a Outdoor Nature environment.")
            .body_excludes("Marble")
            .body_includes(r#""aspectRatio":"16:9""#);
        then.status(200).json_body(image_response("TElGRQ=="));
    });

    let client = client(&server);
    let first = Settings::new().with_background_style(BackgroundStyle::Marble);
    let second = first
        .with_mode(Mode::ProductAvatar)
        .with_scene_type(SceneType::Nature)
        .with_gender(Gender::Male)
        .with_aspect_ratio(AspectRatio::Landscape);

    let a = client.generate("data:image/png;base64,AAAA", &first).await.unwrap();
    let b = client.generate("data:image/png;base64,AAAA", &second).await.unwrap();

    assert_eq!(a, "data:image/png;base64,U1RVRElP");
    assert_eq!(b, "data:image/png;base64,TElGRQ==");
    studio.assert();
    lifestyle.assert();
}

#[tokio::test]
async fn server_error_is_single_attempt_without_decorator() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(500).body("internal");
    });

    let err = client(&server)
        .generate("data:image/png;base64,AAAA", &Settings::default())
        .await
        .unwrap_err();

    assert!(matches!(err, StudioError::Api { status: 500, .. }));
    assert!(err.is_transport_failure());
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn retry_decorator_repeats_server_errors() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(503).body("overloaded");
    });

    let source = SourceImage::from_data_url("data:image/png;base64,AAAA").unwrap();
    let err = client(&server)
        .generate_with_retries(&source, &Settings::default(), 2)
        .await
        .unwrap_err();

    assert!(matches!(err, StudioError::Api { status: 503, .. }));
    assert_eq!(mock.calls(), 3);
}

#[tokio::test]
async fn session_drives_client_and_keeps_result() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(200).json_body(image_response("QUJD"));
    });

    let client = client(&server);
    let mut session = Session::new();
    assert!(matches!(
        session.generate_with(&client).await,
        Err(StudioError::MissingSourceImage)
    ));

    session.upload(SourceImage::from_data_url("data:image/png;base64,AAAA").unwrap());
    let image = session.generate_with(&client).await.unwrap();

    assert_eq!(image.decode().unwrap(), b"ABC".to_vec());
    assert_eq!(
        image.metadata.commentary.as_deref(),
        Some("Here is the composed shot.")
    );
    assert_eq!(session.result().unwrap().data, "QUJD");
    assert!(session.error().is_none());
}

#[test]
fn compile_is_stable_for_equal_settings() {
    let settings = Settings::new()
        .with_mode(Mode::ProductAvatar)
        .with_scene_type(SceneType::Home)
        .with_gender(Gender::Female);

    let copy = settings;
    assert_eq!(compile(&settings), compile(&copy));
    assert!(compile(&settings).contains("female avatar"));
    assert!(compile(&settings).contains("Home Lifestyle"));
}
