//! Integration tests for the streaming client using wiremock.

use olla_stream::{
    AssembleOptions, ChatTurn, Client, ClientConfig, NullSink, PrintSink, RequestPayload,
    StreamError, TransportError, spawn_relay,
};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Client {
    Client::new(ClientConfig::default().model("llama2"))
        .expect("client builds")
        .with_base_url(server.uri())
}

fn generate_payload(client: &Client, prompt: &str) -> RequestPayload {
    client.config().generate_request(prompt).into()
}

#[tokio::test]
async fn generate_stream_assembles_text_and_metrics() {
    let mock_server = MockServer::start().await;

    let ndjson_body = concat!(
        r#"{"model":"llama2","created_at":"2024-01-01T00:00:00Z","response":"Hel","done":false}"#,
        "\n",
        r#"{"model":"llama2","created_at":"2024-01-01T00:00:01Z","response":"lo","done":true,"total_duration":1500000000,"load_duration":1000000,"prompt_eval_count":4,"prompt_eval_duration":2000000,"eval_count":2,"eval_duration":500000000}"#,
        "\n",
    );

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(serde_json::json!({
            "model": "llama2",
            "prompt": "say hello",
            "stream": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(ndjson_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let payload = generate_payload(&client, "say hello");
    let mut sink = PrintSink::new(Vec::new());
    let result = client
        .run(
            &payload,
            &AssembleOptions::default().capture_metrics(true),
            &mut sink,
        )
        .await
        .expect("should succeed");

    assert_eq!(result.text, "Hello");
    assert_eq!(sink.into_inner(), b"Hello");
    let metrics = result.metrics.expect("metrics requested");
    assert_eq!(metrics.total().as_secs_f64(), 1.5);
    assert_eq!(metrics.prompt_eval_count, 4);
    assert_eq!(metrics.eval_count, 2);
    assert_eq!(metrics.tokens_per_second(), Some(4.0));
}

#[tokio::test]
async fn chat_stream_assembles_message_content() {
    let mock_server = MockServer::start().await;

    let ndjson_body = concat!(
        r#"{"model":"llama2","message":{"role":"assistant","content":"Bon"},"done":false}"#,
        "\n",
        r#"{"model":"llama2","message":{"role":"assistant","content":"jour"},"done":false}"#,
        "\n",
        r#"{"model":"llama2","message":{"role":"assistant","content":""},"done":true,"done_reason":"stop","eval_count":2}"#,
        "\n",
    );

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({
            "messages": [
                {"role": "system", "content": "Answer in French"},
                {"role": "user", "content": "Say hello"},
            ],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(ndjson_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let payload: RequestPayload = client
        .config()
        .chat_request(vec![
            ChatTurn::system("Answer in French"),
            ChatTurn::user("Say hello"),
        ])
        .into();

    let mut fragments = Vec::new();
    let mut sink = |f: &str| fragments.push(f.to_string());
    let result = client
        .run(&payload, &AssembleOptions::default(), &mut sink)
        .await
        .expect("should succeed");

    assert_eq!(result.text, "Bonjour");
    assert!(result.metrics.is_none());
    assert_eq!(fragments, vec!["Bon", "jour"]);
}

#[tokio::test]
async fn json_mode_passes_document_through() {
    let mock_server = MockServer::start().await;

    let document = r#"{"response":"ok","done":true}"#;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(serde_json::json!({
            "format": "json",
            "stream": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(document))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let payload: RequestPayload = client.config().generate_request("colors").json().into();

    let mut touched = false;
    let mut sink = |_: &str| touched = true;
    let result = client
        .run(&payload, &AssembleOptions::default(), &mut sink)
        .await
        .expect("should succeed");

    assert_eq!(result.text, document);
    assert!(result.metrics.is_none());
    assert!(!touched, "passthrough must not use the sink");
}

#[tokio::test]
async fn non_200_status_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(r#"{"error":"model 'nope' not found"}"#),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let payload = generate_payload(&client, "hi");
    let err = client
        .run(&payload, &AssembleOptions::default(), &mut NullSink)
        .await
        .unwrap_err();

    match err.kind() {
        StreamError::Transport(TransportError::Status { status, body }) => {
            assert_eq!(*status, 404);
            assert_eq!(body, "model 'nope' not found");
        }
        other => panic!("expected Status, got: {other:?}"),
    }
    assert!(err.partial_text().is_empty());
}

#[tokio::test]
async fn non_200_status_fails_json_mode_too() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let payload: RequestPayload = client.config().generate_request("x").json().into();
    let err = client
        .run(&payload, &AssembleOptions::default(), &mut NullSink)
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        StreamError::Transport(TransportError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn connection_refused_is_request_error() {
    let client = Client::new(ClientConfig::default())
        .expect("client builds")
        .with_base_url("http://127.0.0.1:1");
    let payload = generate_payload(&client, "hi");
    let err = client
        .run(&payload, &AssembleOptions::default(), &mut NullSink)
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        StreamError::Transport(TransportError::Request(_))
    ));
}

#[tokio::test]
async fn empty_body_is_incomplete() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let payload = generate_payload(&client, "hi");
    let err = client
        .run(&payload, &AssembleOptions::default(), &mut NullSink)
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), StreamError::Incomplete));
}

#[tokio::test]
async fn truncated_stream_reports_partial_text() {
    let mock_server = MockServer::start().await;

    let ndjson_body = concat!(
        r#"{"response":"The sky","done":false}"#,
        "\n",
        r#"{"response":" is","done":false}"#,
        "\n",
    );

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ndjson_body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let payload = generate_payload(&client, "hi");
    let err = client
        .run(&payload, &AssembleOptions::default(), &mut NullSink)
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), StreamError::Incomplete));
    assert_eq!(err.partial_text(), "The sky is");
}

#[tokio::test]
async fn one_malformed_frame_is_tolerated() {
    let mock_server = MockServer::start().await;

    let ndjson_body = concat!(
        r#"{"response":"a","done":false}"#,
        "\n",
        "{\"response\":\"b\",\"done\":\n",
        r#"{"response":"c","done":true}"#,
        "\n",
    );

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ndjson_body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let payload = generate_payload(&client, "hi");
    let result = client
        .run(&payload, &AssembleOptions::default(), &mut NullSink)
        .await
        .expect("single malformed frame is skipped");
    assert_eq!(result.text, "ac");
}

#[tokio::test]
async fn two_malformed_frames_fail_the_run() {
    let mock_server = MockServer::start().await;

    let ndjson_body = concat!(
        r#"{"response":"a","done":false}"#,
        "\n",
        "<html>\n",
        r#"{"error":"model crashed"}"#,
        "\n",
        r#"{"response":"c","done":true}"#,
        "\n",
    );

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ndjson_body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let payload = generate_payload(&client, "hi");
    let err = client
        .run(&payload, &AssembleOptions::default(), &mut NullSink)
        .await
        .unwrap_err();
    match err.kind() {
        StreamError::RepeatedDecode { count, last } => {
            assert_eq!(*count, 2);
            assert!(last.reason.contains("model crashed"), "reason: {}", last.reason);
        }
        other => panic!("expected RepeatedDecode, got: {other:?}"),
    }
    assert_eq!(err.partial_text(), "a");
}

#[tokio::test]
async fn relay_delivers_chat_fragments_in_order() {
    let mock_server = MockServer::start().await;

    let ndjson_body = concat!(
        r#"{"message":{"role":"assistant","content":"Good"},"done":false}"#,
        "\n",
        r#"{"message":{"role":"assistant","content":" morning"},"done":false}"#,
        "\n",
        r#"{"message":{"role":"assistant","content":"!"},"done":false}"#,
        "\n",
        r#"{"message":{"role":"assistant","content":""},"done":true}"#,
        "\n",
    );

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({
            "messages": [
                {"role": "system", "content": "Translate the following text to English"},
                {"role": "user", "content": "Bonjour"},
            ],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(ndjson_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let payload: RequestPayload = client
        .config()
        .translate_request("Bonjour", "English")
        .into();
    let mut relay = spawn_relay(client, payload, AssembleOptions::default());

    let mut seen = Vec::new();
    while let Some(fragment) = relay.fragments.recv().await {
        seen.push(fragment);
    }
    assert_eq!(seen, vec!["Good", " morning", "!"]);

    let result = relay
        .handle
        .await
        .expect("producer task")
        .expect("producer succeeds");
    assert_eq!(result.text, "Good morning!");
}

#[tokio::test]
async fn relay_closes_channel_on_transport_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(503).set_body_string("loading"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let payload: RequestPayload = client.config().translate_request("Hola", "English").into();
    let mut relay = spawn_relay(client, payload, AssembleOptions::default());

    assert!(relay.fragments.recv().await.is_none());
    let err = relay.handle.await.expect("producer task").unwrap_err();
    assert_eq!(
        match err.kind() {
            StreamError::Transport(t) => t.status(),
            _ => None,
        },
        Some(503)
    );
}
