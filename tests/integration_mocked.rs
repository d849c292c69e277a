/// Integration tests with a mocked WhatsApp Cloud API
/// Exercises the real client without hitting Meta's servers
use crm_consignado_api::errors::AppError;
use crm_consignado_api::messaging::{MessageSender, WhatsAppClient};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(mock_server: &MockServer) -> WhatsAppClient {
    WhatsAppClient::new(
        mock_server.uri(),
        "1234567890".to_string(),
        "test_token".to_string(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_send_text_message_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1234567890/messages"))
        .and(header("authorization", "Bearer test_token"))
        .and(body_json(serde_json::json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": "5511987654321",
            "type": "text",
            "text": { "body": "Olá!" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "messaging_product": "whatsapp",
            "contacts": [{ "input": "5511987654321", "wa_id": "5511987654321" }],
            "messages": [{ "id": "wamid.HBgM" }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let receipt = client
        .send_message("(11) 98765-4321", "Olá!")
        .await
        .unwrap();

    assert_eq!(receipt.recipient, "5511987654321");
    assert_eq!(receipt.message_id.as_deref(), Some("wamid.HBgM"));
}

#[tokio::test]
async fn test_response_without_message_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1234567890/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let receipt = client_for(&mock_server)
        .send_message("11987654321", "oi")
        .await
        .unwrap();

    assert_eq!(receipt.message_id, None);
}

#[tokio::test]
async fn test_provider_error_is_external_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1234567890/messages"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string("{\"error\":{\"message\":\"bad token\"}}"),
        )
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .send_message("11987654321", "oi")
        .await
        .unwrap_err();

    match err {
        AppError::ExternalApiError(msg) => {
            assert!(msg.contains("401"), "{}", msg);
            assert!(msg.contains("bad token"), "{}", msg);
        }
        other => panic!("expected ExternalApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_recipient_not_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .send_message("123", "oi")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_circuit_opens_after_consecutive_failures() {
    let mock_server = MockServer::start().await;

    // Only the first five attempts reach the provider
    Mock::given(method("POST"))
        .and(path("/1234567890/messages"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(5)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    for _ in 0..5 {
        let err = client.send_message("11987654321", "oi").await.unwrap_err();
        assert!(err.to_string().contains("503"), "{}", err);
    }

    let err = client.send_message("11987654321", "oi").await.unwrap_err();
    assert!(err.to_string().contains("circuit open"), "{}", err);
}

#[tokio::test]
async fn test_concurrent_sends() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "messages": [{ "id": "wamid.x" }] })),
        )
        .expect(10)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let mut handles = vec![];
    for i in 0..10 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .send_message("11987654321", &format!("mensagem {}", i))
                .await
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
}
