//! Integration tests for the Langbase client and the pipe-backed oracle
//!
//! Tests HTTP client behavior using wiremock for request/response mocking.

use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use langbase_mystery::config::{LangbaseConfig, PipeConfig, RequestConfig};
use langbase_mystery::error::{CollaboratorError, LangbaseError};
use langbase_mystery::game::{CaseGenerator, ClueType, Difficulty, HintProvider};
use langbase_mystery::langbase::{LangbaseClient, Message, MysteryOracle, PipeRequest};

/// Create a test client pointing to mock server
fn create_test_client(base_url: &str, max_retries: u32) -> LangbaseClient {
    let config = LangbaseConfig {
        api_key: Some("test-api-key".to_string()),
        base_url: base_url.to_string(),
    };

    let request_config = RequestConfig {
        timeout_ms: 2000,
        max_retries,
        retry_delay_ms: 10,
    };

    LangbaseClient::new(&config, request_config).expect("Failed to create client")
}

fn create_test_oracle(base_url: &str) -> MysteryOracle {
    MysteryOracle::new(create_test_client(base_url, 0), &PipeConfig::default())
}

fn completion(text: &str) -> Value {
    json!({
        "success": true,
        "completion": text,
        "raw": {
            "model": "gpt-4o-mini",
            "usage": {"prompt_tokens": 400, "completion_tokens": 600, "total_tokens": 1000}
        }
    })
}

fn case_json() -> Value {
    json!({
        "title": "The Lighthouse Ledger",
        "scenario": "The keeper's ledger vanished during the storm.",
        "difficulty": "hard",
        "clues": [
            {"id": 1, "text": "Wet boot prints lead to the stairs.", "type": "observation"},
            {"id": 2, "text": "The cook heard the door at midnight.", "type": "testimony"},
            {"id": 3, "text": "A brass key with salt crust.", "type": "physical_object", "is_red_herring": true},
            {"id": 4, "text": "The supply boat was late.", "type": "context"}
        ],
        "options": [
            {"id": "a", "name": "The Keeper", "description": "Kept the ledger."},
            {"id": "b", "name": "The Cook", "description": "Up all night."},
            {"id": "c", "name": "The Ferryman", "description": "Arrived late."}
        ],
        "correct_option_id": "c",
        "explanation": "Only the ferryman's boots were soaked with seawater."
    })
}

#[cfg(test)]
mod pipe_call_tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_pipe_call() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/pipes/run"))
            .and(header("Authorization", "Bearer test-api-key"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Elementary.")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri(), 0);
        let response = client
            .call_pipe(PipeRequest::new("test-pipe", vec![Message::user("hello")]))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.completion, "Elementary.");
        assert_eq!(response.total_tokens(), Some(1000));
    }

    #[tokio::test]
    async fn test_request_includes_variables() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/pipes/run"))
            .and(body_partial_json(json!({
                "name": "test-pipe",
                "stream": false,
                "variables": {"difficulty": "easy"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri(), 0);
        let request = PipeRequest::new("test-pipe", vec![Message::user("hi")])
            .with_variable("difficulty", "easy");

        assert!(client.call_pipe(request).await.is_ok());
    }

    #[tokio::test]
    async fn test_pipe_call_authentication_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/pipes/run"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri(), 0);
        let result = client
            .call_pipe(PipeRequest::new("test-pipe", vec![]))
            .await;

        match result {
            Err(LangbaseError::Unavailable { message, retries }) => {
                assert!(message.contains("401"));
                assert!(message.contains("Invalid API key"));
                assert_eq!(retries, 1);
            }
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_handle_malformed_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/pipes/run"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri(), 0);
        let result = client
            .call_pipe(PipeRequest::new("test-pipe", vec![]))
            .await;

        assert!(matches!(
            result,
            Err(LangbaseError::Unavailable { ref message, .. }) if message.contains("Failed to parse response")
        ));
    }
}

#[cfg(test)]
mod retry_tests {
    use super::*;

    #[tokio::test]
    async fn test_retries_until_exhausted() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/pipes/run"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri(), 2);
        let result = client
            .call_pipe(PipeRequest::new("test-pipe", vec![]))
            .await;

        assert!(matches!(
            result,
            Err(LangbaseError::Unavailable { retries: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_retry_then_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/pipes/run"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/pipes/run"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("second time")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri(), 3);
        let response = client
            .call_pipe(PipeRequest::new("test-pipe", vec![]))
            .await
            .unwrap();

        assert_eq!(response.completion, "second time");
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/pipes/run"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("too late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let config = LangbaseConfig {
            api_key: Some("test-api-key".to_string()),
            base_url: mock_server.uri(),
        };
        let client = LangbaseClient::new(
            &config,
            RequestConfig {
                timeout_ms: 100,
                max_retries: 0,
                retry_delay_ms: 10,
            },
        )
        .unwrap();

        let result = client
            .call_pipe(PipeRequest::new("test-pipe", vec![]))
            .await;

        assert!(matches!(
            result,
            Err(LangbaseError::Unavailable { ref message, .. }) if message.contains("timeout")
        ));
    }
}

#[cfg(test)]
mod pipe_setup_tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_pipes_tolerates_existing_pipes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/pipes"))
            .and(body_partial_json(json!({"name": "mystery-case-v1", "json": true})))
            .respond_with(ResponseTemplate::new(409).set_body_string("already exists"))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/pipes"))
            .and(body_partial_json(json!({"name": "mystery-hint-v1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "mystery-hint-v1",
                "url": "https://langbase.com/test/mystery-hint-v1"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri(), 0);
        assert!(client.ensure_pipes(&PipeConfig::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_ensure_pipes_propagates_other_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/pipes"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri(), 0);
        let result = client.ensure_pipes(&PipeConfig::default()).await;
        assert!(matches!(result, Err(LangbaseError::Api { status: 403, .. })));
    }
}

#[cfg(test)]
mod oracle_tests {
    use super::*;
    use langbase_mystery::game::MysteryCase;

    #[tokio::test]
    async fn test_generate_case_from_fenced_completion() {
        let mock_server = MockServer::start().await;
        let text = format!("Here is your case:\n```json\n{}\n```", case_json());

        Mock::given(method("POST"))
            .and(path("/v1/pipes/run"))
            .and(body_partial_json(json!({
                "name": "mystery-case-v1",
                "variables": {"difficulty": "hard"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(&text)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let oracle = create_test_oracle(&mock_server.uri());
        let case = oracle.generate_case(Difficulty::Hard).await.unwrap();

        assert_eq!(case.title, "The Lighthouse Ledger");
        assert_eq!(case.clues.len(), 4);
        assert_eq!(case.clues[2].kind, ClueType::PhysicalObject);
        assert!(case.clues[2].is_red_herring);
        assert_eq!(case.culprit().unwrap().name, "The Ferryman");
    }

    #[tokio::test]
    async fn test_generate_case_rejects_inconsistent_case() {
        let mock_server = MockServer::start().await;
        let mut case = case_json();
        case["correct_option_id"] = json!("z");

        Mock::given(method("POST"))
            .and(path("/v1/pipes/run"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(&case.to_string())))
            .mount(&mock_server)
            .await;

        let oracle = create_test_oracle(&mock_server.uri());
        let result = oracle.generate_case(Difficulty::Hard).await;
        assert!(matches!(result, Err(CollaboratorError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_generate_case_service_down_is_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/pipes/run"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let oracle = create_test_oracle(&mock_server.uri());
        let result = oracle.generate_case(Difficulty::Easy).await;
        assert!(matches!(result, Err(CollaboratorError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_a_configuration_failure() {
        let config = LangbaseConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9".to_string(),
        };
        let client = LangbaseClient::new(&config, RequestConfig::default()).unwrap();
        let oracle = MysteryOracle::new(client, &PipeConfig::default());

        let result = oracle.generate_case(Difficulty::Medium).await;
        assert!(matches!(result, Err(CollaboratorError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_hint_is_trimmed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/pipes/run"))
            .and(body_partial_json(json!({"name": "mystery-hint-v1"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion("  Who was dry?  ")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let case: MysteryCase = serde_json::from_value(case_json()).unwrap();
        let oracle = create_test_oracle(&mock_server.uri());
        let hint = oracle.get_hint(&case, &[1, 2]).await.unwrap();

        assert_eq!(hint, "Who was dry?");
    }

    #[tokio::test]
    async fn test_empty_hint_is_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/pipes/run"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
            .mount(&mock_server)
            .await;

        let case: MysteryCase = serde_json::from_value(case_json()).unwrap();
        let oracle = create_test_oracle(&mock_server.uri());
        let result = oracle.get_hint(&case, &[]).await;

        assert!(matches!(result, Err(CollaboratorError::Unavailable { .. })));
    }
}
