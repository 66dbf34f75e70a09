//! Mock Telegram API server for testing
//!
//! Simulates the Bot API endpoints the bot calls, using wiremock. Method names
//! are matched case-insensitively since the client may spell them either way.

use serde_json::{json, Value};
use teloxide::Bot;
use wiremock::{
    matchers::{body_partial_json, method, path_regex},
    Mock, MockServer, ResponseTemplate,
};

pub const TEST_TOKEN: &str = "12345:test_token";

/// Mock Telegram API server for testing
pub struct TelegramMockServer {
    pub server: MockServer,
}

/// Configuration for mock responses
#[derive(Debug, Clone)]
pub struct MockResponseConfig {
    pub success: bool,
    /// Only answer requests addressed to this chat
    pub chat_id: Option<i64>,
    /// Exact number of calls the mock must receive
    pub expected_calls: Option<u64>,
}

impl Default for MockResponseConfig {
    fn default() -> Self {
        Self {
            success: true,
            chat_id: None,
            expected_calls: None,
        }
    }
}

impl MockResponseConfig {
    pub fn expect(calls: u64) -> Self {
        Self {
            expected_calls: Some(calls),
            ..Default::default()
        }
    }

    pub fn failing_for(chat_id: i64) -> Self {
        Self {
            success: false,
            chat_id: Some(chat_id),
            expected_calls: None,
        }
    }
}

fn message_result(chat_id: i64) -> Value {
    json!({
        "message_id": 123,
        "from": {
            "id": 12345,
            "is_bot": true,
            "first_name": "ShopBot",
            "username": "shop_bot"
        },
        "chat": {
            "id": chat_id,
            "first_name": "Admin",
            "type": "private"
        },
        "date": 1640995200,
        "text": "Test message"
    })
}

impl TelegramMockServer {
    /// Create a new mock Telegram API server
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Bot whose requests all go to this server
    pub fn bot(&self) -> Bot {
        let url = api_url(&self.server.uri());
        Bot::new(TEST_TOKEN).set_api_url(url)
    }

    async fn mock_message_method(&self, api_method: &str, config: MockResponseConfig) {
        let chat_id = config.chat_id.unwrap_or(1);
        let (status, body) = if config.success {
            (200, json!({ "ok": true, "result": message_result(chat_id) }))
        } else {
            (
                400,
                json!({
                    "ok": false,
                    "error_code": 400,
                    "description": "Bad Request: chat not found"
                }),
            )
        };

        let mut mock = Mock::given(method("POST"))
            .and(path_regex(format!(r"(?i)^/bot[^/]+/{}$", api_method)));
        if let Some(chat_id) = config.chat_id {
            mock = mock.and(body_partial_json(json!({ "chat_id": chat_id })));
        }
        let mut mock = mock.respond_with(ResponseTemplate::new(status).set_body_json(body));
        if let Some(calls) = config.expected_calls {
            mock = mock.expect(calls);
        }
        // Chat-specific mocks must win over catch-all ones
        if config.chat_id.is_some() {
            mock = mock.with_priority(1);
        }
        mock.mount(&self.server).await;
    }

    /// Setup mock for sendMessage endpoint
    pub async fn mock_send_message(&self, config: MockResponseConfig) {
        self.mock_message_method("sendMessage", config).await;
    }

    /// Setup mock for sendDocument endpoint
    pub async fn mock_send_document(&self, config: MockResponseConfig) {
        self.mock_message_method("sendDocument", config).await;
    }

    /// Requests received so far for one API method
    pub async fn calls_to(&self, api_method: &str) -> usize {
        let suffix = format!("/{}", api_method.to_ascii_lowercase());
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path().to_ascii_lowercase().ends_with(&suffix))
            .count()
    }
}

fn api_url(uri: &str) -> url::Url {
    url::Url::parse(uri).expect("mock server uri is a valid url")
}
