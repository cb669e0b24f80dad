//! Test helpers: build AppState and router around a scripted describer.
//!
//! Run from workspace root: `cargo test -p snaptogether-api`.

use async_trait::async_trait;
use axum_test::TestServer;
use snaptogether_api::setup::routes;
use snaptogether_api::state::{AppState, CredentialSource};
use snaptogether_core::{Config, ServiceConfig};
use snaptogether_plugins::{
    DescribeContext, DescriberInfo, DescriberRegistry, DescriberUsage, Description,
    ImageDescriber, UpstreamError,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_API_KEY: &str = "test-upstream-key-0123";
pub const PHOTO_PNG: &str = "data:image/png;base64,iVBORw0KGgo=";
pub const PHOTO_JPEG: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";

/// What the scripted describer answers
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Status(u16, String),
    Delay(Duration),
}

#[derive(Debug)]
pub struct MockDescriber {
    reply: MockReply,
    calls: Mutex<Vec<DescribeContext>>,
}

impl MockDescriber {
    pub fn new(reply: MockReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(MockReply::Text(text.to_string()))
    }

    pub fn calls(&self) -> Vec<DescribeContext> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageDescriber for MockDescriber {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn describe_images(&self, context: DescribeContext) -> Result<Description, UpstreamError> {
        self.calls.lock().unwrap().push(context);

        match &self.reply {
            MockReply::Text(text) => Ok(Description {
                text: text.clone(),
                usage: Some(DescriberUsage {
                    input_tokens: 10,
                    output_tokens: 5,
                }),
            }),
            MockReply::Status(status, body) => Err(UpstreamError::Status {
                provider: "Gemini",
                status: *status,
                body: body.clone(),
            }),
            MockReply::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(Description {
                    text: "too late".to_string(),
                    usage: None,
                })
            }
        }
    }
}

/// Start a test server using `config`, the scripted describer and a fixed credential
pub async fn test_server(
    config: ServiceConfig,
    describer: Arc<MockDescriber>,
    api_key: Option<&str>,
) -> TestServer {
    let config = Config::from(config);

    let describers = DescriberRegistry::new();
    describers
        .register(
            describer.clone(),
            DescriberInfo {
                name: "gemini".to_string(),
                description: "scripted describer".to_string(),
                credential_env: "GEMINI_API_KEY".to_string(),
            },
        )
        .await
        .expect("Failed to register describer");

    let state = Arc::new(AppState {
        config: config.clone(),
        describers,
        describer,
        credentials: CredentialSource::Fixed(api_key.map(String::from)),
    });

    let router = routes::setup_routes(&config, state).expect("Failed to build routes");
    TestServer::new(router).expect("Failed to create test server")
}

/// Server with default configuration, a working credential and a fixed reply
pub async fn default_server(describer: Arc<MockDescriber>) -> TestServer {
    test_server(ServiceConfig::default(), describer, Some(TEST_API_KEY)).await
}
