//! Dialogflow ES client
//!
//! Calls the v2 `detectIntent` REST endpoint for one session at a time.

use super::{IntentService, RawIntent};
use crate::config::Settings;
use crate::http_utils::{create_http_client, send_json_request, TransportError};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Intent classification backed by a Dialogflow agent
pub struct DialogflowClient {
    http: HttpClient,
    base_url: String,
    project_id: String,
    access_token: String,
}

impl DialogflowClient {
    /// Create a client for the configured project
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: create_http_client(settings.http_timeout_secs),
            base_url: settings.dialogflow_base_url.trim_end_matches('/').to_string(),
            project_id: settings.dialogflow_project_id.clone(),
            access_token: settings.dialogflow_access_token.clone(),
        }
    }

    fn session_url(&self, session_id: &str) -> String {
        format!(
            "{}/projects/{}/agent/sessions/{}:detectIntent",
            self.base_url, self.project_id, session_id
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentResponse {
    #[serde(default)]
    query_result: QueryResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResult {
    #[serde(default)]
    intent: Option<IntentRef>,
    #[serde(default)]
    parameters: Map<String, Value>,
    #[serde(default)]
    fulfillment_text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentRef {
    #[serde(default)]
    display_name: String,
}

impl From<DetectIntentResponse> for RawIntent {
    fn from(response: DetectIntentResponse) -> Self {
        let result = response.query_result;
        Self {
            name: result.intent.map(|i| i.display_name).unwrap_or_default(),
            parameters: result.parameters,
            fulfillment_text: result.fulfillment_text,
        }
    }
}

fn request_body(text: &str, language_code: &str) -> Value {
    json!({
        "queryInput": {
            "text": {
                "text": text,
                "languageCode": language_code,
            }
        }
    })
}

#[async_trait::async_trait]
impl IntentService for DialogflowClient {
    async fn detect_intent(
        &self,
        session_id: &str,
        text: &str,
        language_code: &str,
    ) -> Result<RawIntent, TransportError> {
        let auth = format!("Bearer {}", self.access_token);
        let response = send_json_request(
            &self.http,
            &self.session_url(session_id),
            &request_body(text, language_code),
            Some(&auth),
        )
        .await?;

        let parsed: DetectIntentResponse = serde_json::from_value(response)
            .map_err(|e| TransportError::JsonError(e.to_string()))?;
        let intent = RawIntent::from(parsed);
        debug!(session_id, intent = %intent.name, "Intent detected");
        Ok(intent)
    }
}
