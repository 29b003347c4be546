/*!
 * Remote bridge client for the Logseq HTTP plugin API
 *
 * Everything goes through one POST endpoint (`<base_url>/api`) that accepts
 * `{"method": <string>, "args": [...]}` and answers with an arbitrary JSON
 * value. The probe sends an intentionally invalid (empty) method name and
 * treats exactly HTTP 400 as "alive": a live server rejects the bogus
 * method. Any other status and any transport failure means the application
 * is not there.
 */

use std::time::Duration;

use serde_json::{json, Value};
use tracing::debug;

use crate::config::GraphConfig;
use crate::error::{Result, TetherError};

/// Probe round-trip budget; a live local server answers well within this
const PROBE_TIMEOUT: Duration = Duration::from_millis(1500);

/// Default budget for real calls
const CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// The subset of the bridge the reconciler dispatches against.
///
/// `HttpBridge` is the production implementation; tests substitute
/// recording or failing implementations.
pub trait BridgeClient {
    /// Boolean liveness probe; must never fail
    fn probe_availability(&self) -> bool;

    /// Create a page with the given name and initial content
    fn create_page(&self, name: &str, content: &str) -> Result<Value>;

    /// Insert a block under (or next to) the given parent block
    fn insert_block(&self, parent_uuid: &str, content: &str, sibling: bool) -> Result<Value>;
}

/// Blocking HTTP client for the plugin API
pub struct HttpBridge {
    base_url: String,
    token: String,
    client: reqwest::blocking::Client,
}

impl HttpBridge {
    pub fn new(config: &GraphConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(CALL_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            client,
        })
    }

    /// Base URL this bridge talks to (trailing slashes trimmed)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(
        &self,
        body: &Value,
        timeout: Duration,
    ) -> std::result::Result<reqwest::blocking::Response, reqwest::Error> {
        let mut request = self
            .client
            .post(format!("{}/api", self.base_url))
            .timeout(timeout)
            .json(body);
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }
        request.send()
    }

    /// Generic bridge to the plugin API.
    ///
    /// `method` maps to a plugin API method, e.g. `logseq.Editor.createPage`;
    /// `args` are passed positionally.
    pub fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Value> {
        let body = json!({ "method": method, "args": args });
        let response = self.post(&body, CALL_TIMEOUT)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TetherError::RemoteCall {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json()?)
    }

    pub fn get_page(&self, name: &str) -> Result<Value> {
        self.invoke("logseq.Editor.getPage", vec![json!(name)])
    }

    pub fn get_current_graph(&self) -> Result<Value> {
        self.invoke("logseq.App.getCurrentGraph", vec![])
    }
}

impl BridgeClient for HttpBridge {
    fn probe_availability(&self) -> bool {
        let body = json!({ "method": "", "args": [] });
        match self.post(&body, PROBE_TIMEOUT) {
            Ok(response) => {
                let alive = response.status() == reqwest::StatusCode::BAD_REQUEST;
                debug!(status = %response.status(), alive, "availability probe answered");
                alive
            }
            Err(e) => {
                debug!(error = %e, "availability probe failed, treating as unavailable");
                false
            }
        }
    }

    fn create_page(&self, name: &str, content: &str) -> Result<Value> {
        self.invoke(
            "logseq.Editor.createPage",
            vec![
                json!(name),
                json!({ "createFirstBlock": true, "redirect": false, "format": "markdown" }),
                json!(content),
            ],
        )
    }

    fn insert_block(&self, parent_uuid: &str, content: &str, sibling: bool) -> Result<Value> {
        self.invoke(
            "logseq.Editor.insertBlock",
            vec![json!(parent_uuid), json!(content), json!({ "sibling": sibling })],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let mut config = GraphConfig::new("/tmp/graph");
        config.api_url = "http://127.0.0.1:12315/".to_string();
        let bridge = HttpBridge::new(&config).unwrap();
        assert_eq!(bridge.base_url(), "http://127.0.0.1:12315");
    }

    #[test]
    fn test_bridge_is_object_safe() {
        let config = GraphConfig::new("/tmp/graph");
        let bridge = HttpBridge::new(&config).unwrap();
        let _object: &dyn BridgeClient = &bridge;
    }
}
