use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::BrowserConfig;
use crate::fetch::PageFetcher;
use crate::fetch::ensure_rendered;
use crate::fetch::error::FetchError;
use crate::fetch::error::Result;

/// Leaves the browser service time to answer after its own waits ran out.
const RESPONSE_SLACK: Duration = Duration::from_secs(15);

/// Loads pages through the `/content` endpoint of a headless-browser service, which
/// returns the page source once the page scripts rendered the required elements.
pub(crate) struct BrowserClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
    settle: Duration,
}

impl BrowserClient {
    pub fn new(config: &BrowserConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        let endpoint = format!("{}/content", config.endpoint.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            token: config.token.clone(),
            settle: Duration::from_millis(config.settle_millis),
        })
    }
}

impl PageFetcher for BrowserClient {
    fn fetch(&self, url: &str, required_elements: &[String], timeout: Duration) -> Result<String> {
        let body = ContentRequest {
            url,
            wait_for_function: (!required_elements.is_empty()).then(|| WaitForFunction {
                function: wait_script(required_elements),
                timeout: timeout.as_millis() as u64,
            }),
            wait_for_timeout: self.settle.as_millis() as u64,
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .timeout(timeout + self.settle + RESPONSE_SLACK);

        if let Some(token) = &self.token {
            request = request.query(&[("token", token)]);
        }

        debug!(url, endpoint = %self.endpoint, "requesting rendered page");
        let response = request.send()?;

        match response.status() {
            StatusCode::OK => {
                let html = response.text()?;
                ensure_rendered(url, &html, required_elements, timeout)?;
                Ok(html)
            }
            StatusCode::REQUEST_TIMEOUT => Err(FetchError::Timeout {
                url: url.to_owned(),
                missing: required_elements.to_vec(),
                timeout_secs: timeout.as_secs(),
            }),
            status_code => {
                let message = response.text()?;
                let error = FetchError::Response {
                    status_code,
                    message,
                };
                Err(error)
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_for_function: Option<WaitForFunction>,
    wait_for_timeout: u64,
}

#[derive(Debug, Serialize)]
struct WaitForFunction {
    #[serde(rename = "fn")]
    function: String,
    timeout: u64,
}

/// A browser-side predicate that holds once every required element is in the DOM.
fn wait_script(ids: &[String]) -> String {
    let ids = serde_json::to_string(ids).unwrap_or_else(|_| String::from("[]"));
    format!("() => {ids}.every((id) => document.getElementById(id) !== null)")
}
