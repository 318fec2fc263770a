//! Asynchronous text classification used by the real-world-language check.
//!
//! The classifier is an opaque remote service: `classify(text, domain)`
//! returns a label when the text reads as domain jargon. Every failure mode
//! (network, timeout, rate limit, bad payload) degrades to "no finding".

mod cache;
mod jargon;

pub use cache::ClassificationCache;
pub use jargon::{Candidate, LanguageReview};

use std::time::Duration;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a classification round trip.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("rate limited by classifier")]
    RateLimited,
    #[error("classifier returned HTTP {0}")]
    Status(u16),
    #[error("malformed classifier response: {0}")]
    Malformed(String),
}

/// A text classifier.
pub trait TextClassifier: Send + Sync {
    /// Classify `text`. `Ok(None)` means plain language.
    fn classify<'a>(
        &'a self,
        text: &'a str,
        domain: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Option<String>, ClassifierError>>;
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<&'a str>,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    #[serde(default)]
    label: Option<String>,
}

/// Classifier reached over HTTP: `POST {text, domain}` returning
/// `{label: string | null}`.
pub struct HttpClassifier {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpClassifier {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClassifierError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("usecheck/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key,
            timeout,
        })
    }

    async fn request(&self, text: &str, domain: Option<&str>) -> Result<Option<String>, ClassifierError> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&ClassifyRequest { text, domain });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClassifierError::Timeout
            } else {
                ClassifierError::Network(e)
            }
        })?;

        match response.status().as_u16() {
            200 => {}
            429 => return Err(ClassifierError::RateLimited),
            status => return Err(ClassifierError::Status(status)),
        }

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Malformed(e.to_string()))?;
        Ok(body.label.filter(|l| !l.trim().is_empty()))
    }
}

impl TextClassifier for HttpClassifier {
    fn classify<'a>(
        &'a self,
        text: &'a str,
        domain: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Option<String>, ClassifierError>> {
        Box::pin(self.request(text, domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(ClassifyRequest {
            text: "Adjudicate claim",
            domain: Some("insurance"),
        })
        .unwrap();
        assert_eq!(body["text"], "Adjudicate claim");
        assert_eq!(body["domain"], "insurance");

        let body = serde_json::to_value(ClassifyRequest {
            text: "Save",
            domain: None,
        })
        .unwrap();
        assert!(body.get("domain").is_none());
    }

    #[test]
    fn test_response_shape() {
        let r: ClassifyResponse = serde_json::from_str(r#"{"label": "insurance-jargon"}"#).unwrap();
        assert_eq!(r.label.as_deref(), Some("insurance-jargon"));
        let r: ClassifyResponse = serde_json::from_str(r#"{"label": null}"#).unwrap();
        assert!(r.label.is_none());
        let r: ClassifyResponse = serde_json::from_str("{}").unwrap();
        assert!(r.label.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let classifier = HttpClassifier::new(
            "http://127.0.0.1:9/classify",
            None,
            Duration::from_millis(500),
        )
        .unwrap();
        assert!(classifier.classify("Adjudicate", None).await.is_err());
    }
}
