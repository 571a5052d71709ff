//! Blocking client for the public Google Translate endpoint.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use crate::translate::Translator;
use crate::{Error, Result};

/// Translator backed by `translate.googleapis.com`.
///
/// Every call is a blocking HTTP request. Do not call it from an async
/// context; the server runs queries on the blocking pool.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub const DEFAULT_ENDPOINT: &'static str = "https://translate.googleapis.com/translate_a/single";

    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(Error::Validation(
                "translation endpoint must not be empty".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Translation(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, text: &str, target: &str) -> Result<Translation> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .map_err(|e| Error::Translation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Error::Translation(format!(
                "provider returned {status}: {body}"
            )));
        }

        let body: Value = response
            .json()
            .map_err(|e| Error::Translation(format!("malformed response: {e}")))?;
        parse_response(&body)
    }
}

impl Translator for GoogleTranslator {
    fn detect(&self, text: &str) -> Result<String> {
        let translation = self.request(text, "en")?;
        translation
            .source_language
            .ok_or_else(|| Error::Translation("provider did not report a language".to_string()))
    }

    fn translate(&self, text: &str, target: &str) -> Result<String> {
        let translation = self.request(text, target)?;
        debug!(
            target,
            source = translation.source_language.as_deref().unwrap_or("unknown"),
            chars = text.chars().count(),
            "translated text"
        );
        Ok(translation.text)
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Translation {
    text: String,
    source_language: Option<String>,
}

/// The response is a nested array: `[[[translated, original, ...], ...], null, "detected"]`.
/// Long inputs come back as several segments that concatenate to the full text.
fn parse_response(body: &Value) -> Result<Translation> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Translation("response has no translation segments".to_string()))?;

    let text = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect::<String>();

    let source_language = body
        .get(2)
        .and_then(Value::as_str)
        .filter(|code| !code.is_empty())
        .map(str::to_owned);

    Ok(Translation {
        text,
        source_language,
    })
}
