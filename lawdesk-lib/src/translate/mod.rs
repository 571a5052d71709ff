//! Language detection and translation
//!
//! Retrieval and answer synthesis always happen in the pivot language
//! (English). A [`Translator`] moves queries into the pivot and answers back
//! out of it. The provider is an external service; implementations here are
//! thin clients.
//!
//! Translators do not retry and do not cache: every call goes to the provider.

use tracing::debug;

use crate::Result;

/// Trait for translation providers
pub trait Translator: Send + Sync {
    /// Detect the language of `text`, returning a language code such as `"ta"`
    fn detect(&self, text: &str) -> Result<String>;

    /// Translate `text` into the `target` language
    fn translate(&self, text: &str, target: &str) -> Result<String>;
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn detect(&self, text: &str) -> Result<String> {
        (**self).detect(text)
    }

    fn translate(&self, text: &str, target: &str) -> Result<String> {
        (**self).translate(text, target)
    }
}

/// Compare two language codes on their primary subtag, ignoring case.
///
/// `"en"`, `"EN"` and `"en-US"` all name English.
#[must_use]
pub fn same_language(a: &str, b: &str) -> bool {
    fn primary(code: &str) -> &str {
        code.trim().split(['-', '_']).next().unwrap_or_default()
    }
    primary(a).eq_ignore_ascii_case(primary(b))
}

/// Translator for deployments without a translation provider.
///
/// Reports every text as the pivot language and returns text unchanged, so
/// the service answers in English regardless of the requested language.
#[derive(Debug, Clone)]
pub struct PassthroughTranslator {
    pivot: String,
}

impl PassthroughTranslator {
    #[must_use]
    pub fn new(pivot: impl Into<String>) -> Self {
        Self {
            pivot: pivot.into(),
        }
    }
}

impl Translator for PassthroughTranslator {
    fn detect(&self, _text: &str) -> Result<String> {
        Ok(self.pivot.clone())
    }

    fn translate(&self, text: &str, target: &str) -> Result<String> {
        debug!(target, "translation disabled, returning text unchanged");
        Ok(text.to_owned())
    }
}

mod google;

pub use google::*;
