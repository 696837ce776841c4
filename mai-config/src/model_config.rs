//! Settings for a single named model.

use std::collections::BTreeMap;
use std::fmt;

/// Token budget used when `maxTokens` is absent or unusable.
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

pub(crate) const ENDPOINT_KEY: &str = "endpoint";
pub(crate) const API_KEY_KEY: &str = "apiKey";
pub(crate) const MAX_TOKENS_KEY: &str = "maxTokens";

/// Connection settings for one model, taken from a `[model:<name>]` section.
#[derive(Clone, PartialEq, Eq)]
pub struct ModelConfig {
    endpoint: String,
    api_key: String,
    max_tokens: Option<String>,
    extra: BTreeMap<String, String>,
}

impl ModelConfig {
    /// Creates a configuration from the two required settings.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            max_tokens: None,
            extra: BTreeMap::new(),
        }
    }

    /// Sets the raw `maxTokens` value.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: impl Into<String>) -> Self {
        self.max_tokens = Some(max_tokens.into());
        self
    }

    /// Adds a setting that has no dedicated accessor.
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Builds a configuration from a section's key/value pairs.
    ///
    /// Returns the reason when a required key is missing or empty.
    pub(crate) fn from_settings(
        mut settings: BTreeMap<String, String>,
    ) -> Result<Self, &'static str> {
        let endpoint = take_required(&mut settings, ENDPOINT_KEY)
            .ok_or("missing endpoint")?;
        let api_key = take_required(&mut settings, API_KEY_KEY).ok_or("missing apiKey")?;
        let max_tokens = settings.remove(MAX_TOKENS_KEY);

        Ok(Self {
            endpoint,
            api_key,
            max_tokens,
            extra: settings,
        })
    }

    /// Returns the chat-completion endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the API key sent in the `api-key` header.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns `maxTokens` exactly as written in the section.
    #[must_use]
    pub fn raw_max_tokens(&self) -> Option<&str> {
        self.max_tokens.as_deref()
    }

    /// Returns the token budget for requests.
    ///
    /// The leading run of digits of `maxTokens` is used; absent, non-numeric,
    /// zero, or out-of-range values fall back to [`DEFAULT_MAX_TOKENS`].
    #[must_use]
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
            .as_deref()
            .and_then(parse_leading_integer)
            .unwrap_or(DEFAULT_MAX_TOKENS)
    }

    /// Looks up any setting of the section by key.
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&str> {
        match key {
            ENDPOINT_KEY => Some(&self.endpoint),
            API_KEY_KEY => Some(&self.api_key),
            MAX_TOKENS_KEY => self.raw_max_tokens(),
            _ => self.extra.get(key).map(String::as_str),
        }
    }

    /// Returns settings without a dedicated accessor.
    #[must_use]
    pub fn extra_settings(&self) -> &BTreeMap<String, String> {
        &self.extra
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("max_tokens", &self.max_tokens)
            .field("extra", &self.extra)
            .finish()
    }
}

fn take_required(settings: &mut BTreeMap<String, String>, key: &str) -> Option<String> {
    settings.remove(key).filter(|value| !value.is_empty())
}

// Stricter than JavaScript's `parseInt`: only an optional `+` and decimal
// digits are read, so `-5` and `0x10` yield `None`. Zero and overflow do too.
fn parse_leading_integer(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    unsigned[..digits].parse::<u32>().ok().filter(|value| *value > 0)
}
