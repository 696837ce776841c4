//! Configuration management for model invocation.
//!
//! A configuration resource is a line-oriented text file: `#` comment lines and
//! blank lines are dropped, the remainder is base64 text whose decoded bytes are
//! shifted by a fixed offset. The plaintext holds `[model:<name>]` sections of
//! `key=value` lines which become a [`ConfigCatalog`].

#![warn(missing_docs, clippy::pedantic)]

pub mod catalog;
pub mod codec;
pub mod model_config;
pub mod source;

mod error;
mod store;

pub use catalog::{ConfigCatalog, SECTION_MARKER, parse, parse_with_sink};
pub use codec::{Base64Encoding, ConfigCodec, PlainEncoding, ShiftCipher, TransferEncoding};
pub use error::{ConfigError, ConfigResult};
pub use model_config::{DEFAULT_MAX_TOKENS, ModelConfig};
pub use source::{FileResource, ResourceSource, StaticResource};
pub use store::ConfigStore;
