//! Model configuration loading and chat-completion invocation.
//!
//! This crate bundles the workspace crates behind feature flags so downstream
//! users can pull in only the config store, or the full invoker.
//!
//! ```no_run
//! use mai_invoker::adapters::{Completion, ModelInvoker};
//! use mai_invoker::config::{ConfigStore, FileResource};
//!
//! # async fn run() -> Result<(), mai_invoker::adapters::InvokeError> {
//! let store = ConfigStore::new(FileResource::new("resources/key.txt"));
//! let invoker = ModelInvoker::new(store);
//!
//! match invoker.invoke("Summarize this profile", "gpt4").await? {
//!     Completion::Json(value) => println!("{value}"),
//!     Completion::NonJson { raw_content } => eprintln!("model did not answer in JSON: {raw_content}"),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, clippy::pedantic)]

/// Config store: resource sources, codec, and catalog (enabled by `config` feature).
#[cfg(feature = "config")]
pub use mai_config as config;

/// Model invoker and HTTP adapters (enabled by `adapters` feature).
#[cfg(feature = "adapters")]
pub use mai_adapters as adapters;

/// Checkpoint sinks and tracing bootstrap (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use mai_telemetry as telemetry;
