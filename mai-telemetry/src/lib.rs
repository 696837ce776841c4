//! Observability utilities for the model invoker.
//!
//! Pipeline stages report [`Checkpoint`]s to an injected [`CheckpointSink`]
//! instead of printing directly. [`TracingSink`] forwards them to `tracing`;
//! [`CollectingSink`] keeps them in memory for assertions.

#![warn(missing_docs, clippy::pedantic)]

mod checkpoint;
mod subscriber;

pub use checkpoint::{Checkpoint, CheckpointSink, CollectingSink, NoopSink, TracingSink};
pub use subscriber::init_tracing;
