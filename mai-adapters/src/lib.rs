//! Model invocation and HTTP adapters.
//!
//! [`invoker::ModelInvoker`] resolves a model through a
//! [`mai_config::ConfigStore`], sends one chat-completion request through a
//! [`transport::HttpTransport`], and normalizes the reply into a
//! [`completion::Completion`].

#![warn(missing_docs, clippy::pedantic)]

pub mod completion;
pub mod error;
pub mod invoker;
pub mod resource;
pub mod transport;

pub use completion::{Completion, NON_JSON_ERROR};
pub use error::{InvokeError, InvokeResult};
pub use invoker::{DEFAULT_TEMPERATURE, ModelInvoker};
pub use resource::HttpResource;
pub use transport::{HttpTransport, HyperTransport};
