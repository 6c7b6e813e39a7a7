//! imgbatch Invoker Library
//!
//! This crate sends an operation batch to the remote image-processing function
//! and interprets its answer. It includes the `RemoteInvoker` trait and transports
//! for the AWS Lambda `Invoke` API and for plain HTTP function URLs.
//!
//! Invocations are either awaited (`RemoteInvoker::invoke`) or detached onto the
//! tokio runtime (`RemoteInvoker::invoke_detached`), returning a
//! `PendingInvocation` that must be joined later.

pub mod factory;
#[cfg(feature = "invoker-http")]
pub mod http;
#[cfg(feature = "invoker-lambda")]
pub mod lambda;
pub mod request;
pub mod response;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod traits;

// Re-export commonly used types
pub use factory::create_invoker;
#[cfg(feature = "invoker-http")]
pub use http::HttpInvoker;
pub use imgbatch_core::InvokerBackend;
#[cfg(feature = "invoker-lambda")]
pub use lambda::LambdaInvoker;
pub use request::{InvocationRequest, ReturnMode};
pub use response::InvocationResponse;
pub use traits::{PendingInvocation, RemoteInvoker};
