use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Transport used to reach the remote image processor.
///
/// Defined in core because it is read from configuration and consumed by the
/// invoker factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvokerBackend {
    /// AWS Lambda `Invoke` API through the AWS SDK
    #[default]
    Lambda,
    /// Plain HTTP POST to a function URL
    Http,
}

impl FromStr for InvokerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lambda" => Ok(InvokerBackend::Lambda),
            "http" => Ok(InvokerBackend::Http),
            _ => Err(anyhow::anyhow!("Invalid invoker backend: {}", s)),
        }
    }
}

impl Display for InvokerBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            InvokerBackend::Lambda => write!(f, "lambda"),
            InvokerBackend::Http => write!(f, "http"),
        }
    }
}
