#[cfg(feature = "invoker-http")]
use crate::HttpInvoker;
#[cfg(feature = "invoker-lambda")]
use crate::LambdaInvoker;
use crate::{InvokerBackend, RemoteInvoker};
use imgbatch_core::{EditorConfig, EditorError};
use std::sync::Arc;

/// Create a remote invoker based on configuration
pub async fn create_invoker(config: &EditorConfig) -> Result<Arc<dyn RemoteInvoker>, EditorError> {
    match config.invoker_backend {
        #[cfg(feature = "invoker-lambda")]
        InvokerBackend::Lambda => {
            let invoker = LambdaInvoker::new(config).await?;
            Ok(Arc::new(invoker))
        }

        #[cfg(not(feature = "invoker-lambda"))]
        InvokerBackend::Lambda => Err(EditorError::Config(
            "Lambda invoker not available (invoker-lambda feature not enabled)".to_string(),
        )),

        #[cfg(feature = "invoker-http")]
        InvokerBackend::Http => {
            let invoker = HttpInvoker::from_config(config)?;
            Ok(Arc::new(invoker))
        }

        #[cfg(not(feature = "invoker-http"))]
        InvokerBackend::Http => Err(EditorError::Config(
            "HTTP invoker not available (invoker-http feature not enabled)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_http_backend_requires_endpoint() {
        let mut config = EditorConfig::for_bucket("media-bucket");
        config.invoker_backend = InvokerBackend::Http;
        assert!(matches!(
            create_invoker(&config).await,
            Err(EditorError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_http_backend() {
        let mut config = EditorConfig::for_bucket("media-bucket");
        config.invoker_backend = InvokerBackend::Http;
        config.function_url = Some("http://localhost:9000/2015-03-31/functions/fn/invocations".to_string());
        let invoker = create_invoker(&config).await.unwrap();
        assert_eq!(invoker.function_name(), "wordpress_image_processor-production");
    }
}
