use crate::{BucketKeyMapper, ImageProbe, KeyMapper, SizeProbe};
use imgbatch_core::{EditorConfig, EditorError};
use std::sync::Arc;
use std::time::Duration;

/// Create the key mapper for the configured bucket and upload directory
pub fn create_key_mapper(config: &EditorConfig) -> Result<Arc<dyn KeyMapper>, EditorError> {
    let bucket = config
        .bucket
        .clone()
        .ok_or_else(|| EditorError::Config("AWS_LAMBDA_IMAGE_BUCKET not configured".to_string()))?;

    if config.upload_base_dir.is_none() {
        tracing::warn!(
            bucket = %bucket,
            "UPLOAD_BASE_DIR not configured, only bucket-qualified paths can be mapped"
        );
    }

    Ok(Arc::new(BucketKeyMapper::new(
        bucket,
        config.upload_base_dir.clone(),
    )))
}

/// Create the size probe, sharing the invoke timeout for URL fetches
///
/// Bucket references are readable when an object base URL is configured or can
/// be derived from bucket and region.
pub fn create_size_probe(config: &EditorConfig) -> Result<Arc<dyn SizeProbe>, EditorError> {
    let mut probe = ImageProbe::new(Duration::from_secs(config.invoke_timeout_secs))?;

    match (&config.bucket, config.object_base_url()) {
        (Some(bucket), Some(base_url)) => {
            tracing::debug!(bucket = %bucket, base_url = %base_url, "Bucket objects probed over HTTP");
            probe = probe.with_bucket(
                BucketKeyMapper::new(bucket.clone(), config.upload_base_dir.clone()),
                base_url,
            );
        }
        (Some(bucket), None) => {
            tracing::warn!(
                bucket = %bucket,
                "Neither AWS_LAMBDA_IMAGE_BUCKET_URL nor AWS_LAMBDA_IMAGE_REGION configured, bucket references cannot be probed"
            );
        }
        _ => {}
    }

    Ok(Arc::new(probe))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_key_mapper_requires_bucket() {
        let mut config = EditorConfig::for_bucket("media-bucket");
        config.bucket = None;
        assert!(matches!(
            create_key_mapper(&config),
            Err(EditorError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_size_probe_reads_bucket_objects_from_configured_url() {
        let mut server = mockito::Server::new_async().await;
        let mut png = std::io::Cursor::new(Vec::new());
        image::DynamicImage::new_rgb8(64, 48)
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();
        let mock = server
            .mock("GET", "/2024/05/photo.png")
            .with_status(206)
            .with_body(png.into_inner())
            .create_async()
            .await;

        let mut config = EditorConfig::for_bucket("media-bucket");
        config.bucket_url = Some(server.url());
        let probe = create_size_probe(&config).unwrap();
        let probed = probe
            .probe("s3://media-bucket/2024/05/photo.png")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!((probed.width, probed.height), (64, 48));
    }

    #[test]
    fn test_create_key_mapper_uses_upload_dir() {
        let mut config = EditorConfig::for_bucket("media-bucket");
        config.upload_base_dir = Some("/srv/uploads".to_string());
        let mapper = create_key_mapper(&config).unwrap();
        assert_eq!(mapper.to_key("/srv/uploads/a.jpg").unwrap(), "a.jpg");
    }
}
