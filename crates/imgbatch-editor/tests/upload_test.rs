use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use imgbatch_core::Operation;
use imgbatch_editor::{handle_upload, EditorContext, ImageEditor, LambdaImageEditor, UploadedFile};
use imgbatch_invoker::test_helpers::RecordingInvoker;
use imgbatch_invoker::ReturnMode;
use imgbatch_storage::{BucketKeyMapper, ImageProbe};

fn write_png(dir: &std::path::Path, name: &str, width: u32, height: u32) -> String {
    let path = dir.join(name);
    DynamicImage::new_rgb8(width, height).save(&path).unwrap();
    path.to_str().unwrap().to_string()
}

fn context(invoker: Arc<RecordingInvoker>, upload_dir: &std::path::Path) -> Arc<EditorContext> {
    Arc::new(
        EditorContext::new(
            invoker,
            Arc::new(BucketKeyMapper::new(
                "media-bucket",
                Some(upload_dir.to_str().unwrap().to_string()),
            )),
            Arc::new(ImageProbe::new(Duration::from_secs(5)).unwrap()),
            "media-bucket",
        )
        .with_max_image_size(100),
    )
}

#[tokio::test]
async fn test_oversized_upload_is_downscaled_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_png(dir.path(), "photo.png", 300, 200);
    let invoker = Arc::new(RecordingInvoker::new());

    let upload = UploadedFile {
        file: file.clone(),
        mime_type: "image/png".to_string(),
    };
    let result = handle_upload(context(invoker.clone(), dir.path()), upload.clone()).await;

    assert_eq!(result, upload);

    let calls = invoker.calls();
    assert_eq!(calls.len(), 1);
    let request = &calls[0].request;
    assert_eq!(request.filename, "photo.png");
    assert_eq!(request.new_filename, "photo.png");
    assert_eq!(request.return_mode, ReturnMode::Bucket);
    assert_eq!(
        request.operations,
        vec![Operation::Resize {
            width: 100,
            height: 67
        }]
    );
}

#[tokio::test]
async fn test_small_upload_is_saved_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_png(dir.path(), "icon.png", 50, 40);
    let invoker = Arc::new(RecordingInvoker::new());

    handle_upload(
        context(invoker.clone(), dir.path()),
        UploadedFile {
            file,
            mime_type: "image/png".to_string(),
        },
    )
    .await;

    let calls = invoker.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].request.operations.is_empty());
}

#[tokio::test]
async fn test_remote_failure_does_not_fail_upload() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_png(dir.path(), "photo.png", 300, 200);
    let invoker = Arc::new(RecordingInvoker::new().with_status(502));

    let upload = UploadedFile {
        file,
        mime_type: "image/png".to_string(),
    };
    let result = handle_upload(context(invoker.clone(), dir.path()), upload.clone()).await;

    assert_eq!(result, upload);
    assert_eq!(invoker.call_count(), 1);
}

#[tokio::test]
async fn test_load_real_file_and_chain_saves() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_png(dir.path(), "banner.png", 400, 100);
    let invoker = Arc::new(RecordingInvoker::new());

    let mut editor = <LambdaImageEditor as ImageEditor>::load(context(invoker.clone(), dir.path()), &file)
        .await
        .unwrap();
    assert_eq!(editor.mime_type(), "image/png");

    editor.resize(Some(200), None, false).unwrap();
    let first = editor.save(None, None).await.unwrap();
    assert_eq!(first.file, "banner-200x50.png");

    // The saved output is now the source
    editor.rotate(90.0);
    let second = editor.save(None, None).await.unwrap();
    assert_eq!(second.file, "banner-200x50-50x200.png");

    let calls = invoker.calls();
    assert_eq!(calls[1].request.filename, "banner-200x50.png");
    assert_eq!(
        calls[1].request.operations,
        vec![Operation::Rotate { angle: 90.0 }]
    );
}
