use std::sync::Arc;
use std::time::Duration;

use imgbatch_core::{EditorError, ImageSize, Operation};
use imgbatch_editor::{EditorContext, ImageEditor, LambdaImageEditor, SizeTarget, SizeTargets};
use imgbatch_invoker::test_helpers::{InvocationMode, RecordingInvoker};
use imgbatch_storage::test_helpers::StaticProbe;
use imgbatch_storage::{BucketKeyMapper, KeyMapper};

const SOURCE: &str = "s3://media-bucket/2024/05/photo.jpg";

/// Refuses destinations containing a marker, otherwise maps like the bucket mapper.
struct RejectingKeyMapper {
    inner: BucketKeyMapper,
    marker: &'static str,
}

impl KeyMapper for RejectingKeyMapper {
    fn to_key(&self, file: &str) -> Result<String, EditorError> {
        if file.contains(self.marker) {
            return Err(EditorError::KeyMapping(format!("{} is read-only", file)));
        }
        self.inner.to_key(file)
    }
}

fn context_with_mapper(
    invoker: Arc<RecordingInvoker>,
    key_mapper: Arc<dyn KeyMapper>,
) -> Arc<EditorContext> {
    let probe = StaticProbe::new().with_image(SOURCE, 1024, 768, "image/jpeg");
    Arc::new(EditorContext::new(invoker, key_mapper, Arc::new(probe), "media-bucket"))
}

async fn load(invoker: Arc<RecordingInvoker>) -> LambdaImageEditor {
    let mapper = Arc::new(BucketKeyMapper::new("media-bucket", None));
    LambdaImageEditor::load(context_with_mapper(invoker, mapper), SOURCE)
        .await
        .unwrap()
}

fn targets() -> SizeTargets {
    let mut targets = SizeTargets::new();
    targets.insert(
        "thumbnail".to_string(),
        SizeTarget::new(Some(150), Some(150), true),
    );
    targets.insert(
        "medium".to_string(),
        SizeTarget::new(Some(300), Some(300), false),
    );
    targets.insert(
        "medium_large".to_string(),
        SizeTarget {
            width: Some(768),
            height: None,
            crop: None,
        },
    );
    targets.insert(
        "large".to_string(),
        SizeTarget::new(Some(1024), Some(1024), false),
    );
    targets.insert(
        "huge".to_string(),
        SizeTarget::new(Some(2048), Some(2048), false),
    );
    targets.insert("empty".to_string(), SizeTarget::default());
    targets
}

#[tokio::test]
async fn test_multi_resize_results_in_request_order() {
    let invoker = Arc::new(RecordingInvoker::new());
    let mut editor = load(invoker.clone()).await;

    let output = editor.multi_resize(&targets()).await.unwrap();

    assert_eq!(
        output.labels().collect::<Vec<_>>(),
        vec!["thumbnail", "medium", "medium_large"]
    );

    let metadata = output.metadata();
    let thumbnail = &metadata["thumbnail"];
    assert_eq!(thumbnail.path, None);
    assert_eq!(thumbnail.file, "photo-150x150.jpg");
    assert_eq!((thumbnail.width, thumbnail.height), (150, 150));
    assert_eq!(metadata["medium"].file, "photo-300x225.jpg");
    assert_eq!(metadata["medium_large"].file, "photo-768x576.jpg");
}

#[tokio::test]
async fn test_sibling_sizes_do_not_share_operations() {
    let invoker = Arc::new(RecordingInvoker::new());
    let mut editor = load(invoker.clone()).await;
    editor.flip(true, false);

    editor.multi_resize(&targets()).await.unwrap();

    let flip = Operation::Flip {
        horizontal: true,
        vertical: false,
    };
    let calls = invoker.calls();
    assert_eq!(calls.len(), 3);

    assert_eq!(
        calls[0].request.operations,
        vec![
            flip.clone(),
            Operation::Crop {
                src_x: 128,
                src_y: 0,
                src_width: 768,
                src_height: 768,
                destination_width: Some(150),
                destination_height: Some(150),
            },
        ]
    );
    assert_eq!(
        calls[1].request.operations,
        vec![
            flip.clone(),
            Operation::Resize {
                width: 300,
                height: 225
            },
        ]
    );
    assert_eq!(calls[1].request.new_filename, "2024/05/photo-300x225.jpg");

    // The session is left as it was before the call
    assert_eq!(editor.size(), ImageSize::new(1024, 768));
    assert_eq!(editor.operations().to_vec(), vec![flip]);
}

#[tokio::test]
async fn test_first_size_awaited_rest_detached_and_joined() {
    let invoker = Arc::new(RecordingInvoker::new().with_delay(Duration::from_millis(20)));
    let mut editor = load(invoker.clone()).await;

    let output = editor.multi_resize(&targets()).await.unwrap();
    assert_eq!(output.len(), 3);

    let calls = invoker.calls();
    let modes: Vec<_> = calls.iter().map(|c| c.mode).collect();
    assert_eq!(
        modes,
        vec![
            InvocationMode::Awaited,
            InvocationMode::Detached,
            InvocationMode::Detached
        ]
    );

    // Every branch finished before multi_resize returned
    assert!(calls.iter().all(|c| c.finished.is_some()));
    assert_eq!(invoker.completed(), 3);

    // The awaited size finished before anything was detached
    let awaited_finished = calls[0].finished.unwrap();
    assert!(calls[1..].iter().all(|c| c.started >= awaited_finished));

    // Detached sizes were all in flight together
    let first_detached_finish = calls[1..]
        .iter()
        .filter_map(|c| c.finished)
        .min()
        .unwrap();
    assert!(calls[1..].iter().all(|c| c.started <= first_detached_finish));
}

#[tokio::test]
async fn test_size_identical_to_original_is_skipped() {
    let invoker = Arc::new(RecordingInvoker::new());
    let mut editor = load(invoker.clone()).await;

    let mut targets = SizeTargets::new();
    targets.insert(
        "full".to_string(),
        SizeTarget::new(Some(1024), Some(768), false),
    );
    targets.insert(
        "large".to_string(),
        SizeTarget::new(Some(1024), Some(1024), false),
    );

    let output = editor.multi_resize(&targets).await.unwrap();

    assert!(output.is_empty());
    assert_eq!(invoker.call_count(), 0);
}

#[tokio::test]
async fn test_detached_failure_is_reported_per_size() {
    let invoker = Arc::new(RecordingInvoker::new().fail_for("-300x225.jpg"));
    let mut editor = load(invoker.clone()).await;

    let output = editor.multi_resize(&targets()).await.unwrap();

    assert!(output.get("thumbnail").unwrap().is_ok());
    assert!(output.get("medium_large").unwrap().is_ok());
    match output.get("medium").unwrap() {
        Err(EditorError::RemoteExecution { message, filename }) => {
            assert_eq!(message, "Unhandled");
            assert_eq!(
                filename.as_deref(),
                Some("s3://media-bucket/2024/05/photo-300x225.jpg")
            );
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(invoker.completed(), 3);
}

#[tokio::test]
async fn test_first_save_failure_aborts() {
    let invoker = Arc::new(RecordingInvoker::new().fail_for("-150x150.jpg"));
    let mut editor = load(invoker.clone()).await;
    editor.rotate(180.0);

    let err = editor.multi_resize(&targets()).await.unwrap_err();

    assert!(matches!(err, EditorError::RemoteExecution { .. }));
    assert_eq!(invoker.call_count(), 1);
    assert_eq!(editor.size(), ImageSize::new(1024, 768));
    assert_eq!(
        editor.operations().to_vec(),
        vec![Operation::Rotate { angle: 180.0 }]
    );
}

#[tokio::test]
async fn test_key_mapping_rejection_skips_remote_call() {
    let invoker = Arc::new(RecordingInvoker::new());
    let mapper = Arc::new(RejectingKeyMapper {
        inner: BucketKeyMapper::new("media-bucket", None),
        marker: "-300x225",
    });
    let mut editor = LambdaImageEditor::load(context_with_mapper(invoker.clone(), mapper), SOURCE)
        .await
        .unwrap();

    let output = editor.multi_resize(&targets()).await.unwrap();

    assert!(matches!(
        output.get("medium"),
        Some(Err(EditorError::KeyMapping(_)))
    ));
    assert_eq!(invoker.call_count(), 2);
    assert!(invoker
        .calls()
        .iter()
        .all(|c| !c.request.new_filename.contains("-300x225")));
}

#[tokio::test]
async fn test_multi_resize_through_trait() {
    let invoker = Arc::new(RecordingInvoker::new());
    let mut editor = load(invoker.clone()).await;

    let output = ImageEditor::multi_resize(&mut editor, &targets())
        .await
        .unwrap();
    assert_eq!(output.len(), 3);
}
