//! Core editor trait
//!
//! Callers choosing between editor implementations program against `ImageEditor`;
//! `LambdaImageEditor` is the implementation that dispatches to a remote processor.

use std::sync::Arc;

use async_trait::async_trait;
use imgbatch_core::{EditorError, ImageSize, OutputDescriptor};

use crate::orchestrator::{MultiResizeOutput, SizeTargets};
use crate::session::{EditorContext, LambdaImageEditor, StreamedImage};

#[async_trait]
pub trait ImageEditor: Send {
    /// Shared collaborators needed to open an image
    type Context: Send + Sync;

    async fn load(context: Self::Context, file: &str) -> Result<Self, EditorError>
    where
        Self: Sized;

    /// Whether this editor can write `mime_type`
    fn supports_mime_type(mime_type: &str) -> bool
    where
        Self: Sized;

    fn size(&self) -> ImageSize;

    fn set_quality(&mut self, quality: u32) -> Result<(), EditorError>;

    fn resize(
        &mut self,
        max_w: Option<u32>,
        max_h: Option<u32>,
        crop: bool,
    ) -> Result<(), EditorError>;

    #[allow(clippy::too_many_arguments)]
    fn crop(
        &mut self,
        src_x: u32,
        src_y: u32,
        src_w: u32,
        src_h: u32,
        dst_w: Option<u32>,
        dst_h: Option<u32>,
        src_abs: bool,
    ) -> Result<(), EditorError>;

    fn rotate(&mut self, angle: f64);

    fn flip(&mut self, horizontal: bool, vertical: bool);

    async fn save(
        &mut self,
        filename: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<OutputDescriptor, EditorError>;

    async fn multi_resize(&mut self, targets: &SizeTargets)
        -> Result<MultiResizeOutput, EditorError>;

    async fn stream(&self, mime_type: Option<&str>) -> Result<StreamedImage, EditorError>;
}

#[async_trait]
impl ImageEditor for LambdaImageEditor {
    type Context = Arc<EditorContext>;

    async fn load(context: Arc<EditorContext>, file: &str) -> Result<Self, EditorError> {
        LambdaImageEditor::load(context, file).await
    }

    fn supports_mime_type(mime_type: &str) -> bool {
        LambdaImageEditor::supports_mime_type(mime_type)
    }

    fn size(&self) -> ImageSize {
        LambdaImageEditor::size(self)
    }

    fn set_quality(&mut self, quality: u32) -> Result<(), EditorError> {
        LambdaImageEditor::set_quality(self, quality)
    }

    fn resize(
        &mut self,
        max_w: Option<u32>,
        max_h: Option<u32>,
        crop: bool,
    ) -> Result<(), EditorError> {
        LambdaImageEditor::resize(self, max_w, max_h, crop)
    }

    fn crop(
        &mut self,
        src_x: u32,
        src_y: u32,
        src_w: u32,
        src_h: u32,
        dst_w: Option<u32>,
        dst_h: Option<u32>,
        src_abs: bool,
    ) -> Result<(), EditorError> {
        LambdaImageEditor::crop(self, src_x, src_y, src_w, src_h, dst_w, dst_h, src_abs)
    }

    fn rotate(&mut self, angle: f64) {
        LambdaImageEditor::rotate(self, angle)
    }

    fn flip(&mut self, horizontal: bool, vertical: bool) {
        LambdaImageEditor::flip(self, horizontal, vertical)
    }

    async fn save(
        &mut self,
        filename: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<OutputDescriptor, EditorError> {
        LambdaImageEditor::save(self, filename, mime_type).await
    }

    async fn multi_resize(
        &mut self,
        targets: &SizeTargets,
    ) -> Result<MultiResizeOutput, EditorError> {
        LambdaImageEditor::multi_resize(self, targets).await
    }

    async fn stream(&self, mime_type: Option<&str>) -> Result<StreamedImage, EditorError> {
        LambdaImageEditor::stream(self, mime_type).await
    }
}
