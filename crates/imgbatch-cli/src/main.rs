//! imgbatch CLI: drive the remote image editor from the shell.
//!
//! Reads the AWS_LAMBDA_IMAGE_* variables (or a .env file) for configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use imgbatch_cli::{init_tracing, parse_size_target};
use imgbatch_core::{EditorConfig, ErrorMetadata};
use imgbatch_editor::{
    handle_upload, EditorContext, LambdaImageEditor, SizeTarget, SizeTargets, UploadedFile,
};
use serde::Serialize;
use serde_json::json;

#[derive(Parser)]
#[command(name = "imgbatch", about = "Batch image transforms on a remote processor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct EditArgs {
    /// Source image: local path, URL or bucket-qualified name
    file: String,
    /// Rotate counter-clockwise by this many degrees before resizing
    #[arg(long)]
    rotate: Option<f64>,
    /// Flip along the horizontal axis
    #[arg(long)]
    flip_horizontal: bool,
    /// Flip along the vertical axis
    #[arg(long)]
    flip_vertical: bool,
    /// Compression quality (0-100)
    #[arg(long)]
    quality: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resize (or crop) an image and save it
    Resize {
        #[command(flatten)]
        edit: EditArgs,
        /// Maximum width in pixels
        #[arg(long)]
        width: Option<u32>,
        /// Maximum height in pixels
        #[arg(long)]
        height: Option<u32>,
        /// Crop to exactly width x height
        #[arg(long)]
        crop: bool,
        /// Destination file (defaults to <name>-<W>x<H>.<ext> next to the source)
        #[arg(long)]
        output: Option<String>,
        /// Output mime type
        #[arg(long)]
        mime_type: Option<String>,
    },
    /// Derive several named sizes from one image
    MultiResize {
        #[command(flatten)]
        edit: EditArgs,
        /// Sizes as label=WxH, label=Wx or label=xH, optionally with :crop
        #[arg(required = true, value_parser = parse_size_target)]
        sizes: Vec<(String, SizeTarget)>,
    },
    /// Run the transforms and write the resulting bytes to a local file
    Stream {
        #[command(flatten)]
        edit: EditArgs,
        /// Maximum width in pixels
        #[arg(long)]
        width: Option<u32>,
        /// Maximum height in pixels
        #[arg(long)]
        height: Option<u32>,
        /// Output mime type
        #[arg(long)]
        mime_type: Option<String>,
        /// Where to write the image
        #[arg(long)]
        out: PathBuf,
    },
    /// Apply the upload hook to a freshly uploaded file
    Upload {
        /// Path to the uploaded file
        file: String,
        /// Mime type reported for the upload
        #[arg(long, default_value = "image/jpeg")]
        mime_type: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn open(context: Arc<EditorContext>, edit: &EditArgs) -> anyhow::Result<LambdaImageEditor> {
    let mut editor = LambdaImageEditor::load(context, edit.file.as_str())
        .await
        .with_context(|| format!("Failed to load {}", edit.file))?;

    if let Some(quality) = edit.quality {
        editor.set_quality(quality)?;
    }
    if let Some(angle) = edit.rotate {
        editor.rotate(angle);
    }
    if edit.flip_horizontal || edit.flip_vertical {
        editor.flip(edit.flip_horizontal, edit.flip_vertical);
    }

    Ok(editor)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let config = EditorConfig::from_env().context(
        "Failed to load configuration. Set AWS_LAMBDA_IMAGE_BUCKET, AWS_LAMBDA_IMAGE_REGION and credentials",
    )?;
    if !config.is_available() {
        tracing::warn!("Remote editor credentials incomplete, relying on the default AWS chain");
    }

    let context = Arc::new(
        EditorContext::from_config(&config)
            .await
            .context("Failed to initialize editor")?,
    );

    match cli.command {
        Commands::Resize {
            edit,
            width,
            height,
            crop,
            output,
            mime_type,
        } => {
            let mut editor = open(context, &edit).await?;
            if width.is_some() || height.is_some() {
                editor.resize(width, height, crop)?;
            }
            let saved = editor
                .save(output.as_deref(), mime_type.as_deref())
                .await
                .context("Save failed")?;
            print_json(&saved)?;
        }
        Commands::MultiResize { edit, sizes } => {
            let mut editor = open(context, &edit).await?;
            let targets: SizeTargets = sizes.into_iter().collect();
            let output = editor.multi_resize(&targets).await?;

            let report: serde_json::Map<String, serde_json::Value> = output
                .iter()
                .map(|(label, result)| {
                    let value = match result {
                        Ok(descriptor) => json!(descriptor),
                        Err(e) => json!({ "error": e.to_string(), "code": e.error_code() }),
                    };
                    (label.to_string(), value)
                })
                .collect();
            print_json(&report)?;
        }
        Commands::Stream {
            edit,
            width,
            height,
            mime_type,
            out,
        } => {
            let mut editor = open(context, &edit).await?;
            if width.is_some() || height.is_some() {
                editor.resize(width, height, false)?;
            }
            let streamed = editor.stream(mime_type.as_deref()).await?;
            tokio::fs::write(&out, &streamed.data)
                .await
                .with_context(|| format!("Failed to write {}", out.display()))?;
            print_json(&json!({
                "out": out.display().to_string(),
                "mime-type": streamed.mime_type,
                "bytes": streamed.data.len(),
            }))?;
        }
        Commands::Upload { file, mime_type } => {
            let upload = handle_upload(context, UploadedFile { file, mime_type }).await;
            print_json(&upload)?;
        }
    }

    Ok(())
}
