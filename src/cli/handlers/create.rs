//! `create`: build a model from a model file, printing each status line.

use std::io::Write;
use std::path::Path;

use eyre::{Context, Result};
use log::info;
use ollama::api::{CreateProgress, CreateRequest, ModelService};
use ollama::error::SinkError;

pub async fn create_model<S, W>(service: &S, model: &str, file: &Path, out: &mut W) -> Result<()>
where
    S: ModelService + ?Sized,
    W: Write + Send,
{
    // The server resolves the path itself, possibly from another directory
    let path = std::path::absolute(file).with_context(|| format!("Invalid model file path: {}", file.display()))?;
    info!("Creating model {} from {}", model, path.display());

    let request = CreateRequest {
        name: model.to_string(),
        path: path.to_string_lossy().into_owned(),
    };

    service
        .create(&request, &mut |event: CreateProgress| -> std::result::Result<(), SinkError> {
            writeln!(out, "{}", event.status)?;
            Ok(())
        })
        .await?;

    Ok(())
}
