//! `run`: generation turns, interactive and batch prompt loops.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use eyre::Result;
use log::{info, warn};
use ollama::ClientError;
use ollama::api::{ModelService, Options};
use ollama::progress::{BarDisplay, DigestLabel, Spinner, TransferDisplay};
use ollama::session::Session;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use super::transfer::pull_model;
use crate::cli::commands::Credentials;

const PROMPT: &str = ">>> ";

/// Bad Gateway: the registry could not be reached
const REGISTRY_UNREACHABLE: i32 = 502;

/// How prompts are read from stdin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Print a prompt marker before reading each line
    Interactive,
    /// Echo each line read before its response
    Batch,
}

impl InputMode {
    pub fn detect() -> Self {
        if io::stdin().is_terminal() {
            Self::Interactive
        } else {
            Self::Batch
        }
    }
}

/// Entry point for `run MODEL [PROMPT...]`
pub async fn run_model<S>(
    service: &S,
    model: &str,
    prompt: &[String],
    options: Options,
    labels: DigestLabel,
    verbose: bool,
) -> Result<()>
where
    S: ModelService + ?Sized,
{
    ensure_model(service, model, BarDisplay::new("pulling"), labels).await?;

    let mut session = Session::new(model, options);
    let mut stdout = io::stdout();

    if !prompt.is_empty() {
        return generate(service, &mut session, &prompt.join(" "), &mut stdout, true, verbose).await;
    }

    let mode = InputMode::detect();
    info!("Reading prompts from stdin ({:?})", mode);
    let input = BufReader::new(tokio::io::stdin());
    prompt_loop(service, &mut session, input, &mut stdout, mode, true, verbose).await?;

    Ok(())
}

/// Pull `model` unless it names a local path.
///
/// An unreachable registry is not fatal: the server may already have the
/// model.
pub async fn ensure_model<S, D>(service: &S, model: &str, display: D, labels: DigestLabel) -> Result<()>
where
    S: ModelService + ?Sized,
    D: TransferDisplay + Send,
{
    if Path::new(model).exists() {
        info!("Using local model file: {}", model);
        return Ok(());
    }

    match pull_model(service, model, &Credentials::default(), display, labels).await {
        Ok(_) => Ok(()),
        Err(err) => match err.downcast_ref::<ClientError>().and_then(ClientError::status_code) {
            Some(REGISTRY_UNREACHABLE) => {
                warn!("Pull of {} skipped: {}", model, err);
                Ok(())
            }
            _ => Err(err),
        },
    }
}

/// One generation turn written to `out` as chunks arrive.
///
/// Blank prompts are skipped without a request.
pub async fn generate<S, W>(
    service: &S,
    session: &mut Session,
    prompt: &str,
    out: &mut W,
    show_spinner: bool,
    verbose: bool,
) -> Result<()>
where
    S: ModelService + ?Sized,
    W: Write + Send,
{
    if prompt.trim().is_empty() {
        return Ok(());
    }

    let spinner = show_spinner.then(Spinner::start);

    let result = session
        .turn(service, prompt, |resp| {
            if let Some(spinner) = &spinner {
                spinner.stop();
            }
            out.write_all(resp.response.as_bytes())?;
            out.flush()?;
            Ok(())
        })
        .await;

    if let Some(spinner) = spinner {
        spinner.join().await;
    }

    let latest = result?;

    out.write_all(b"\n\n")?;
    out.flush()?;

    if verbose {
        if let Some(latest) = latest {
            for line in latest.summary() {
                eprintln!("{}", line);
            }
        }
    }

    Ok(())
}

/// Read prompts line by line until `input` ends, one turn per line.
///
/// Returns the number of lines read.
pub async fn prompt_loop<S, R, W>(
    service: &S,
    session: &mut Session,
    input: R,
    out: &mut W,
    mode: InputMode,
    show_spinner: bool,
    verbose: bool,
) -> Result<usize>
where
    S: ModelService + ?Sized,
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    let mut lines = input.lines();
    let mut count = 0;

    if mode == InputMode::Interactive {
        write!(out, "{}", PROMPT)?;
        out.flush()?;
    }

    while let Some(line) = lines.next_line().await? {
        count += 1;

        if mode == InputMode::Batch {
            writeln!(out, "{}{}", PROMPT, line)?;
        }

        generate(service, session, &line, out, show_spinner, verbose).await?;

        if mode == InputMode::Interactive {
            write!(out, "{}", PROMPT)?;
            out.flush()?;
        }
    }

    Ok(count)
}
