use anyhow::Context;
use imagegen_core::constants::DEFAULT_PROMPT;
use imagegen_core::{
    BatchSummary, GenerationRequest, ImageQuality, ImageSize, ImageStyle, PersistOutcome,
};
use std::io::{self, BufRead, Write};

/// Image options forwarded as the deployment's `configuration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageOptions {
    pub size: ImageSize,
    pub quality: ImageQuality,
    pub style: ImageStyle,
}

/// Blank input falls back to [`DEFAULT_PROMPT`].
pub fn normalize_prompt(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        DEFAULT_PROMPT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Ask for a prompt on `output` and read one line from `input`.
pub fn read_prompt<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<String> {
    write!(output, "Describe the image [{}]: ", DEFAULT_PROMPT)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(normalize_prompt(&line))
}

/// [`read_prompt`] on a blocking thread, for use inside the runtime.
pub async fn read_prompt_blocking<R, W>(input: R, output: W) -> anyhow::Result<String>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    tokio::task::spawn_blocking(move || read_prompt(input, output))
        .await
        .context("Prompt reader task failed")?
        .context("Failed to read prompt")
}

pub fn build_request(
    prompt: &str,
    deployment: &str,
    options: Option<ImageOptions>,
) -> GenerationRequest {
    let request = GenerationRequest::new(prompt, deployment);
    match options {
        Some(opts) => request
            .with_size(opts.size)
            .with_quality(opts.quality)
            .with_style(opts.style),
        None => request,
    }
}

/// One-line human summary of a persisted batch.
pub fn format_summary(summary: &BatchSummary) -> String {
    format!(
        "{} of {} attachment(s) saved ({} bytes), {} skipped, {} failed",
        summary.saved,
        summary.total(),
        summary.bytes_written,
        summary.skipped,
        summary.failed
    )
}

/// Non-zero when any attachment failed.
pub fn exit_code(outcomes: &[PersistOutcome]) -> i32 {
    if outcomes.iter().any(PersistOutcome::is_failed) {
        1
    } else {
        0
    }
}


/// Initialize tracing for the CLI binary. Events go to stderr so stdout
/// stays clean for `--json`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
