//! imagegen: ask a DIAL image deployment for a picture and save the result.
//!
//! Set DIAL_API_KEY (or API_KEY) and optionally DIAL_URL. Files land in
//! IMAGEGEN_OUTPUT_DIR (default: current directory) as `<stamp>_<name>`.

use anyhow::Context;
use clap::Parser;
use imagegen_api_client::{ApiClient, DialBucketClient};
use imagegen_cli::{
    build_request, exit_code, format_summary, init_tracing, normalize_prompt,
    read_prompt_blocking, ImageOptions,
};
use imagegen_core::{BatchSummary, DialConfig, ImageQuality, ImageSize, ImageStyle, OutcomeRecord};
use imagegen_storage::{Console, OutputWriter, Persister};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "imagegen", about = "Generate images with a DIAL deployment")]
struct Cli {
    /// Prompt text; asked for interactively when omitted
    #[arg(long, short)]
    prompt: Option<String>,
    /// Deployment name (overrides DIAL_DEPLOYMENT)
    #[arg(long)]
    deployment: Option<String>,
    /// square, portrait, landscape, or 1024x1024 / 1024x1792 / 1792x1024
    #[arg(long, default_value = "square")]
    size: ImageSize,
    /// standard or hd
    #[arg(long, default_value = "standard")]
    quality: ImageQuality,
    /// natural or vivid
    #[arg(long, default_value = "vivid")]
    style: ImageStyle,
    /// Send no size/quality/style configuration
    #[arg(long)]
    no_options: bool,
    /// Output directory (overrides IMAGEGEN_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Maximum parallel downloads (overrides IMAGEGEN_MAX_CONCURRENT_DOWNLOADS)
    #[arg(long)]
    concurrency: Option<usize>,
    /// Print the batch result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct BatchReport<'a> {
    content: Option<&'a str>,
    summary: BatchSummary,
    outcomes: Vec<OutcomeRecord>,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize report")?;
    println!("{}", out);
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<DialConfig> {
    let mut config = DialConfig::from_env()
        .context("Failed to load configuration. Set DIAL_API_KEY and DIAL_URL")?;

    if let Some(deployment) = &cli.deployment {
        config.deployment = deployment.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(n) = cli.concurrency {
        config.max_concurrent_downloads = n;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    tracing::debug!(?config, "Configuration loaded");

    let prompt = match &cli.prompt {
        Some(p) => normalize_prompt(p),
        None => {
            read_prompt_blocking(std::io::BufReader::new(std::io::stdin()), std::io::stdout())
                .await?
        }
    };

    let options = (!cli.no_options).then_some(ImageOptions {
        size: cli.size,
        quality: cli.quality,
        style: cli.style,
    });
    let request = build_request(&prompt, &config.deployment, options);

    let api = ApiClient::from_config(&config)?;
    let completion = api
        .get_completion(&request)
        .await
        .context("Image generation failed")?;

    let attachments = completion.attachments();
    if !cli.json {
        if let Some(content) = completion.content() {
            println!("{}", content);
        }
        if attachments.is_empty() {
            println!("No attachments in the response");
        }
    }

    let persister = Persister::new(
        Arc::new(DialBucketClient::new(config.clone())),
        OutputWriter::new(&config.output_dir),
    )
    .with_max_concurrent(config.max_concurrent_downloads)
    .with_console((!cli.json).then(Console::stdio));

    let outcomes = persister.persist_all(attachments).await;
    let summary = BatchSummary::from_outcomes(&outcomes);

    if cli.json {
        print_json(&BatchReport {
            content: completion.content(),
            summary,
            outcomes: outcomes
                .iter()
                .enumerate()
                .map(|(i, o)| o.record(i))
                .collect(),
        })?;
    } else if summary.total() > 0 {
        println!("{}", format_summary(&summary));
    }

    let code = exit_code(&outcomes);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
