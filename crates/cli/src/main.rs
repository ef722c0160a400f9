use anyhow::{Context, Result};
use artifacts::{Materializer, OutputFormat, RESULTS_ROOT};
use clap::{Args, Parser, Subcommand};
use generation::{GenerationService, PollOptions, SavePolicy};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use uploader::SecureUploader;
use wavespeed_api::{
    Config, GenerationRequest, ImageEditRequest, ImageToVideoRequest, RequestId, SeedDanceRequest,
    SeedEditRequest, UpscaleRequest, WaveSpeedClient,
};

#[derive(Parser)]
#[command(name = "wavespeed-cli")]
#[command(about = "WaveSpeed AI generation from the terminal - submit, poll, save")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit an image with a text prompt (Flux Kontext)
    Edit {
        /// Source image: local file, URL, or data URL
        image: String,

        /// Edit instruction
        #[arg(short, long)]
        prompt: String,

        /// Output format (png, jpg, webp)
        #[arg(long, default_value = "png")]
        format: String,

        /// Guidance scale
        #[arg(long)]
        guidance_scale: Option<f32>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Precise single-step image edit (SeedEdit)
    Seededit {
        image: String,

        #[arg(short, long)]
        prompt: String,

        #[arg(long)]
        guidance_scale: Option<f32>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Upscale an image
    Upscale {
        image: String,

        /// Target resolution tier (2k, 4k, 8k)
        #[arg(long, default_value = "4k")]
        target_resolution: String,

        /// Output format (png, jpg, webp)
        #[arg(long, default_value = "png")]
        format: String,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Animate an image into a short video (WAN)
    Video {
        image: String,

        #[arg(short, long)]
        prompt: String,

        /// Clip length in seconds
        #[arg(long, default_value_t = 5)]
        duration: u32,

        #[arg(long)]
        seed: Option<i64>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Animate an image into a short video (SeedDance)
    Seeddance {
        image: String,

        #[arg(short, long)]
        prompt: String,

        /// Clip length in seconds
        #[arg(long, default_value_t = 5)]
        duration: u32,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Query the status of a submitted request once
    Status {
        /// Request id returned on submission
        request_id: String,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Seconds between status checks (default: per capability)
    #[arg(long)]
    interval: Option<f64>,

    /// Overall poll timeout in seconds
    #[arg(long, default_value_t = 300)]
    timeout: u64,

    /// Directory for saved results
    #[arg(long, default_value = RESULTS_ROOT)]
    output_dir: PathBuf,

    /// Print the result URL without downloading it
    #[arg(long)]
    no_save: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Edit {
            image,
            prompt,
            format,
            guidance_scale,
            run,
        } => {
            let image = resolve_image(&image).await?;
            let format: OutputFormat = parse_format(&format)?;
            let mut payload = ImageEditRequest::new(prompt, image);
            payload.output_format = format.extension().to_string();
            payload.guidance_scale = guidance_scale;
            run_generation(GenerationRequest::ImageEdit(payload), run, Some(format), String::new())
                .await
        }
        Commands::Seededit {
            image,
            prompt,
            guidance_scale,
            run,
        } => {
            let image = resolve_image(&image).await?;
            let mut payload = SeedEditRequest::new(prompt, image);
            payload.guidance_scale = guidance_scale;
            run_generation(GenerationRequest::SeedEdit(payload), run, None, String::new()).await
        }
        Commands::Upscale {
            image,
            target_resolution,
            format,
            run,
        } => {
            let image = resolve_image(&image).await?;
            let format: OutputFormat = parse_format(&format)?;
            let mut payload = UpscaleRequest::new(image);
            payload.target_resolution = target_resolution.clone();
            payload.output_format = format.extension().to_string();
            run_generation(
                GenerationRequest::Upscale(payload),
                run,
                Some(format),
                target_resolution,
            )
            .await
        }
        Commands::Video {
            image,
            prompt,
            duration,
            seed,
            run,
        } => {
            let image = resolve_image(&image).await?;
            let mut payload = ImageToVideoRequest::new(prompt, image);
            payload.duration = duration;
            payload.seed = seed;
            run_generation(
                GenerationRequest::ImageToVideo(payload),
                run,
                None,
                format!("{duration}s"),
            )
            .await
        }
        Commands::Seeddance {
            image,
            prompt,
            duration,
            run,
        } => {
            let image = resolve_image(&image).await?;
            let mut payload = SeedDanceRequest::new(prompt, image);
            payload.duration = duration;
            run_generation(
                GenerationRequest::SeedDance(payload),
                run,
                None,
                format!("{duration}s"),
            )
            .await
        }
        Commands::Status { request_id } => status_command(request_id).await,
    }
}

fn parse_format(raw: &str) -> Result<OutputFormat> {
    raw.parse::<OutputFormat>().map_err(anyhow::Error::msg)
}

/// Turn a local path into a URL the API can fetch; URLs pass through.
async fn resolve_image(source: &str) -> Result<String> {
    let uploader = SecureUploader::from_env();
    uploader
        .ensure_public_url(source)
        .await
        .with_context(|| format!("failed to prepare image '{source}'"))
}

async fn run_generation(
    request: GenerationRequest,
    run: RunArgs,
    format: Option<OutputFormat>,
    extra_info: String,
) -> Result<()> {
    let config = Config::from_env().context("WaveSpeed API configuration")?;
    let client = WaveSpeedClient::new(config)?;
    let materializer = Materializer::new(&run.output_dir)?;
    let service = GenerationService::new(client, materializer);

    let capability = request.capability();
    let mut opts =
        PollOptions::for_capability(capability).with_timeout(Duration::from_secs(run.timeout));
    if let Some(secs) = run.interval {
        opts = opts.with_interval(Duration::from_secs_f64(secs));
    }

    let policy = if run.no_save {
        SavePolicy::Skip
    } else {
        SavePolicy::Save { format, extra_info }
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!("{capability}: submitting"));

    let outcome = {
        let spinner = spinner.clone();
        service
            .run(&request, opts, policy, move |status| {
                spinner.set_message(format!("{capability}: {status}"));
            })
            .await
    };
    spinner.finish_and_clear();

    let outcome = outcome?;
    info!(
        request_id = %outcome.request_id,
        secs = outcome.elapsed.as_secs_f64(),
        "generation finished"
    );

    println!("Request:  {}", outcome.request_id);
    println!("Output:   {}", outcome.output_url);
    match outcome.artifact {
        Some(artifact) => {
            println!("Saved:    {}", artifact.file_path.display());
            println!("Metadata: {}", artifact.sidecar_path.display());
        }
        None => println!("Saved:    (skipped)"),
    }
    Ok(())
}

async fn status_command(request_id: String) -> Result<()> {
    let client = WaveSpeedClient::from_env().context("WaveSpeed API configuration")?;
    let snapshot = client.fetch_status(&RequestId::new(request_id)).await?;

    println!("Status:   {}", snapshot.status);
    for output in &snapshot.outputs {
        println!("Output:   {output}");
    }
    if let Some(error) = &snapshot.error {
        println!("Error:    {error}");
    }
    Ok(())
}
