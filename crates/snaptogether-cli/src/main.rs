//! SnapTogether CLI: merge two photos into one pose through the generation service.
//!
//! Set SNAPTOGETHER_API_URL (default http://localhost:3000).

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use snaptogether_api_client::{ApiClient, ClientConfig, GenerateOutcome, Session};
use snaptogether_cli::{init_tracing, pose_catalog, print_json, truncate_string};
use snaptogether_core::{failure_notice, GenerationResult, PhotoSlot, Pose};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "snaptogether", about = "SnapTogether CLI")]
struct Cli {
    /// Service base URL (overrides SNAPTOGETHER_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload two photos, pick a pose and generate the merged photo
    Merge {
        /// First photo (JPG, PNG or WebP, up to 10MB)
        #[arg(long)]
        photo1: PathBuf,
        /// Second photo
        #[arg(long)]
        photo2: PathBuf,
        /// Pose tag, see `snaptogether poses`
        #[arg(long)]
        pose: Pose,
        /// Directory the result image is saved in
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Print the result without saving the image
        #[arg(long)]
        no_save: bool,
    },
    /// List the available poses
    Poses,
    /// Check that the generation service is up
    Health,
}

#[derive(Serialize)]
struct MergeOutput {
    success: bool,
    pose: &'static str,
    image_url: String,
    analysis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<String>,
}

async fn open_photo(session: &Session, slot: PhotoSlot, path: &Path) -> anyhow::Result<()> {
    session.open_photo(slot, path).await.map_err(|e| {
        tracing::debug!(error = %e, path = %path.display(), "Photo rejected");
        anyhow::anyhow!("{} ({}): {}", slot, path.display(), e.user_message())
    })?;
    Ok(())
}

async fn run_merge(
    client: ApiClient,
    photo1: PathBuf,
    photo2: PathBuf,
    pose: Pose,
    out: PathBuf,
    no_save: bool,
) -> anyhow::Result<()> {
    let session = Session::with_service(Arc::new(client.clone()));

    open_photo(&session, PhotoSlot::First, &photo1).await?;
    open_photo(&session, PhotoSlot::Second, &photo2).await?;
    session.select_pose(pose.tag()).await?;

    tracing::info!(pose = %pose, "Creating your merged photo...");

    let result = match session.generate().await? {
        GenerateOutcome::Completed(result) => result,
        GenerateOutcome::Discarded => {
            anyhow::bail!("The request was superseded before it finished")
        }
    };

    if !result.success {
        let error = result
            .error_message
            .as_deref()
            .unwrap_or(GenerationResult::DEFAULT_FAILURE);
        anyhow::bail!(failure_notice(error));
    }

    let saved_to = if no_save {
        None
    } else {
        let path = client
            .download_result(&result, &out)
            .await
            .map_err(|e| anyhow::anyhow!("{} ({})", e.user_message(), e))?;
        Some(path.display().to_string())
    };

    print_json(&MergeOutput {
        success: true,
        pose: pose.tag(),
        image_url: truncate_string(&result.image_url, 64),
        analysis: result.analysis_text,
        saved_to,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("Invalid client configuration")?;
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url).context("Invalid --api-url")?;
    }

    let client = ApiClient::from_config(&config)
        .context("Failed to create API client. Check SNAPTOGETHER_API_URL")?;

    match cli.command {
        Commands::Merge {
            photo1,
            photo2,
            pose,
            out,
            no_save,
        } => run_merge(client, photo1, photo2, pose, out, no_save).await?,
        Commands::Poses => print_json(&pose_catalog())?,
        Commands::Health => {
            let health = client.health().await?;
            print_json(&health)?;
        }
    }

    Ok(())
}
