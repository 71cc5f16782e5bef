use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mp3_grabber::cli::{Cli, Commands};
use mp3_grabber::config::Config;
use mp3_grabber::pipeline::AudioPipeline;
use mp3_grabber::utils;
use mp3_grabber::web::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "mp3_grabber=debug,tower_http=debug"
    } else {
        "mp3_grabber=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::load().await?;

    match cli.command {
        Commands::Serve { listen, media_dir } => {
            if let Some(listen) = listen {
                config.server.listen_addr = listen;
            }
            if let Some(dir) = media_dir {
                config.media.dir = dir;
            }
            config.validate()?;
            warn_missing_dependencies(&config).await;

            let addr = config.listen_addr()?;
            let state = AppState::new(AudioPipeline::from_config(&config));
            web::serve(state, addr).await?;
        }
        Commands::Fetch { url, media_dir } => {
            if let Some(dir) = media_dir {
                config.media.dir = dir;
            }
            warn_missing_dependencies(&config).await;

            let pipeline = AudioPipeline::from_config(&config);

            let progress = ProgressBar::new_spinner();
            progress.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
            );
            progress.set_message(format!("Fetching {}...", url));
            progress.enable_steady_tick(Duration::from_millis(120));

            let outcome = match pipeline.fetch(&url).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    progress.abandon_with_message("Fetch failed");
                    return Err(err);
                }
            };

            if outcome.cached {
                progress.finish_with_message("Already downloaded");
            } else {
                progress.finish_with_message("Download complete");
            }

            let size = tokio::fs::metadata(&outcome.path).await.map(|m| m.len()).unwrap_or(0);
            println!("Saved to: {} ({})", outcome.path.display(), utils::format_file_size(size));
            if let Some(duration) = outcome.info.duration {
                println!("Duration: {}", utils::format_duration(duration));
            }
            if let Some(thumbnail) = outcome.thumbnail {
                println!("Thumbnail: {}", config.media.dir.join(thumbnail).display());
            }
        }
        Commands::Config { show, init } => {
            if init {
                let path = config.save().await?;
                println!("Configuration written to: {}", path.display());
            } else if show {
                config.display();
            } else {
                config.display();
                println!();
                println!("Edit the config file to change settings:");
                println!("  {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}

/// Report missing external tools without aborting
async fn warn_missing_dependencies(config: &Config) {
    let missing = utils::check_dependencies(&config.tools.yt_dlp_path, &config.tools.ffmpeg_path).await;
    if !missing.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }
}
