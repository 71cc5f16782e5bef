use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mp3-grabber",
    about = "MP3 Grabber - Fetch the audio of a video URL as MP3 and serve it in the browser",
    version,
    long_about = "A small web front-end around yt-dlp and ffmpeg. Paste a video URL, get an MP3 (and its thumbnail) back. The same pipeline is available from the terminal with the fetch command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(short, long, value_name = "ADDR", env = "GRABBER_LISTEN")]
        listen: Option<String>,

        /// Directory where MP3 files and thumbnails are stored
        #[arg(short, long, value_name = "DIR", env = "GRABBER_MEDIA_DIR")]
        media_dir: Option<PathBuf>,
    },

    /// Fetch a single URL into the media directory and exit
    Fetch {
        /// Video URL to fetch (anything yt-dlp understands)
        #[arg(value_name = "URL")]
        url: String,

        /// Directory where MP3 files and thumbnails are stored
        #[arg(short, long, value_name = "DIR", env = "GRABBER_MEDIA_DIR")]
        media_dir: Option<PathBuf>,
    },

    /// Show or initialize the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long, conflicts_with = "init")]
        show: bool,

        /// Write a default configuration file
        #[arg(long)]
        init: bool,
    },
}
