use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use log::error;

use kb2md::config::config::load_app_config;
use kb2md::converter::pipeline::{convert_archive, convert_url};

#[derive(Parser)]
#[command(
    name = "kb2md",
    about = "Convert an exported knowledge-base archive into a tree of Markdown files"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert an exported .tar.gz knowledge-base container
    Archive {
        /// Path of the exported container
        input: PathBuf,
        /// Path of the resulting ZIP archive
        #[arg(short, long, default_value = "kb-export.zip")]
        output: PathBuf,
        /// Fetch embedded images and rehome them next to each document
        #[arg(long)]
        images: bool,
    },
    /// Fetch a publicly reachable page and convert it to a single document
    Url {
        /// Page URL to fetch
        url: String,
        /// Path of the resulting ZIP archive
        #[arg(short, long, default_value = "kb-page.zip")]
        output: PathBuf,
        /// Fetch embedded images and rehome them next to the document
        #[arg(long)]
        images: bool,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_app_config();

    let result = match cli.command {
        Command::Archive {
            input,
            output,
            images,
        } => {
            let fetch_images = images || config.fetch_images.unwrap_or(false);
            convert_archive(&input, &output, fetch_images, &config).await
        }
        Command::Url {
            url,
            output,
            images,
        } => {
            let fetch_images = images || config.fetch_images.unwrap_or(false);
            convert_url(&url, &output, fetch_images, &config).await
        }
    };

    match result {
        Ok(stats) => {
            println!(
                "Done: {} document(s), {} attachment(s)",
                stats.documents_converted, stats.attachments_saved
            );
        }
        Err(e) => {
            error!("Conversion failed: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
