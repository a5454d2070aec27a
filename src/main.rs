use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use file_body::commands::BodyArgs;
use file_body::commands::copy::copy_body;
use file_body::commands::inspect::inspect_file;
use file_body::commands::push::push_file;

#[derive(Parser)]
#[command(name = "file-body")]
#[command(about = "Inspect, copy and upload files as multipart body parts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show filename, content type, transfer encoding and length
    Inspect {
        #[command(flatten)]
        body: BodyArgs,
    },
    /// Stream the file content to a file or stdout
    Copy {
        #[command(flatten)]
        body: BodyArgs,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upload the file to S3
    Push {
        #[command(flatten)]
        body: BodyArgs,
        /// Remote key prefix
        #[arg(long, default_value = "")]
        prefix: String,
        /// Upload even if the remote ETag matches
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 日志写到stderr，避免与copy命令的标准输出混在一起
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Inspect { body } => inspect_file(body)?,
        Commands::Copy { body, output } => {
            let body = body.build()?;
            copy_body(&body, output.as_deref())?;
        }
        Commands::Push {
            body,
            prefix,
            force,
        } => {
            push_file(body, prefix, *force).await?;
        }
    }

    Ok(())
}
