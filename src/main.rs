//! stow CLI - command line interface for stowage
//!
//! Drives a local upload store from the command line. Output is JSON by
//! default so other tooling can wrap it.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use stowage::{InputFile, LocalAdapter, Uploader};

#[derive(Parser)]
#[command(name = "stow")]
#[command(about = "A sharded upload store over the local filesystem")]
#[command(version)]
struct Cli {
    /// Upload root directory (created if missing)
    #[arg(short, long, default_value = "uploads")]
    root: PathBuf,

    /// Public serving prefix for stored files
    #[arg(short, long, default_value = "/uploads")]
    public_root: String,

    /// Directory where exported copies are placed
    #[arg(long, default_value_os_t = std::env::temp_dir())]
    tmp_dir: PathBuf,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file and print its key (the source file is moved in)
    Upload {
        /// Path of the file to upload
        path: PathBuf,
        /// Display name to store it under (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show a stored file's paths and metadata
    Stat {
        /// Key returned by upload
        key: String,
    },

    /// Write a stored file's content to stdout
    Cat {
        /// Key returned by upload
        key: String,
    },

    /// Copy a stored file out into the temp directory
    Export {
        /// Key returned by upload
        key: String,
    },

    /// Check whether a key exists
    Has {
        /// Key returned by upload
        key: String,
    },

    /// Delete a stored file
    Delete {
        /// Key returned by upload
        key: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    std::fs::create_dir_all(&cli.root)?;
    let adapter = LocalAdapter::new(&cli.root, &cli.public_root)?;
    let uploader = Uploader::new(adapter, &cli.tmp_dir);

    match cli.command {
        Commands::Upload { path, name } => {
            let name = match name {
                Some(name) => name,
                None => path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
                    .ok_or_else(|| {
                        anyhow::anyhow!("cannot derive a name from {}", path.display())
                    })?,
            };
            let key = uploader.upload(InputFile::new(name, path))?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "key": key
                }),
            );
        }

        Commands::Stat { key } => {
            let object = uploader.get(&key)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "key": key,
                    "public_path": object.public_path(),
                    "local_path": object.local_path(),
                    "basename": object.basename(),
                    "extension": object.extension(),
                    "content_length": object.content_length()?,
                    "content_type": object.content_type()?,
                    "last_modified": object.last_modified()?.to_rfc3339()
                }),
            );
        }

        Commands::Cat { key } => {
            let object = uploader.get(&key)?;
            std::io::stdout().write_all(&object.content()?)?;
        }

        Commands::Export { key } => {
            let file = uploader.export(&key)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "basename": file.base_name(),
                    "path": file.path()
                }),
            );
        }

        Commands::Has { key } => {
            output(
                &cli.format,
                &serde_json::json!({
                    "key": key,
                    "exists": uploader.has(&key)
                }),
            );
        }

        Commands::Delete { key } => {
            uploader.delete(&key)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "key": key
                }),
            );
        }
    }

    Ok(())
}

fn output(format: &OutputFormat, value: &serde_json::Value) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(value).unwrap());
        }
        OutputFormat::Text => {
            println!("{}", serde_json::to_string_pretty(value).unwrap());
        }
    }
}
