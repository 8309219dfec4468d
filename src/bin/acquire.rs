//! acquire - fetch and unpack buildpack artifacts
//!
//! Usage:
//!   acquire download <url> <dest>          Download a file
//!   acquire extract <url> <dir> [options]  Download an archive and extract it
//!
//! Caching is enabled by `--cache-dir` or `BUILDPACK_CACHE_DIR`.

use anyhow::Result;
use buildpack_acquire::{
    AcquireConfig, AcquireError, Acquirer, DxOption, core::config, keep_directory_symlink,
    output, strip_components, wildcards,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "acquire")]
#[command(about = "Download, cache and extract buildpack artifacts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Cache root; caching is disabled when unset or empty
    #[arg(long, global = true, env = config::CACHE_DIR_ENV)]
    cache_dir: Option<PathBuf>,

    /// Owner directory inside the cache
    #[arg(long, global = true, env = config::OWNER_ENV, default_value = config::DEFAULT_OWNER)]
    owner: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a URL to a file
    Download {
        url: String,

        /// Destination file (must not be a directory)
        dest: PathBuf,

        /// Human-readable name used in messages
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Download an archive and extract it into a directory
    Extract {
        url: String,

        /// Existing destination directory
        dir: PathBuf,

        /// Leading path components to drop from every member
        #[arg(long, default_value_t = 0)]
        strip_components: usize,

        /// Keep existing directory symlinks (tar only)
        #[arg(long)]
        keep_directory_symlink: bool,

        /// Only extract members matching this pattern
        #[arg(long)]
        wildcards: Option<String>,

        /// Human-readable name used in messages
        #[arg(short, long)]
        description: Option<String>,
    },
}

fn main() {
    if let Err(err) = run() {
        output::error(&format!("{:#}", err));
        let code = err
            .downcast_ref::<AcquireError>()
            .map_or(1, AcquireError::exit_code);
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = AcquireConfig::new(cli.owner).with_cache_root(cli.cache_dir);
    let mut acquirer = Acquirer::new(&config);

    match cli.command {
        Commands::Download {
            url,
            dest,
            description,
        } => {
            let description = description.unwrap_or_else(|| url.clone());
            acquirer.download(&description, &url, &dest, &[])?;
            output::info(&format!("Downloaded {} to {}", description, dest.display()));
        }

        Commands::Extract {
            url,
            dir,
            strip_components: strip,
            keep_directory_symlink: keep_symlinks,
            wildcards: pattern,
            description,
        } => {
            let description = description.unwrap_or_else(|| url.clone());

            let mut options: Vec<DxOption> = Vec::new();
            if strip > 0 {
                options.push(strip_components(strip));
            }
            if keep_symlinks {
                options.push(keep_directory_symlink());
            }
            if let Some(pattern) = pattern {
                options.push(wildcards(pattern));
            }

            acquirer.download_and_extract(&description, &url, &dir, &options)?;
            output::info(&format!("Extracted {} into {}", description, dir.display()));
        }
    }

    Ok(())
}
