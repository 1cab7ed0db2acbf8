//! Command-line and environment configuration for the `wordflow` binary.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

/// wordflow - PRD flowchart projects and their upload service
#[derive(Debug, Parser)]
#[command(name = "wordflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding uploaded images and files
    #[arg(long, global = true, env = "WORDFLOW_DATA_DIR", default_value = "public")]
    pub data_dir: PathBuf,

    /// Project store file
    #[arg(long, global = true, env = "WORDFLOW_STORE", default_value = wf_core::store::DEFAULT_FILE_NAME)]
    pub store: PathBuf,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the upload server
    Serve {
        #[arg(long, env = "WORDFLOW_HOST", default_value = "127.0.0.1")]
        host: IpAddr,

        #[arg(long, env = "WORDFLOW_PORT", default_value_t = 3001)]
        port: u16,

        /// Largest accepted upload body, in megabytes
        #[arg(long, env = "WORDFLOW_MAX_UPLOAD_MB", default_value_t = 50)]
        max_upload_mb: usize,
    },

    /// List stored projects
    List,

    /// Create an empty project
    New {
        name: String,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Delete a project
    Delete { id: String },

    /// Write a project to a `.wordflow.json` file
    Export {
        id: String,

        /// Output path; defaults to the sanitized project name
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Import a project file under a fresh id
    Import { path: PathBuf },

    /// Check a project for dangling edges, unknown tags and isolated nodes
    Lint { id: String },

    /// Print a project as a markdown PRD outline
    Outline { id: String },
}

impl Cli {
    /// `log` filter for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// Filesystem layout of the upload service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub images_dir: PathBuf,
    pub files_dir: PathBuf,
    pub hash_map_path: PathBuf,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

    /// Derive every path from the data directory: `images/`, `files/` and
    /// `image-hash-map.json` beneath it.
    pub fn from_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            images_dir: data_dir.join("images"),
            files_dir: data_dir.join("files"),
            hash_map_path: data_dir.join("image-hash-map.json"),
            max_upload_bytes: Self::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_mb(mut self, mb: usize) -> Self {
        self.max_upload_bytes = mb.saturating_mul(1024 * 1024);
        self
    }
}
