//! Server configuration
//!
//! Every option can come from the command line, the environment, or a
//! `.env` file (loaded by the binary before parsing).

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::storage::{FileSystemStorage, KeyStorage, MemoryStorage, StorageError};

/// Which storage backend holds the keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    /// Directory of `*.jwk` files
    Fs,
    /// Process memory; keys are lost on restart
    Memory,
}

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "tang-server", version, about = "Tang key exchange server")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "TANG_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// Storage backend
    #[arg(long, env = "TANG_STORAGE", value_enum, default_value_t = StorageKind::Fs)]
    pub storage: StorageKind,

    /// Key database directory for the `fs` backend
    #[arg(long, env = "TANG_DB", default_value = "/var/db/tang")]
    pub db: PathBuf,

    /// Bearer token for POST /rotate; rotation over HTTP is disabled without it
    #[arg(long, env = "ROTATE_TOKEN", hide_env_values = true)]
    pub rotate_token: Option<String>,

    /// Rotate all keys every N seconds
    #[arg(long, env = "TANG_ROTATE_INTERVAL_SECS")]
    pub rotate_interval_secs: Option<u64>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "TANG_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Runtime configuration built from [`Args`]
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub storage: Arc<dyn KeyStorage>,
    pub rotate_token: Option<String>,
    pub rotate_interval: Option<Duration>,
}

impl ServerConfig {
    /// Open the selected backend and normalise optional settings.
    ///
    /// An empty token and a zero interval both mean "disabled".
    pub async fn from_args(args: &Args) -> Result<Self, StorageError> {
        let storage: Arc<dyn KeyStorage> = match args.storage {
            StorageKind::Fs => Arc::new(FileSystemStorage::open(&args.db).await?),
            StorageKind::Memory => {
                info!("Using in-memory key storage; keys will not survive a restart");
                Arc::new(MemoryStorage::new())
            }
        };

        let rotate_token = args.rotate_token.clone().filter(|t| !t.is_empty());
        let rotate_interval = args
            .rotate_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            storage,
            rotate_token,
            rotate_interval,
        })
    }
}
