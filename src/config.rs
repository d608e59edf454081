use serde::Deserialize;
use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use crate::errors::BoardError;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP front end listens on.
    pub http_addr: SocketAddr,

    /// Loopback endpoint of the datagram channel.
    ///
    /// The receiver binds to it and the HTTP side sends to it.
    pub datagram_addr: SocketAddr,

    /// Receive buffer size. Longer datagrams are truncated by the transport.
    pub max_datagram_size: usize,

    /// Path to the JSON store.
    pub storage_path: PathBuf,

    /// Directory holding index.html, message.html, error.html and assets.
    pub document_root: PathBuf,

    /// Log level for tracing (e.g. "info", "debug").
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            datagram_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            max_datagram_size: 1024,
            storage_path: PathBuf::from("storage/data.json"),
            document_root: PathBuf::from("front"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, BoardError> {
        let file = fs::read_to_string(path)?;

        serde_json::from_str::<AppConfig>(&file).map_err(|e| BoardError::InvalidConfig {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Find config.json (EXE folder, its parent, then the working directory).
    ///
    /// Returns `None` when no candidate exists.
    pub fn locate() -> Option<PathBuf> {
        let mut candidates = Vec::new();

        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                candidates.push(exe_dir.join(CONFIG_FILE));
                candidates.push(exe_dir.join("..").join(CONFIG_FILE));
            }
        }
        candidates.push(PathBuf::from(CONFIG_FILE));

        candidates.into_iter().find(|p| p.exists())
    }

    pub fn index_document(&self) -> PathBuf {
        self.document_root.join("index.html")
    }

    pub fn message_document(&self) -> PathBuf {
        self.document_root.join("message.html")
    }

    pub fn error_document(&self) -> PathBuf {
        self.document_root.join("error.html")
    }
}
