//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! server and upload sub-configs. Every section defaults sensibly so a
//! completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

/// Default maximum size of a single uploaded file (5 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// Default maximum number of files accepted per upload request.
pub const DEFAULT_MAX_FILES_PER_UPLOAD: usize = 5;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub uploads: UploadsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            uploads: UploadsConfig::default(),
        }
    }
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    ///
    /// This is intentionally string-based so the caller can read the file
    /// however it sees fit (async, embedded, etc.).
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if let Some(ref base) = self.uploads.public_base_url {
            if base.is_empty() {
                warnings.push(
                    "uploads.public_base_url is empty; URLs will be derived from the Host header"
                        .into(),
                );
            } else if !base.starts_with("http://") && !base.starts_with("https://") {
                warnings.push(format!(
                    "uploads.public_base_url '{base}' does not look like an http(s) URL"
                ));
            }
        }

        if self.uploads.max_files_per_upload == 0 {
            warnings.push("uploads.max_files_per_upload is 0; all uploads will be rejected".into());
        }

        if self.uploads.max_file_bytes == 0 {
            warnings.push("uploads.max_file_bytes is 0; all uploads will be rejected".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            db_path: PathBuf::from("./data/kerbside.db"),
        }
    }
}

/// Deployment mode selecting the default upload directory root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployMode {
    /// Local development: uploads live next to the working directory.
    Local,
    /// Production: uploads live on the mounted persistent volume.
    Production,
}

/// Banner upload storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    pub deploy_mode: DeployMode,
    /// Explicit upload directory; overrides the `deploy_mode` default.
    pub dir: Option<PathBuf>,
    /// Externally visible base address used to build image URLs. When unset,
    /// the request's `Host` header is used instead.
    pub public_base_url: Option<String>,
    pub max_file_bytes: u64,
    pub max_files_per_upload: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            deploy_mode: DeployMode::Local,
            dir: None,
            public_base_url: None,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_files_per_upload: DEFAULT_MAX_FILES_PER_UPLOAD,
        }
    }
}

impl UploadsConfig {
    /// Resolve the upload directory: the explicit `dir` if set, otherwise
    /// the `deploy_mode` default.
    pub fn resolved_dir(&self) -> PathBuf {
        match self.dir {
            Some(ref dir) => dir.clone(),
            None => match self.deploy_mode {
                DeployMode::Local => PathBuf::from("./uploads"),
                DeployMode::Production => PathBuf::from("/data/uploads"),
            },
        }
    }
}
