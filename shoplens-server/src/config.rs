//! Server configuration module
//!
//! Handles loading configuration from environment variables with sensible defaults.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use shoplens_core::{ProcessEngineConfig, StylePolicy};
use url::Url;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3000)
    pub port: u16,
    /// Server host (default: 127.0.0.1)
    pub host: IpAddr,
    /// Allowed CORS origins, comma-separated (default: allow all in dev)
    pub allowed_origins: Option<Vec<String>>,
    /// Request body limit in MB (default: 50)
    pub body_limit_mb: usize,
    /// Maximum file size per upload in MB (default: 25)
    pub max_file_size_mb: usize,
    /// Whole-request timeout in seconds (default: 120)
    pub timeout_secs: u64,
    /// Enable rate limiting (default: false for tests, true when loaded from env)
    pub rate_limit_enabled: bool,
    /// Rate limit: requests per second (default: 2)
    pub rate_limit_per_sec: u64,
    /// Rate limit: burst size (default: 5)
    pub rate_limit_burst: u32,
    /// Base URL clients use to reach this server
    pub public_base_url: String,
    /// Directory holding uploaded query images, served at `/uploads`
    pub upload_dir: PathBuf,
    /// Directory holding catalog images, served at `/products`
    pub product_image_dir: PathBuf,
    /// Similarity engine executable
    pub engine_program: PathBuf,
    /// Arguments passed to the engine before the image path
    pub engine_args: Vec<String>,
    /// Engine timeout in seconds (default: 60)
    pub engine_timeout_secs: u64,
    /// Largest engine stdout accepted, in bytes (default: 1 MiB)
    pub engine_max_output_bytes: usize,
    /// Let unstyled catalog entries match each other (default: false)
    pub match_unstyled: bool,
    /// PostgreSQL URL; `None` selects the in-memory catalog
    pub database_url: Option<String>,
    /// Database connection pool maximum connections (default: 20)
    pub database_max_connections: u32,
    /// Database connection pool minimum connections (default: 2)
    pub database_min_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        let engine = ProcessEngineConfig::default();
        Self {
            port: 3000,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            allowed_origins: None, // None = allow all (dev mode)
            body_limit_mb: 50,
            max_file_size_mb: 25,
            timeout_secs: 120,
            rate_limit_enabled: false, // Disabled by default (for tests)
            rate_limit_per_sec: 2,
            rate_limit_burst: 5,
            public_base_url: "http://localhost:3000/".to_string(),
            upload_dir: PathBuf::from("uploads"),
            product_image_dir: PathBuf::from("public/products"),
            engine_program: engine.program,
            engine_args: engine.args,
            engine_timeout_secs: engine.timeout.as_secs(),
            engine_max_output_bytes: engine.max_output_bytes,
            match_unstyled: false,
            database_url: None,
            database_max_connections: 20,
            database_min_connections: 2,
        }
    }
}

/// Read and parse an environment variable, ignoring unset or unparsable values.
fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let allowed_origins = std::env::var("ALLOWED_ORIGINS").ok().map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Rate limiting enabled by default in production, can be disabled with RATE_LIMIT_ENABLED=false
        let rate_limit_enabled = std::env::var("RATE_LIMIT_ENABLED")
            .map(|v| !v.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.public_base_url);

        let engine_args = std::env::var("ENGINE_ARGS")
            .ok()
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or(defaults.engine_args);

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Self {
            port: env_parse("PORT").unwrap_or(defaults.port),
            host: env_parse("HOST").unwrap_or(defaults.host),
            allowed_origins,
            body_limit_mb: env_parse("BODY_LIMIT_MB").unwrap_or(defaults.body_limit_mb),
            max_file_size_mb: env_parse("MAX_FILE_SIZE_MB").unwrap_or(defaults.max_file_size_mb),
            timeout_secs: env_parse("REQUEST_TIMEOUT_SECS").unwrap_or(defaults.timeout_secs),
            rate_limit_enabled,
            rate_limit_per_sec: env_parse("RATE_LIMIT_PER_SEC")
                .unwrap_or(defaults.rate_limit_per_sec),
            rate_limit_burst: env_parse("RATE_LIMIT_BURST").unwrap_or(defaults.rate_limit_burst),
            public_base_url,
            upload_dir: env_parse("UPLOAD_DIR").unwrap_or(defaults.upload_dir),
            product_image_dir: env_parse("PRODUCT_IMAGE_DIR")
                .unwrap_or(defaults.product_image_dir),
            engine_program: env_parse("ENGINE_PROGRAM").unwrap_or(defaults.engine_program),
            engine_args,
            engine_timeout_secs: env_parse("ENGINE_TIMEOUT_SECS")
                .unwrap_or(defaults.engine_timeout_secs),
            engine_max_output_bytes: env_parse("ENGINE_MAX_OUTPUT_BYTES")
                .unwrap_or(defaults.engine_max_output_bytes),
            match_unstyled: env_flag("MATCH_UNSTYLED").unwrap_or(defaults.match_unstyled),
            database_url,
            database_max_connections: env_parse("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(defaults.database_max_connections),
            database_min_connections: env_parse("DATABASE_MIN_CONNECTIONS")
                .unwrap_or(defaults.database_min_connections),
        }
    }

    /// Get socket address from config
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Maximum upload size in bytes
    pub fn max_file_size(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }

    /// Base URL under which stored uploads are reachable
    pub fn uploads_base_url(&self) -> Result<Url, url::ParseError> {
        let mut base = Url::parse(&self.public_base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join("uploads/")
    }

    /// Engine gateway settings
    pub fn engine_config(&self) -> ProcessEngineConfig {
        ProcessEngineConfig {
            program: self.engine_program.clone(),
            args: self.engine_args.clone(),
            timeout: Duration::from_secs(self.engine_timeout_secs),
            max_output_bytes: self.engine_max_output_bytes,
        }
    }

    /// Style consensus policy
    pub fn style_policy(&self) -> StylePolicy {
        if self.match_unstyled {
            StylePolicy::MatchUnstyled
        } else {
            StylePolicy::Strict
        }
    }
}
