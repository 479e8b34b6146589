use anyhow::{Context, Result};
use clap::Parser;
use std::{env, path::PathBuf};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub web_root: PathBuf,
    pub database_url: String,
    pub max_upload_bytes: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Product catalog with image uploads")]
pub struct Args {
    /// Host to bind to (overrides PRODUCT_CATALOG_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PRODUCT_CATALOG_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory holding public assets; images are kept under `images/`
    /// (overrides PRODUCT_CATALOG_WEB_ROOT)
    #[arg(long)]
    pub web_root: Option<PathBuf>,

    /// Database URL (overrides PRODUCT_CATALOG_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Largest accepted request body in bytes (overrides PRODUCT_CATALOG_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        Self::from_args(Args::parse())
    }

    /// Merge already-parsed CLI args over the environment.
    pub fn from_args(args: Args) -> Result<(Self, bool)> {
        // --- Environment fallback ---
        let env_host = env::var("PRODUCT_CATALOG_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_env("PRODUCT_CATALOG_PORT", 3000u16)?;
        let env_web_root = env::var("PRODUCT_CATALOG_WEB_ROOT").unwrap_or_else(|_| "./wwwroot".into());
        let env_db = env::var("PRODUCT_CATALOG_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/catalog.db".into());
        let env_max_upload = parse_env("PRODUCT_CATALOG_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            web_root: args.web_root.unwrap_or_else(|| PathBuf::from(env_web_root)),
            database_url: args.database_url.unwrap_or(env_db),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Directory where uploaded product images are written.
    pub fn images_dir(&self) -> PathBuf {
        self.web_root.join("images")
    }
}

fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_arguments_take_precedence() {
        let args = Args::try_parse_from([
            "product-catalog",
            "--host",
            "127.0.0.1",
            "--port",
            "8081",
            "--web-root",
            "/srv/catalog",
            "--database-url",
            "sqlite://catalog-test.db",
            "--max-upload-bytes",
            "1024",
        ])
        .unwrap();

        let (cfg, migrate) = AppConfig::from_args(args).unwrap();
        assert!(!migrate);
        assert_eq!(cfg.addr(), "127.0.0.1:8081");
        assert_eq!(cfg.images_dir(), PathBuf::from("/srv/catalog/images"));
        assert_eq!(cfg.database_url, "sqlite://catalog-test.db");
        assert_eq!(cfg.max_upload_bytes, 1024);
    }

    #[test]
    fn migrate_flag_is_reported() {
        let args = Args::try_parse_from(["product-catalog", "--migrate", "--port", "9000"]).unwrap();
        let (cfg, migrate) = AppConfig::from_args(args).unwrap();
        assert!(migrate);
        assert_eq!(cfg.port, 9000);
    }
}
