use anyhow::{Context, Result};
use clap::Parser;
use std::{env, time::Duration};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    pub bucket: String,
    pub root_prefix: String,
    pub admin_token: Option<String>,
    pub store_timeout: Duration,
    pub list_page_size: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Configuration asset store with a virtual folder admin API")]
pub struct Args {
    /// Host to bind to (overrides CONFIG_STORE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides CONFIG_STORE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where object payloads are stored (overrides CONFIG_STORE_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL (overrides CONFIG_STORE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Bucket holding the configuration assets (overrides CONFIG_STORE_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Key prefix every asset lives under (overrides CONFIG_STORE_ROOT_PREFIX)
    #[arg(long)]
    pub root_prefix: Option<String>,

    /// Bearer token accepted for admin calls (overrides CONFIG_STORE_ADMIN_TOKEN)
    #[arg(long)]
    pub admin_token: Option<String>,

    /// Per-call object store timeout in milliseconds (overrides CONFIG_STORE_TIMEOUT_MS)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Keys requested per listing page (overrides CONFIG_STORE_LIST_PAGE_SIZE)
    #[arg(long)]
    pub list_page_size: Option<usize>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        let cfg = Self::resolve(args, |name| env::var(name))?;
        Ok((cfg, migrate))
    }

    /// Merge parsed arguments over values read through `lookup`.
    pub fn resolve<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let var_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|_| default.into());

        // --- Environment fallback ---
        let env_host = var_or("CONFIG_STORE_HOST", "0.0.0.0");
        let env_port = parse_var(&lookup, "CONFIG_STORE_PORT", 3000u16)?;
        let env_storage = var_or("CONFIG_STORE_STORAGE_DIR", "./data/objects");
        let env_db = var_or(
            "CONFIG_STORE_DATABASE_URL",
            "sqlite://./data/meta/config_store.db",
        );
        let env_bucket = var_or("CONFIG_STORE_BUCKET", "site-assets");
        let env_root = var_or("CONFIG_STORE_ROOT_PREFIX", "configs");
        let env_token = lookup("CONFIG_STORE_ADMIN_TOKEN").ok();
        let env_timeout = parse_var(&lookup, "CONFIG_STORE_TIMEOUT_MS", 5000u64)?;
        let env_page = parse_var(&lookup, "CONFIG_STORE_LIST_PAGE_SIZE", 1000usize)?;

        // --- Merge ---
        let root_prefix = args
            .root_prefix
            .unwrap_or(env_root)
            .trim_matches('/')
            .to_string();
        if root_prefix.is_empty() {
            anyhow::bail!("root prefix must name at least one path segment");
        }

        let admin_token = args
            .admin_token
            .or(env_token)
            .filter(|token| !token.trim().is_empty());

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            database_url: args.database_url.unwrap_or(env_db),
            bucket: args.bucket.unwrap_or(env_bucket),
            root_prefix,
            admin_token,
            store_timeout: Duration::from_millis(args.timeout_ms.unwrap_or(env_timeout)),
            list_page_size: args.list_page_size.unwrap_or(env_page),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Result<String, env::VarError>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}
