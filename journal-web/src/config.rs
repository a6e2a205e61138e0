/// Configuration management for the web server
///
/// This module loads configuration from environment variables (and a `.env`
/// file when present) into a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `HOST` / `PORT`: Bind address (default: 0.0.0.0:8080)
/// - `APP_ENV`: `production` enables Secure cookies and HSTS
/// - `APP_BASE_URL`: Base URL used in password reset links
/// - `DATABASE_URL`: PostgreSQL connection string (selects relational storage)
/// - `STORAGE_MODE`: `files` or `postgres` to force a backend
/// - `DATA_DIR`: Directory for flat-file storage (default: ./data)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `SESSION_SECRET`: Secret key for session tokens (required, 32+ chars)
/// - `SESSION_TTL_HOURS`: Session lifetime (default: 24)
/// - `LLM_ENDPOINT` / `AZURE_OPENAI_ENDPOINT`: Summarization endpoint
/// - `LLM_API_KEY` / `AZURE_OPENAI_KEY`: Summarization API key
/// - `LLM_MODEL` / `AZURE_OPENAI_MODEL_NAME`: Model or deployment name
/// - `LLM_API_VERSION`: Azure API version; setting it selects Azure routing
/// - `LLM_TIMEOUT_SECS`: Summarization request timeout (default: 30)
///
/// # Example
///
/// ```no_run
/// use journal_web::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use journal_shared::{
    store::StorageBackend,
    summarize::{
        client::{DEFAULT_AZURE_API_VERSION, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS},
        LlmConfig, LlmProvider,
    },
};
use std::{env, path::PathBuf, time::Duration};

/// Minimum accepted length of `SESSION_SECRET`
pub const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Where users and entries are kept
    pub storage: StorageBackend,

    /// Session cookie configuration
    pub session: SessionConfig,

    /// Summarization endpoint; `None` disables summaries
    pub llm: Option<LlmConfig>,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Production mode (Secure cookies, HSTS)
    pub production: bool,

    /// Public base URL, no trailing slash
    pub base_url: String,
}

/// Session configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// HS256 signing key for session tokens
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Session lifetime in hours
    pub ttl_hours: i64,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `SESSION_SECRET` is missing or shorter than 32 characters
    /// - Numeric variables have invalid values
    /// - `STORAGE_MODE` is unknown, or `postgres` without `DATABASE_URL`
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = var("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("PORT must be a port number: {}", e))?;

        let production = var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let base_url = var("APP_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let storage = storage_from_vars(&var)?;

        let secret = var("SESSION_SECRET")
            .ok_or_else(|| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;

        if secret.chars().count() < MIN_SESSION_SECRET_LENGTH {
            anyhow::bail!(
                "SESSION_SECRET must be at least {} characters long",
                MIN_SESSION_SECRET_LENGTH
            );
        }

        let ttl_hours = var("SESSION_TTL_HOURS")
            .unwrap_or_else(|| "24".to_string())
            .parse::<i64>()?;

        if ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive");
        }

        let llm = llm_from_vars(&var)?;

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                production,
                base_url,
            },
            storage,
            session: SessionConfig { secret, ttl_hours },
            llm,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Absolute link to the password reset form for `token`
    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset?token={}", self.server.base_url, token)
    }
}

fn storage_from_vars<F>(var: &F) -> anyhow::Result<StorageBackend>
where
    F: Fn(&str) -> Option<String>,
{
    let files = || StorageBackend::Files {
        dir: PathBuf::from(var("DATA_DIR").unwrap_or_else(|| "./data".to_string())),
    };

    let max_connections = var("DATABASE_MAX_CONNECTIONS")
        .unwrap_or_else(|| "10".to_string())
        .parse::<u32>()?;

    let mode = var("STORAGE_MODE").map(|m| m.to_ascii_lowercase());

    match (mode.as_deref(), var("DATABASE_URL")) {
        (Some("files"), _) => Ok(files()),
        (Some("postgres"), None) => {
            anyhow::bail!("STORAGE_MODE=postgres requires DATABASE_URL")
        }
        (Some("postgres") | None, Some(url)) => Ok(StorageBackend::Postgres {
            url,
            max_connections,
        }),
        (None, None) => Ok(files()),
        (Some(other), _) => anyhow::bail!("Unknown STORAGE_MODE: {}", other),
    }
}

fn llm_from_vars<F>(var: &F) -> anyhow::Result<Option<LlmConfig>>
where
    F: Fn(&str) -> Option<String>,
{
    let generic_endpoint = var("LLM_ENDPOINT");
    let azure_endpoint = var("AZURE_OPENAI_ENDPOINT");
    let uses_azure_vars = generic_endpoint.is_none() && azure_endpoint.is_some();

    let Some(endpoint) = generic_endpoint.or(azure_endpoint) else {
        return Ok(None);
    };
    let Some(api_key) = var("LLM_API_KEY").or_else(|| var("AZURE_OPENAI_KEY")) else {
        return Ok(None);
    };

    let model = var("LLM_MODEL")
        .or_else(|| var("AZURE_OPENAI_MODEL_NAME"))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let provider = match var("LLM_API_VERSION") {
        Some(api_version) => LlmProvider::Azure { api_version },
        None if uses_azure_vars => LlmProvider::Azure {
            api_version: DEFAULT_AZURE_API_VERSION.to_string(),
        },
        None => LlmProvider::OpenAi,
    };

    let timeout_secs = var("LLM_TIMEOUT_SECS")
        .map(|v| v.parse::<u64>())
        .transpose()?
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(Some(LlmConfig {
        endpoint,
        api_key,
        model,
        provider,
        timeout: Duration::from_secs(timeout_secs),
    }))
}
