use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_RESUME_MAX_BYTES: u64 = 2 * 1024 * 1024;
const DEFAULT_PAGE_SIZE: usize = 10;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub backend: BackendConfig,
    pub intake: IntakeConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            backend: BackendConfig::from_env(),
            intake: IntakeConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Identifiers and credentials for the managed backend collaborators.
///
/// Missing values surface when the corresponding call is made, not at load
/// time, matching how the original deployment behaved.
#[derive(Debug, Clone, Default)]
pub struct BackendConfig {
    pub endpoint: Option<String>,
    pub project_id: Option<String>,
    pub database_id: Option<String>,
    pub applications_collection: Option<String>,
    pub interest_fields_collection: Option<String>,
    pub resumes_bucket: Option<String>,
    pub email_api_key: Option<String>,
    pub email_from: String,
}

impl BackendConfig {
    fn from_env() -> Self {
        Self {
            endpoint: env::var("BACKEND_ENDPOINT").ok(),
            project_id: env::var("BACKEND_PROJECT_ID").ok(),
            database_id: env::var("BACKEND_DATABASE_ID").ok(),
            applications_collection: env::var("BACKEND_COLLECTION_APPLICATIONS").ok(),
            interest_fields_collection: env::var("BACKEND_COLLECTION_INTEREST_FIELDS").ok(),
            resumes_bucket: env::var("BACKEND_BUCKET_RESUMES").ok(),
            email_api_key: env::var("EMAIL_API_KEY").ok(),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "careers@horizontalents.example".to_string()),
        }
    }
}

/// Behavior when the duplicate-application probe itself fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateCheckPolicy {
    /// Proceed with the submission even though the probe failed.
    FailOpen,
    /// Reject the submission until the probe can answer.
    FailClosed,
}

/// Dials for the public intake workflow.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub resume_max_bytes: u64,
    pub duplicate_check: DuplicateCheckPolicy,
    pub page_size: usize,
}

impl IntakeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let resume_max_bytes = match env::var("INTAKE_RESUME_MAX_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|bytes| *bytes > 0)
                .ok_or(ConfigError::InvalidResumeLimit)?,
            Err(_) => DEFAULT_RESUME_MAX_BYTES,
        };

        let duplicate_check = match env::var("INTAKE_DUPLICATE_CHECK") {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "fail_open" | "open" => DuplicateCheckPolicy::FailOpen,
                "fail_closed" | "closed" => DuplicateCheckPolicy::FailClosed,
                other => {
                    return Err(ConfigError::InvalidDuplicatePolicy {
                        value: other.to_string(),
                    })
                }
            },
            Err(_) => DuplicateCheckPolicy::FailClosed,
        };

        let page_size = match env::var("INTAKE_PAGE_SIZE") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::InvalidPageSize)?,
            Err(_) => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            resume_max_bytes,
            duplicate_check,
            page_size,
        })
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            resume_max_bytes: DEFAULT_RESUME_MAX_BYTES,
            duplicate_check: DuplicateCheckPolicy::FailClosed,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidResumeLimit,
    InvalidPageSize,
    InvalidDuplicatePolicy { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidResumeLimit => {
                write!(f, "INTAKE_RESUME_MAX_BYTES must be a positive byte count")
            }
            ConfigError::InvalidPageSize => {
                write!(f, "INTAKE_PAGE_SIZE must be a positive integer")
            }
            ConfigError::InvalidDuplicatePolicy { value } => {
                write!(
                    f,
                    "INTAKE_DUPLICATE_CHECK must be 'fail_open' or 'fail_closed', got '{value}'"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
