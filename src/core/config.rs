use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub swagger: SwaggerConfig,
    pub admin: AdminConfig,
    pub uploads: UploadConfig,
    pub content: ContentConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Credentials guarding the admin (mutating) routes
#[derive(Debug, Clone, Default)]
pub struct AdminConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Upload pipeline configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory served as the site's public root; files land in `<public_root>/upload`
    pub public_root: PathBuf,
    /// Per-section size overrides in MB, keyed by section name
    pub max_size_overrides_mb: Vec<(String, u64)>,
    /// Image metadata tool (ImageMagick `identify`)
    pub identify_bin: String,
    /// Media probing tool
    pub ffprobe_bin: String,
    /// Used to extract video poster frames
    pub ffmpeg_bin: String,
}

/// Where the local content document lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentBackendKind {
    Memory,
    File,
}

/// Content store configuration
#[derive(Debug, Clone)]
pub struct ContentConfig {
    pub backend: ContentBackendKind,
    pub file_path: PathBuf,
    /// Base URL of a remote site exposing `/api/hero`. When unset the hero
    /// section syncs against the local database instead.
    pub hero_remote_url: Option<String>,
    pub hero_remote_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            admin: AdminConfig::from_env()?,
            uploads: UploadConfig::from_env()?,
            content: ContentConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 2 * 1024 * 1024; // 2MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    // Default values for database connection pool (conservative defaults for small-medium apps)
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Institute Site API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION").unwrap_or_else(|_| {
            "Content, gallery and media upload API for the institute site".to_string()
        });

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        basic_credentials(&self.username, &self.password)
    }
}

impl AdminConfig {
    pub fn from_env() -> Result<Self, String> {
        let username = env::var("ADMIN_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty());

        if username.is_some() != password.is_some() {
            return Err("ADMIN_USERNAME and ADMIN_PASSWORD must be set together".to_string());
        }

        Ok(Self { username, password })
    }

    pub fn credentials(&self) -> Option<String> {
        basic_credentials(&self.username, &self.password)
    }
}

fn basic_credentials(username: &Option<String>, password: &Option<String>) -> Option<String> {
    match (username, password) {
        (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
        _ => None,
    }
}

impl UploadConfig {
    const SECTION_NAMES: [&'static str; 6] = [
        "hero",
        "about",
        "services",
        "certifications",
        "gallery",
        "media",
    ];

    pub fn from_env() -> Result<Self, String> {
        let public_root =
            PathBuf::from(env::var("PUBLIC_ROOT").unwrap_or_else(|_| "public".to_string()));

        let mut max_size_overrides_mb = Vec::new();
        for section in Self::SECTION_NAMES {
            let key = format!("UPLOAD_MAX_MB_{}", section.to_uppercase());
            if let Ok(raw) = env::var(&key) {
                let mb = raw
                    .parse::<u64>()
                    .map_err(|_| format!("{} must be a valid number", key))?;
                max_size_overrides_mb.push((section.to_string(), mb));
            }
        }

        let identify_bin = env::var("IDENTIFY_BIN").unwrap_or_else(|_| "identify".to_string());
        let ffprobe_bin = env::var("FFPROBE_BIN").unwrap_or_else(|_| "ffprobe".to_string());
        let ffmpeg_bin = env::var("FFMPEG_BIN").unwrap_or_else(|_| "ffmpeg".to_string());

        Ok(Self {
            public_root,
            max_size_overrides_mb,
            identify_bin,
            ffprobe_bin,
            ffmpeg_bin,
        })
    }
}

impl ContentConfig {
    const DEFAULT_HERO_REMOTE_TIMEOUT_MS: u64 = 3000;

    pub fn from_env() -> Result<Self, String> {
        let backend = match env::var("CONTENT_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => ContentBackendKind::Memory,
            "file" => ContentBackendKind::File,
            other => {
                return Err(format!(
                    "CONTENT_BACKEND must be 'memory' or 'file', got '{}'",
                    other
                ))
            }
        };

        let file_path = PathBuf::from(
            env::var("CONTENT_FILE").unwrap_or_else(|_| "data/site-content.json".to_string()),
        );

        let hero_remote_url = env::var("HERO_REMOTE_URL")
            .ok()
            .map(|s| s.trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        let timeout_ms = env::var("HERO_REMOTE_TIMEOUT_MS")
            .unwrap_or_else(|_| Self::DEFAULT_HERO_REMOTE_TIMEOUT_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "HERO_REMOTE_TIMEOUT_MS must be a valid number".to_string())?;

        Ok(Self {
            backend,
            file_path,
            hero_remote_url,
            hero_remote_timeout: Duration::from_millis(timeout_ms),
        })
    }
}
