/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory holding the Tera templates.
    pub templates_dir: String,
    /// Basic-auth user allowed to drive pad boards.
    pub admin_username: String,
    pub admin_password: String,
    /// How long to collect board output after sending a command (default: `1000`).
    pub board_timeout_ms: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                        |
    /// |------------------------|--------------------------------|
    /// | `HOST`                 | `0.0.0.0`                      |
    /// | `PORT`                 | `3000`                         |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`        |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                           |
    /// | `TEMPLATES_DIR`        | `<crate>/templates`            |
    /// | `ADMIN_USERNAME`       | `admin`                        |
    /// | `ADMIN_PASSWORD`       | `admin`                        |
    /// | `BOARD_TIMEOUT_MS`     | `1000`                         |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let templates_dir = std::env::var("TEMPLATES_DIR")
            .unwrap_or_else(|_| concat!(env!("CARGO_MANIFEST_DIR"), "/templates").into());

        let admin_username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into());
        let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".into());

        let board_timeout_ms: u64 = std::env::var("BOARD_TIMEOUT_MS")
            .unwrap_or_else(|_| "1000".into())
            .parse()
            .expect("BOARD_TIMEOUT_MS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            templates_dir,
            admin_username,
            admin_password,
            board_timeout_ms,
        }
    }
}
