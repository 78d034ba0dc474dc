use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080 }
    }
}

/// Which table store implementation backs the service.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Hosted PostgREST endpoint (Supabase).
    #[default]
    Postgrest,
    /// In-process tables, lost on exit.
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgrest" | "supabase" => Ok(StoreBackend::Postgrest),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!("unknown store backend {other:?}")),
        }
    }
}

/// Connection settings for the hosted table store (PostgREST / Supabase).
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub key: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_logs_table")]
    pub logs_table: String,
    #[serde(default = "default_tickets_table")]
    pub tickets_table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: String::new(),
            key: String::new(),
            connect_timeout_secs: default_connect_timeout(),
            logs_table: default_logs_table(),
            tickets_table: default_tickets_table(),
        }
    }
}

fn default_connect_timeout() -> u64 { 30 }
fn default_logs_table() -> String { "company_logs".into() }
fn default_tickets_table() -> String { "company_tickets".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` if present (defaults otherwise), then apply the
    /// environment and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.normalize_from(|name| std::env::var(name).ok())?;
        self.store.validate()?;
        Ok(())
    }

    /// Fill unset values from a variable lookup (the process environment in production).
    pub fn normalize_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.server.normalize_from(&lookup)?;
        self.store.normalize_from(&lookup)?;
        Ok(())
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize_from<F>(&mut self, lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.port = port
                .parse::<u16>()
                .map_err(|_| anyhow!("SERVER_PORT must be a port number, got {port:?}"))?;
        }
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StoreConfig {
    fn normalize_from<F>(&mut self, lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("STORE_BACKEND") {
            self.backend = backend.parse()?;
        }
        if self.url.trim().is_empty() {
            if let Some(url) = lookup("SUPABASE_URL") {
                self.url = url;
            }
        }
        if self.key.trim().is_empty() {
            if let Some(key) = lookup("SUPABASE_KEY") {
                self.key = key;
            }
        }
        self.url = self.url.trim().trim_end_matches('/').to_string();
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.logs_table.trim().is_empty() || self.tickets_table.trim().is_empty() {
            return Err(anyhow!("store table names must not be empty"));
        }
        if self.backend == StoreBackend::Memory {
            return Ok(());
        }
        if self.url.is_empty() {
            return Err(anyhow!("store.url is empty; set it in config.toml or SUPABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("store.url must start with http:// or https://"));
        }
        if self.key.trim().is_empty() {
            return Err(anyhow!("store.key is empty; set it in config.toml or SUPABASE_KEY"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(anyhow!("store.connect_timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}
