use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "slotline-server", about = "HTTP service for slotline spins")]
pub struct ServerConfig {
    /// Database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://slotline.db?mode=rwc")]
    pub database_url: String,
    /// Bearer key required by the /api/admin routes
    #[arg(long, env = "API_KEY", default_value = "dev-key")]
    pub api_key: String,
    /// Address to listen on
    #[arg(long, env = "BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,
    /// Directory served for every path outside /api
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,
}

impl ServerConfig {
    pub fn uses_default_key(&self) -> bool {
        self.api_key == "dev-key"
    }
}
