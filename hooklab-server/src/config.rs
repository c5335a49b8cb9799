use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub path: String,
    /// Insert the demo admin, voter and sample content on start
    pub seed_demo_data: bool,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    /// Let admin accounts log in with just an email. Development only.
    pub allow_passwordless_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub auth: Auth,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.path", "hooklab.db")?
            .set_default("database.seed_demo_data", false)?
            .set_default("auth.allow_passwordless_admin", false)?;

        let config_file_name = "settings.toml";

        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        // Running from the workspace root during development
        let dev_path = PathBuf::from("hooklab-server").join(config_file_name);
        if dev_path.exists() {
            builder = builder.add_source(File::from(dev_path).required(false));
        }

        // Environment variables win over everything else
        if let Ok(db_path) = std::env::var("DATABASE_PATH") {
            builder = builder.set_override("database.path", db_path)?;
        }
        if let Ok(seed) = std::env::var("SEED_DEMO_DATA") {
            builder = builder.set_override("database.seed_demo_data", seed)?;
        }
        if let Ok(allow) = std::env::var("ALLOW_PASSWORDLESS_ADMIN") {
            builder = builder.set_override("auth.allow_passwordless_admin", allow)?;
        }
        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }
        if let Ok(host) = std::env::var("HOST") {
            builder = builder.set_override("server.host", host)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
