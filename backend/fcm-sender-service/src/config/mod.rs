use anyhow::{anyhow, Result};
use fcm_core::FirebaseOptions;
use serde::{Deserialize, Serialize};

/// Flat variables kept for compatibility with existing `.env` files
const ENV_PROJECT_ID: &str = "FIREBASE_PROJECTID";
const ENV_DEFAULT_DEVICE_TOKEN: &str = "FIREBASE_DEFAULTDEVICETOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    #[serde(default)]
    pub firebase: FirebaseOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load `.env`, the optional `appsettings` file, then `SECTION__KEY` environment variables.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let config = config::Config::builder()
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 8080)?
            .add_source(config::File::with_name("appsettings").required(false))
            .add_source(config::Environment::default().separator("__"))
            .set_override_option("firebase.project_id", flat_env(ENV_PROJECT_ID))?
            .set_override_option(
                "firebase.default_device_token",
                flat_env(ENV_DEFAULT_DEVICE_TOKEN),
            )?
            .build()?;

        config.try_deserialize()
    }

    pub fn validate(&self) -> Result<()> {
        if self.app.port == 0 {
            return Err(anyhow!("HTTP port must be greater than 0"));
        }

        if self.firebase.project_id.trim().is_empty() {
            return Err(anyhow!(
                "firebase.project_id is required (set FIREBASE_PROJECTID or FIREBASE__PROJECT_ID)"
            ));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

fn flat_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
