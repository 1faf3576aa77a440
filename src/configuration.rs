use crate::connectors::ConnectorConfig;
use serde;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub app_port: u16,
    pub app_host: String,
    #[serde(default)]
    pub connectors: ConnectorConfig,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseSettings::default(),
            app_port: 8000,
            app_host: "127.0.0.1".to_string(),
            connectors: ConnectorConfig::default(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            username: "postgres".to_string(),
            password: "postgres".to_string(),
            host: "127.0.0.1".to_string(),
            port: 5432,
            database_name: "driftsignal".to_string(),
        }
    }
}

impl DatabaseSettings {
    // Connection string: postgresql://<username>:<password>@<host>:<port>/<database_name>
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name,
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port,
        )
    }
}

fn env_secret(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl ConnectorConfig {
    /// Secrets never live in configuration.yaml, they are taken from the environment.
    pub fn load_secrets_from_env(&mut self) {
        self.openrouter.api_key = env_secret("OPENROUTER_API_KEY")
            .or_else(|| env_secret("AI_INTEGRATIONS_OPENROUTER_API_KEY"));
        if let Some(base_url) = env_secret("AI_INTEGRATIONS_OPENROUTER_BASE_URL") {
            self.openrouter.base_url = base_url;
        }
        self.outscraper.api_key = env_secret("OUTSCRAPER_API_KEY");
        self.axesso.api_key = env_secret("AXESSO_API_KEY");
        self.shopify.shop = env_secret("SHOPIFY_SHOP").or(self.shopify.shop.take());
        self.shopify.access_token = env_secret("SHOPIFY_ACCESS_TOKEN");
        self.outlook.connection_url =
            env_secret("OUTLOOK_CONNECTION_URL").or(self.outlook.connection_url.take());
        self.outlook.identity_token = env_secret("OUTLOOK_IDENTITY_TOKEN");
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration"))
        .build()?;

    let mut config: Settings = settings.try_deserialize()?;
    config.connectors.load_secrets_from_env();

    Ok(config)
}
