use serde::{Deserialize, Serialize};

/// Configuration for external service connectors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectorConfig {
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
    #[serde(default)]
    pub outscraper: OutscraperConfig,
    #[serde(default)]
    pub axesso: AxessoConfig,
    #[serde(default)]
    pub shopify: ShopifyConfig,
    #[serde(default)]
    pub outlook: OutlookConfig,
}

/// Hosted chat-completion API used for classification and replies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterConfig {
    pub base_url: String,
    pub model: String,
    /// Sent as `HTTP-Referer`, OpenRouter uses it for app attribution
    pub referer: String,
    /// Sent as `X-Title`
    pub title: String,
    pub timeout_secs: u64,
    /// from env: OPENROUTER_API_KEY
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "x-ai/grok-4.1-fast".to_string(),
            referer: "https://driftsignal.replit.app".to_string(),
            title: "DriftSignal Review Manager".to_string(),
            timeout_secs: 60,
            api_key: None,
        }
    }
}

/// Outscraper Amazon reviews scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutscraperConfig {
    pub base_url: String,
    pub reviews_limit: u32,
    /// most_recent | top_reviews
    pub sort: String,
    pub timeout_secs: u64,
    /// from env: OUTSCRAPER_API_KEY
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for OutscraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.app.outscraper.com".to_string(),
            reviews_limit: 100,
            sort: "most_recent".to_string(),
            timeout_secs: 180,
            api_key: None,
        }
    }
}

/// Axesso Walmart data service (RapidAPI)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AxessoConfig {
    pub base_url: String,
    /// Value of the `x-rapidapi-host` header
    pub host: String,
    pub timeout_secs: u64,
    /// from env: AXESSO_API_KEY
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AxessoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://axesso-axesso-walmart-data-service.p.rapidapi.com".to_string(),
            host: "axesso-axesso-walmart-data-service.p.rapidapi.com".to_string(),
            timeout_secs: 60,
            api_key: None,
        }
    }
}

/// Shopify Admin GraphQL API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopifyConfig {
    /// e.g. your-store.myshopify.com (env: SHOPIFY_SHOP)
    pub shop: Option<String>,
    pub api_version: String,
    /// Overrides `https://{shop}` when set
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    /// from env: SHOPIFY_ACCESS_TOKEN
    #[serde(skip)]
    pub access_token: Option<String>,
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            shop: None,
            api_version: "2025-10".to_string(),
            base_url: None,
            timeout_secs: 30,
            access_token: None,
        }
    }
}

/// Outlook mail through Microsoft Graph. The OAuth token is obtained from a
/// connector service that stores the mailbox connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlookConfig {
    pub graph_base_url: String,
    /// Full URL returning the connection settings (env: OUTLOOK_CONNECTION_URL)
    pub connection_url: Option<String>,
    /// Header carrying `identity_token` on the connection lookup
    pub identity_header: String,
    pub timeout_secs: u64,
    /// from env: OUTLOOK_IDENTITY_TOKEN
    #[serde(skip)]
    pub identity_token: Option<String>,
}

impl Default for OutlookConfig {
    fn default() -> Self {
        Self {
            graph_base_url: "https://graph.microsoft.com/v1.0".to_string(),
            connection_url: None,
            identity_header: "X_REPLIT_TOKEN".to_string(),
            timeout_secs: 30,
            identity_token: None,
        }
    }
}
