//! External Service Connectors
//!
//! Adapters for the services DriftSignal talks to: marketplace review sources,
//! the OpenRouter completion API and Outlook mail through Microsoft Graph.
//!
//! ## Architecture Pattern
//!
//! 1. Define a trait next to the client → allows mocking in tests
//! 2. Implement the HTTP client in the same file
//! 3. Configuration in `config.rs`, secrets from the environment
//! 4. Inject trait objects into routes → routes never depend on HTTP details
//!
//! ## Usage in Routes
//!
//! ```ignore
//! pub async fn import(
//!     importer: web::Data<ReviewImporter>,
//! ) -> Result<impl Responder> {
//!     // the importer holds Arc<dyn MarketplaceConnector> values
//!     importer.import(Platform::Amazon, &form.product_url, user.id()).await?;
//! }
//! ```

pub mod config;
pub mod errors;
pub(crate) mod http;
pub mod marketplace;
pub mod openrouter;
pub mod outlook;

pub use config::{
    AxessoConfig, ConnectorConfig, OpenRouterConfig, OutlookConfig, OutscraperConfig,
    ShopifyConfig,
};
pub use errors::ConnectorError;
pub use marketplace::{
    AxessoWalmartClient, ConnectionStatus, FetchedProduct, MarketplaceConnector,
    MarketplaceRegistry, OutscraperClient, RawReview, ShopifyClient,
};
pub use openrouter::{ChatMessage, ChatRequest, CompletionConnector, OpenRouterClient};
pub use outlook::{EmailMessage, OutlookClient};

use std::sync::Arc;

/// Every outbound client, built once from configuration and shared by the
/// routes and the importer.
#[derive(Clone)]
pub struct Connectors {
    pub amazon: Arc<OutscraperClient>,
    pub walmart: Arc<AxessoWalmartClient>,
    pub shopify: Arc<ShopifyClient>,
    pub completion: Arc<dyn CompletionConnector>,
    pub outlook: Arc<OutlookClient>,
}

impl Connectors {
    /// Missing secrets are logged, not fatal: calls that need them fail with
    /// [`ConnectorError::NotConfigured`].
    pub fn from_config(config: &ConnectorConfig) -> Result<Self, ConnectorError> {
        let amazon = OutscraperClient::new(&config.outscraper)?;
        let walmart = AxessoWalmartClient::new(&config.axesso)?;
        let shopify = ShopifyClient::new(&config.shopify)?;
        let openrouter = OpenRouterClient::new(&config.openrouter)?;
        let outlook = OutlookClient::new(&config.outlook)?;

        for (name, configured) in [
            ("Outscraper", amazon.is_configured()),
            ("Axesso", walmart.is_configured()),
            ("Shopify", shopify.is_configured()),
            ("OpenRouter", openrouter.is_configured()),
            ("Outlook", outlook.is_configured()),
        ] {
            if !configured {
                tracing::warn!("{} connector not configured; calls to it will fail", name);
            }
        }

        Ok(Self {
            amazon: Arc::new(amazon),
            walmart: Arc::new(walmart),
            shopify: Arc::new(shopify),
            completion: Arc::new(openrouter),
            outlook: Arc::new(outlook),
        })
    }

    /// Marketplace adapters keyed by platform, for the importer.
    pub fn marketplaces(&self) -> MarketplaceRegistry {
        MarketplaceRegistry::new()
            .register(self.amazon.clone())
            .register(self.walmart.clone())
            .register(self.shopify.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;

    #[test]
    fn unconfigured_connectors_still_build() {
        let connectors = Connectors::from_config(&ConnectorConfig::default()).unwrap();
        let registry = connectors.marketplaces();
        for platform in Platform::MARKETPLACES {
            let connector = registry.get(platform).unwrap();
            assert_eq!(connector.platform(), platform);
            assert!(!connector.is_configured());
        }
        assert!(registry.get(Platform::Outlook).is_none());
    }
}
