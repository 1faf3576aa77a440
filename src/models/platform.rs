use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::UnknownVariant;

/// Review sources. The display form is what ends up in `reviews.marketplace`
/// and `products.platform`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Amazon,
    Walmart,
    Shopify,
    Outlook,
}

impl Platform {
    pub const MARKETPLACES: [Platform; 3] = [Platform::Amazon, Platform::Walmart, Platform::Shopify];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Amazon => "Amazon",
            Platform::Walmart => "Walmart",
            Platform::Shopify => "Shopify",
            Platform::Outlook => "Outlook",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Platform::Amazon => "amazon",
            Platform::Walmart => "walmart",
            Platform::Shopify => "shopify",
            Platform::Outlook => "outlook",
        }
    }
}

impl FromStr for Platform {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "amazon" => Ok(Platform::Amazon),
            "walmart" => Ok(Platform::Walmart),
            "shopify" => Ok(Platform::Shopify),
            "outlook" | "email" | "mailbox" => Ok(Platform::Outlook),
            _ => Err(UnknownVariant {
                kind: "platform",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
