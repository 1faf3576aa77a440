use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Serialize, Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImportForm {
    /// Product URL, ASIN, handle or id, depending on the platform
    #[serde(default, alias = "url", alias = "productId")]
    #[validate(min_length = 1)]
    #[validate(max_length = 2048)]
    pub product_url: String,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct AmazonPreviewForm {
    #[serde(default)]
    #[validate(min_length = 1)]
    #[validate(max_length = 2048)]
    pub asin: String,
    #[validate(minimum = 1)]
    #[validate(maximum = 100)]
    pub limit: Option<u32>,
}
