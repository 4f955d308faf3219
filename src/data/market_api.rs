use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::API;
use crate::config::api::MarketApiConfig;

/// One auction-house record as the upstream API returns it. Only
/// `Name`/`CurrentMinPrice` are required downstream; the rest travels along
/// for the raw-snapshot sink.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketItemRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Grade", default)]
    pub grade: String,
    #[serde(rename = "CurrentMinPrice")]
    pub current_min_price: f64,
    #[serde(rename = "RecentPrice", default)]
    pub recent_price: f64,
    #[serde(rename = "YDayAvgPrice", default)]
    pub yday_avg_price: f64,
    #[serde(rename = "BundleCount", default)]
    pub bundle_count: u32,
}

/// One market search. `page_no` starts at 1.
#[derive(Debug, Clone, Serialize)]
pub struct MarketQuery {
    #[serde(rename = "CategoryCode")]
    pub category_code: u32,
    #[serde(rename = "ItemName", skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(rename = "ItemTier", skip_serializing_if = "Option::is_none")]
    pub item_tier: Option<u32>,
    #[serde(rename = "ItemGrade", skip_serializing_if = "Option::is_none")]
    pub item_grade: Option<String>,
    #[serde(rename = "PageNo")]
    pub page_no: u32,
    #[serde(rename = "SortCondition")]
    pub sort_condition: String,
}

impl MarketQuery {
    pub fn by_name(category_code: u32, item_name: &str, item_tier: Option<u32>) -> Self {
        Self {
            category_code,
            item_name: Some(item_name.to_string()),
            item_tier,
            item_grade: None,
            page_no: 1,
            sort_condition: "ASC".to_string(),
        }
    }

    pub fn by_grade(category_code: u32, item_grade: &str, page_no: u32) -> Self {
        Self {
            category_code,
            item_name: None,
            item_tier: None,
            item_grade: Some(item_grade.to_string()),
            page_no,
            sort_condition: "DESC".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MarketItemsPage {
    // An absent list is "no data this cycle", not an error
    #[serde(rename = "Items", default)]
    items: Vec<MarketItemRecord>,
}

/// Seam between collection and the upstream API, so tests inject an
/// in-memory source.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Zero or more records for a query. An empty result is not an error.
    async fn market_items(&self, query: &MarketQuery) -> Result<Vec<MarketItemRecord>>;

    /// A unique identifier for this implementation (so that afterwards we know which one we used).
    fn signature(&self) -> &'static str;
}

/// Live client against the Lost Ark open API.
pub struct LostArkApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    config: MarketApiConfig,
}

impl LostArkApi {
    /// Reads the bearer token from the environment (`LOSTARK_API_KEY`).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API.key_env_var)
            .context(format!("Missing API key env var: {}", API.key_env_var))?;
        Self::new(API.base_url, api_key, MarketApiConfig::default())
    }

    pub fn new(base_url: &str, api_key: String, config: MarketApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            config,
        })
    }

    async fn post_market_items(&self, query: &MarketQuery) -> Result<MarketItemsPage> {
        let url = format!("{}/markets/items", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(query)
            .send()
            .await
            .context("Market request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Market request returned {}: {}", status, body));
        }
        response
            .json::<MarketItemsPage>()
            .await
            .context("Failed to decode market response")
    }
}

#[async_trait]
impl MarketDataSource for LostArkApi {
    async fn market_items(&self, query: &MarketQuery) -> Result<Vec<MarketItemRecord>> {
        let mut last_err = None;
        for attempt in 0..=self.config.retries {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.backoff_ms * attempt as u64))
                    .await;
            }
            match self.post_market_items(query).await {
                Ok(page) => return Ok(page.items),
                Err(e) => {
                    log::warn!(
                        "Market query attempt {}/{} failed: {:#}",
                        attempt + 1,
                        self.config.retries + 1,
                        e
                    );
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("Market query failed with no attempts made")))
    }

    fn signature(&self) -> &'static str {
        "lostark-open-api"
    }
}
