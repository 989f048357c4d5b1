//! AI insight adapter.
//!
//! Builds a bounded summary of recent sales and low-stock products, sends it
//! to the Anthropic Messages API, and returns the response HTML verbatim.
//!
//! ## Failure Contract
//! This adapter never returns an error to its caller. Missing credential,
//! transport failure, non-success status, malformed response - every failure
//! mode degrades to [`FALLBACK_INSIGHT`] so the insights panel always has
//! something to show. There is no retry policy; the user just asks again.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stylestock_core::{Product, Sale, LOW_STOCK_THRESHOLD};

const CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// At most this many sales go into the prompt, most recent first.
const MAX_PROMPT_SALES: usize = 50;

/// Response budget. Insights are a short HTML fragment, not an essay.
const MAX_TOKENS: u32 = 1024;

/// What the caller gets when anything goes wrong.
pub const FALLBACK_INSIGHT: &str = "<p>Sorry, insights are unavailable right now. \
     Check the AI configuration and try again in a moment.</p>";

const SYSTEM_PROMPT: &str = "You are a retail analyst for a small clothing store. \
     Respond with a concise HTML fragment using only <h3>, <p>, <ul> and <li> tags. \
     No markdown, no <html> or <head> wrapper.";

#[derive(Debug, Clone, Error)]
pub enum InsightError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("rate limited")]
    RateLimited,
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("json error: {0}")]
    Serde(String),
    #[error("missing api key: STYLESTOCK_AI_API_KEY not configured")]
    MissingApiKey,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize)]
struct Message {
    role: String,
    content: String,
}

impl Message {
    fn user(content: impl Into<String>) -> Self {
        Message {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for the Messages API
#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

/// Content block in the response
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

/// Response from the Messages API
#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

impl ClaudeResponse {
    /// Extract the text content from the response
    fn text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
        })
    }
}

/// Token usage information
#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

/// The insight service.
///
/// Cheap to clone; lives in the shared application state.
#[derive(Debug, Clone)]
pub struct InsightService {
    http: Client,
    api_key: Option<String>,
    model: String,
}

impl InsightService {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Creates the service. A `None` api_key is valid - every insight
    /// request will then come back as the fallback message.
    pub fn new(api_key: Option<String>, model: String) -> Result<Self, InsightError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("stylestock/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InsightError::Transport(e.to_string()))?;

        Ok(InsightService {
            http,
            api_key,
            model,
        })
    }

    /// Generates an insight for the given sales and product data.
    ///
    /// Always returns displayable HTML; failures are logged and replaced
    /// with the fallback message.
    pub async fn generate(&self, sales: &[Sale], products: &[Product]) -> String {
        let prompt = build_prompt(sales, products);

        match self.request(prompt).await {
            Ok(response) => match response.text() {
                Some(html) => {
                    tracing::debug!(
                        input_tokens = response.usage.input_tokens,
                        output_tokens = response.usage.output_tokens,
                        "Insight generated"
                    );
                    html.to_string()
                }
                None => {
                    tracing::warn!("Insight response had no text content");
                    FALLBACK_INSIGHT.to_string()
                }
            },
            Err(e) => {
                tracing::warn!("Insight request failed: {}", e);
                FALLBACK_INSIGHT.to_string()
            }
        }
    }

    async fn request(&self, prompt: String) -> Result<ClaudeResponse, InsightError> {
        let api_key = self.api_key.as_ref().ok_or(InsightError::MissingApiKey)?;

        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message::user(prompt)],
            system: Some(SYSTEM_PROMPT.to_string()),
        };

        let res = self
            .http
            .post(CLAUDE_API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        match res.status() {
            s if s.is_success() => res
                .json::<ClaudeResponse>()
                .await
                .map_err(|e| InsightError::Serde(e.to_string())),
            StatusCode::UNAUTHORIZED => Err(InsightError::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => Err(InsightError::RateLimited),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                Err(InsightError::Http { status, body })
            }
        }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> InsightError {
    if e.is_timeout() {
        InsightError::Timeout
    } else {
        InsightError::Transport(e.to_string())
    }
}

/// Builds the instruction prompt: at most the last 50 sales plus every
/// product under 5 units of stock, JSON-embedded.
fn build_prompt(sales: &[Sale], products: &[Product]) -> String {
    let recent: Vec<serde_json::Value> = sales
        .iter()
        .take(MAX_PROMPT_SALES)
        .map(|sale| {
            serde_json::json!({
                "product": sale.product_name,
                "quantity": sale.quantity,
                "totalCents": sale.total_cents,
                "paymentMethod": sale.payment_method,
                "date": sale.created_at.date_naive(),
            })
        })
        .collect();

    let low_stock: Vec<serde_json::Value> = products
        .iter()
        .filter(|product| product.current_stock < LOW_STOCK_THRESHOLD)
        .map(|product| {
            serde_json::json!({
                "code": product.code,
                "name": product.name,
                "category": product.category,
                "currentStock": product.current_stock,
            })
        })
        .collect();

    format!(
        "Here is current data from the store, as JSON. All money values are integer cents.\n\n\
         Recent sales (most recent first):\n{}\n\n\
         Products under {} units of stock:\n{}\n\n\
         Analyze what is selling well and what needs attention. Name the products \
         worth restocking first and give one concrete action for the coming week. \
         Keep it under 200 words.",
        serde_json::Value::Array(recent),
        LOW_STOCK_THRESHOLD,
        serde_json::Value::Array(low_stock),
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stylestock_core::PaymentMethod;

    fn sale_named(name: &str) -> Sale {
        Sale {
            id: uuid::Uuid::new_v4().to_string(),
            product_id: "p1".to_string(),
            product_name: name.to_string(),
            cost_at_sale_cents: 5000,
            sale_price_cents: 7500,
            quantity: 1,
            total_cents: 7500,
            payment_method: PaymentMethod::Pix,
            customer_id: None,
            customer_name: None,
            created_at: Utc::now(),
        }
    }

    fn product_with_stock(code: &str, stock: i64) -> Product {
        Product {
            id: uuid::Uuid::new_v4().to_string(),
            code: code.to_string(),
            name: format!("Product {}", code),
            category: "Shirts".to_string(),
            cost_cents: 5000,
            margin_bps: 5000,
            suggested_price_cents: 7500,
            current_stock: stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_prompt_caps_sales_at_fifty() {
        let sales: Vec<Sale> = (0..55)
            .map(|i| sale_named(&format!("Item-{:03}", i)))
            .collect();

        let prompt = build_prompt(&sales, &[]);
        assert!(prompt.contains("Item-000"));
        assert!(prompt.contains("Item-049"));
        assert!(!prompt.contains("Item-050"));
        assert!(!prompt.contains("Item-054"));
    }

    #[test]
    fn test_prompt_includes_only_products_under_threshold() {
        let products = vec![
            product_with_stock("ZERO-1", 0),
            product_with_stock("FOUR-1", 4),
            product_with_stock("FIVE-1", 5),
            product_with_stock("MANY-1", 30),
        ];

        let prompt = build_prompt(&[], &products);
        assert!(prompt.contains("ZERO-1"));
        assert!(prompt.contains("FOUR-1"));
        assert!(!prompt.contains("FIVE-1"));
        assert!(!prompt.contains("MANY-1"));
    }

    #[tokio::test]
    async fn test_generate_without_key_returns_fallback() {
        // No API key configured: the request short-circuits before any
        // network traffic and the caller still gets displayable HTML.
        let service = InsightService::new(None, DEFAULT_MODEL.to_string()).unwrap();
        let html = service.generate(&[], &[]).await;
        assert_eq!(html, FALLBACK_INSIGHT);
    }
}
