//! API client for the Produtivo backend.
//!
//! The backend exposes its tables through a PostgREST-style REST layer
//! (`/rest/v1/<table>`). All methods are non-blocking and designed to run in
//! a separate Tokio task.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client, Response,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::models::{
    BackendError, CreateFeatureDto, CreateProductDto, FeatureDto, FeatureStatus,
    FeatureStatusPatch, ProductDto, UpdateFeatureDto, UpdateProductDto,
};

/// Default API base URL (local development stack)
pub const DEFAULT_BASE_URL: &str = "http://localhost:54321";

/// Rows requested per page when listing a table
pub const PAGE_SIZE: usize = 100;

const PRODUCTS: &str = "products";
const FEATURES: &str = "features";

/// API client for the Produtivo backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client. An empty `api_key` sends no auth headers.
    pub fn new(base_url: impl Into<String>, api_key: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if !api_key.is_empty() {
            headers.insert(
                "apikey",
                HeaderValue::from_str(api_key).context("API key is not a valid header value")?,
            );
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", api_key))
                    .context("API key is not a valid header value")?,
            );
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn page_url(&self, table: &str, order: &str, offset: usize) -> String {
        format!(
            "{}?select=*&order={}&limit={}&offset={}",
            self.table_url(table),
            order,
            PAGE_SIZE,
            offset
        )
    }

    fn row_url(&self, table: &str, id: Uuid) -> String {
        format!("{}?id=eq.{}", self.table_url(table), id)
    }

    /// Fetch every row of `table`, one page at a time, until an empty page
    async fn fetch_all<T: DeserializeOwned>(&self, table: &str, order: &str) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        let mut offset = 0;

        loop {
            let url = self.page_url(table, order, offset);
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("Failed to send request to {} endpoint", table))?;

            let page: Vec<T> = ensure_success(response)
                .await?
                .json()
                .await
                .with_context(|| format!("Failed to parse {} response", table))?;

            let fetched = page.len();
            rows.extend(page);
            tracing::debug!(table, offset, fetched, "fetched page");

            // Servers may cap rows below PAGE_SIZE; only an empty page ends the listing
            match next_offset(offset, fetched) {
                Some(next) => offset = next,
                None => break,
            }
        }

        Ok(rows)
    }

    /// Insert one row and return it as stored
    async fn insert<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send create request to {}", table))?;

        single_row(ensure_success(response).await?, table).await
    }

    /// Patch one row by id and return it as stored
    async fn patch<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        id: Uuid,
        body: &B,
    ) -> Result<T> {
        let response = self
            .client
            .patch(self.row_url(table, id))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send update request to {}", table))?;

        single_row(ensure_success(response).await?, table).await
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<Uuid> {
        let response = self
            .client
            .delete(self.row_url(table, id))
            .send()
            .await
            .with_context(|| format!("Failed to send delete request to {}", table))?;

        ensure_success(response).await?;
        Ok(id)
    }

    // ============================================
    // Products CRUD
    // ============================================

    pub async fn fetch_all_products(&self) -> Result<Vec<ProductDto>> {
        self.fetch_all(PRODUCTS, "created_at.asc").await
    }

    pub async fn create_product(&self, product: &CreateProductDto) -> Result<ProductDto> {
        self.insert(PRODUCTS, product).await
    }

    pub async fn update_product(&self, id: Uuid, product: &UpdateProductDto) -> Result<ProductDto> {
        self.patch(PRODUCTS, id, product).await
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<Uuid> {
        self.delete(PRODUCTS, id).await
    }

    // ============================================
    // Features CRUD
    // ============================================

    pub async fn fetch_all_features(&self) -> Result<Vec<FeatureDto>> {
        self.fetch_all(FEATURES, "start_date.asc.nullslast,id.asc")
            .await
    }

    pub async fn create_feature(&self, feature: &CreateFeatureDto) -> Result<FeatureDto> {
        self.insert(FEATURES, feature).await
    }

    pub async fn update_feature(&self, id: Uuid, feature: &UpdateFeatureDto) -> Result<FeatureDto> {
        self.patch(FEATURES, id, feature).await
    }

    pub async fn update_feature_status(
        &self,
        id: Uuid,
        status: FeatureStatus,
    ) -> Result<FeatureDto> {
        self.patch(FEATURES, id, &FeatureStatusPatch { status }).await
    }

    pub async fn delete_feature(&self, id: Uuid) -> Result<Uuid> {
        self.delete(FEATURES, id).await
    }

    // ============================================
    // Utility
    // ============================================

    /// Health check - requests a single product row
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}?select=id&limit=1", self.table_url(PRODUCTS));
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

/// Turn a non-2xx response into an error carrying status and body
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("API error: {} - {}", status, error_detail(&body))
}

/// Offset of the page after one that returned `fetched` rows
fn next_offset(offset: usize, fetched: usize) -> Option<usize> {
    (fetched > 0).then(|| offset + fetched)
}

/// Readable detail for an error body; structured errors are summarised
pub fn error_detail(body: &str) -> String {
    match serde_json::from_str::<BackendError>(body) {
        Ok(err) if err.message.is_some() => err.summary(),
        _ => body.trim().to_string(),
    }
}

/// The REST layer answers inserts/patches with an array of affected rows
async fn single_row<T: DeserializeOwned>(response: Response, table: &str) -> Result<T> {
    let mut rows: Vec<T> = response
        .json()
        .await
        .with_context(|| format!("Failed to parse {} response", table))?;

    if rows.is_empty() {
        anyhow::bail!("No {} row matched the request", table);
    }
    Ok(rows.swap_remove(0))
}

/// Messages sent from API worker to the main TUI thread
#[derive(Debug, Clone)]
pub enum ApiMessage {
    /// Products data has been loaded
    ProductsLoaded(Vec<ProductDto>),
    /// Features data has been loaded
    FeaturesLoaded(Vec<FeatureDto>),
    /// An error occurred during API communication
    Error(String),
    /// API connection status changed
    ConnectionStatus(bool),
    /// Entity created successfully
    Created(EntityType, Uuid),
    /// Entity updated successfully
    Updated(EntityType, Uuid),
    /// Entity deleted successfully
    Deleted(EntityType, Uuid),
}

/// Entity types for CRUD operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Product,
    Feature,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Product => write!(f, "Product"),
            EntityType::Feature => write!(f, "Feature"),
        }
    }
}

/// Commands sent from TUI to the API worker
#[derive(Debug, Clone)]
pub enum ApiCommand {
    /// Request to refresh all data
    RefreshAll,
    RefreshProducts,
    RefreshFeatures,
    /// Shutdown the API worker
    Shutdown,
    CreateProduct(CreateProductDto),
    UpdateProduct(Uuid, UpdateProductDto),
    DeleteProduct(Uuid),
    CreateFeature(CreateFeatureDto),
    UpdateFeature(Uuid, UpdateFeatureDto),
    /// Status-only change from the roadmap
    UpdateFeatureStatus(Uuid, FeatureStatus),
    DeleteFeature(Uuid),
}

impl ApiCommand {
    /// Collection to reload after this command succeeds
    pub fn refresh_after(&self) -> Option<ApiCommand> {
        match self {
            ApiCommand::CreateProduct(_) | ApiCommand::UpdateProduct(..) => {
                Some(ApiCommand::RefreshProducts)
            }
            // product rows cascade to their features
            ApiCommand::DeleteProduct(_) => Some(ApiCommand::RefreshAll),
            ApiCommand::CreateFeature(_)
            | ApiCommand::UpdateFeature(..)
            | ApiCommand::UpdateFeatureStatus(..)
            | ApiCommand::DeleteFeature(_) => Some(ApiCommand::RefreshFeatures),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:54321/", "secret", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_urls_follow_rest_layout() {
        let api = client();
        assert_eq!(api.base_url(), "http://localhost:54321");
        assert_eq!(
            api.table_url(PRODUCTS),
            "http://localhost:54321/rest/v1/products"
        );
        assert_eq!(
            api.page_url(FEATURES, "id.asc", 200),
            "http://localhost:54321/rest/v1/features?select=*&order=id.asc&limit=100&offset=200"
        );

        let id = Uuid::from_u128(7);
        assert_eq!(
            api.row_url(FEATURES, id),
            format!("http://localhost:54321/rest/v1/features?id=eq.{}", id)
        );
    }

    #[test]
    fn test_paging_continues_past_short_pages() {
        // A server capping rows at 50 still gets every page requested
        assert_eq!(next_offset(0, PAGE_SIZE), Some(PAGE_SIZE));
        assert_eq!(next_offset(0, 50), Some(50));
        assert_eq!(next_offset(50, 50), Some(100));
        assert_eq!(next_offset(100, 1), Some(101));
        assert_eq!(next_offset(101, 0), None);
    }

    #[test]
    fn test_invalid_api_key_is_rejected() {
        assert!(ApiClient::new(DEFAULT_BASE_URL, "bad\nkey", Duration::from_secs(5)).is_err());
        assert!(ApiClient::new(DEFAULT_BASE_URL, "", Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_error_detail_prefers_structured_message() {
        let body = r#"{"code":"23505","message":"duplicate key","details":null,"hint":null}"#;
        assert_eq!(error_detail(body), "duplicate key (23505)");
        assert_eq!(error_detail("  gateway timeout \n"), "gateway timeout");
    }

    #[test]
    fn test_mutations_refresh_their_collection() {
        let id = Uuid::from_u128(1);
        assert!(matches!(
            ApiCommand::DeleteProduct(id).refresh_after(),
            Some(ApiCommand::RefreshAll)
        ));
        assert!(matches!(
            ApiCommand::UpdateFeatureStatus(id, FeatureStatus::Done).refresh_after(),
            Some(ApiCommand::RefreshFeatures)
        ));
        assert!(ApiCommand::RefreshAll.refresh_after().is_none());
    }
}
