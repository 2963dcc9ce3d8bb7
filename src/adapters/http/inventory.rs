use super::{segment, ApiClient};
use crate::domain::inventory::{InventoryItem, InventoryKind, NewInventoryItem, StockAdjustment};
use crate::domain::ports::InventoryRepository;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Method;

#[async_trait]
impl InventoryRepository for ApiClient {
    async fn list_items(&self, kind: Option<InventoryKind>) -> Result<Vec<InventoryItem>> {
        let query: Vec<(&str, String)> = kind
            .map(|k| vec![("tipo", k.as_query().to_string())])
            .unwrap_or_default();
        self.get("/inventario", &query).await
    }

    async fn create_item(&self, item: &NewInventoryItem) -> Result<InventoryItem> {
        self.send(Method::POST, "/inventario", item).await
    }

    async fn adjust_stock(&self, id: &str, delta: i64) -> Result<InventoryItem> {
        self.send(
            Method::PATCH,
            &format!("/inventario/{}/stock", segment(id)),
            &StockAdjustment { delta },
        )
        .await
    }
}
