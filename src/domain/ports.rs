use crate::domain::model::{ExternalProduct, Product};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// 商品目錄。`load` 重新讀取資料來源，`products` 取得目前的快照。
pub trait Catalog: Send + Sync {
    fn load(&self) -> Result<usize>;
    fn products(&self) -> Arc<Vec<Product>>;
    fn find_by_id(&self, id: &str) -> Option<Product>;
}

#[async_trait]
pub trait ProductSearch: Send + Sync {
    async fn search(&self, text: &str) -> Result<Vec<ExternalProduct>>;
}
