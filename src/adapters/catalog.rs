use crate::domain::model::Product;
use crate::domain::ports::Catalog;
use crate::utils::error::{Result, TireSearchError};
use crate::utils::numeric;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// 價目表匯出 CSV 的一列，欄位名稱沿用試算表標題
#[derive(Debug, Deserialize)]
struct PriceListRow {
    #[serde(rename = "ID Producto", default)]
    id: String,
    #[serde(rename = "Producto", default)]
    name: String,
    #[serde(rename = "Exit.", default)]
    stock: String,
    #[serde(rename = "PRECIO FINAL", default)]
    final_price: String,
}

impl PriceListRow {
    fn into_product(self) -> Product {
        let price = numeric::price_from_str(&self.final_price).unwrap_or_else(|| {
            tracing::warn!(
                "⚠️ Non-numeric price '{}' for product '{}', using 0",
                self.final_price,
                self.id
            );
            0
        });
        let stock = numeric::stock_from_str(&self.stock).unwrap_or_else(|| {
            tracing::debug!("Non-numeric stock '{}' for product '{}', using 0", self.stock, self.id);
            0
        });

        Product {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            stock,
            price,
        }
    }
}

/// 商品搜尋條件，至少需要一個
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductFilter {
    pub query: Option<String>,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub limit: Option<usize>,
}

impl ProductFilter {
    fn is_empty(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        blank(&self.query)
            && blank(&self.product_id)
            && blank(&self.product_name)
            && self.price_min.is_none()
            && self.price_max.is_none()
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_SEARCH_LIMIT)
    }
}

fn contains_ci(haystack: &str, needle: &Option<String>) -> bool {
    match needle.as_deref().map(str::trim) {
        Some(needle) if !needle.is_empty() => {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }
        _ => true,
    }
}

/// 記憶體中的價目表。重新載入時整批替換，失敗則保留舊資料。
pub struct PriceListCatalog {
    path: Option<PathBuf>,
    products: RwLock<Arc<Vec<Product>>>,
}

impl PriceListCatalog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            products: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// 建立並立即載入
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let catalog = Self::new(path);
        catalog.load()?;
        Ok(catalog)
    }

    pub fn from_products(products: Vec<Product>) -> Self {
        Self {
            path: None,
            products: RwLock::new(Arc::new(products)),
        }
    }

    pub fn read_products<R: Read>(reader: R) -> Result<Vec<Product>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut products = Vec::new();
        for row in csv_reader.deserialize::<PriceListRow>() {
            products.push(row?.into_product());
        }
        Ok(products)
    }

    pub fn len(&self) -> usize {
        self.products().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 關鍵字比對 ID 與名稱（不分大小寫），再套用價格區間。
    /// 先截斷到 limit 筆後才依價格排序。
    pub fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        if filter.is_empty() {
            return Err(TireSearchError::ValidationError {
                message: "At least one search parameter is required (query, productId, productName, priceMin, priceMax)".to_string(),
            });
        }

        let snapshot = self.products();
        let mut results: Vec<Product> = snapshot
            .iter()
            .filter(|p| match filter.query.as_deref().map(str::trim) {
                Some(q) if !q.is_empty() => {
                    let q = Some(q.to_string());
                    contains_ci(&p.id, &q) || contains_ci(&p.name, &q)
                }
                _ => true,
            })
            .filter(|p| contains_ci(&p.id, &filter.product_id))
            .filter(|p| contains_ci(&p.name, &filter.product_name))
            .filter(|p| filter.price_min.map_or(true, |min| p.price as f64 >= min))
            .filter(|p| filter.price_max.map_or(true, |max| p.price as f64 <= max))
            .cloned()
            .collect();

        results.truncate(filter.effective_limit());
        results.sort_by_key(|p| p.price);
        Ok(results)
    }
}

impl Catalog for PriceListCatalog {
    fn load(&self) -> Result<usize> {
        let Some(path) = &self.path else {
            return Ok(self.len());
        };

        tracing::debug!("Loading price list from: {}", path.display());
        let file = std::fs::File::open(path).map_err(|e| {
            tracing::error!("❌ Failed to open price list {}: {}", path.display(), e);
            TireSearchError::IoError(e)
        })?;
        let products = Self::read_products(file)?;
        let count = products.len();

        match self.products.write() {
            Ok(mut guard) => *guard = Arc::new(products),
            Err(poisoned) => *poisoned.into_inner() = Arc::new(products),
        }

        tracing::info!("📦 Loaded {} products from {}", count, path.display());
        Ok(count)
    }

    fn products(&self) -> Arc<Vec<Product>> {
        match self.products.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    fn find_by_id(&self, id: &str) -> Option<Product> {
        let wanted = id.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.products()
            .iter()
            .find(|p| p.id.to_lowercase() == wanted)
            .cloned()
    }
}
