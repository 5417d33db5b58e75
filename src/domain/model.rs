use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::utils::numeric;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TireCategory {
    Car,
    Truck,
    Unknown,
}

impl fmt::Display for TireCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TireCategory::Car => "car",
            TireCategory::Truck => "truck",
            TireCategory::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// 從商品名稱解析出的輪胎規格。`width == None` 代表無法解析。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TireSpecification {
    pub width: Option<u32>,
    pub aspect_ratio: Option<u32>,
    pub rim_diameter: Option<u32>,
    /// 無法解析時輸出 `null`
    #[serde(
        rename = "type",
        serialize_with = "serialize_category",
        deserialize_with = "deserialize_category"
    )]
    pub category: TireCategory,
    #[serde(rename = "original")]
    pub original_text: String,
}

fn serialize_category<S: Serializer>(category: &TireCategory, serializer: S) -> Result<S::Ok, S::Error> {
    match category {
        TireCategory::Unknown => serializer.serialize_none(),
        known => serializer.serialize_some(known),
    }
}

fn deserialize_category<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TireCategory, D::Error> {
    Ok(Option::<TireCategory>::deserialize(deserializer)?.unwrap_or(TireCategory::Unknown))
}

impl TireSpecification {
    pub fn unparseable(original_text: impl Into<String>) -> Self {
        Self {
            width: None,
            aspect_ratio: None,
            rim_diameter: None,
            category: TireCategory::Unknown,
            original_text: original_text.into(),
        }
    }

    pub fn car(
        width: u32,
        aspect_ratio: Option<u32>,
        rim_diameter: u32,
        original_text: impl Into<String>,
    ) -> Self {
        Self {
            width: Some(width),
            aspect_ratio,
            rim_diameter: Some(rim_diameter),
            category: TireCategory::Car,
            original_text: original_text.into(),
        }
    }

    pub fn truck(width: u32, rim_diameter: u32, original_text: impl Into<String>) -> Self {
        Self {
            width: Some(width),
            aspect_ratio: None,
            rim_diameter: Some(rim_diameter),
            category: TireCategory::Truck,
            original_text: original_text.into(),
        }
    }

    pub fn is_parseable(&self) -> bool {
        self.width.is_some()
    }
}

impl fmt::Display for TireSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(width) = self.width else {
            return write!(f, "unparseable ({})", self.original_text);
        };
        write!(f, "{}", width)?;
        if let Some(ratio) = self.aspect_ratio {
            write!(f, "/{}", ratio)?;
        }
        if let Some(rim) = self.rim_diameter {
            write!(f, "R{}", rim)?;
        }
        Ok(())
    }
}

/// 價目表中的一筆商品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub stock: i64,
    pub price: i64,
}

impl Product {
    pub fn product_ref(&self) -> ProductRef {
        ProductRef {
            id: self.id.clone(),
            name: self.name.clone(),
            stock: self.stock,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: String,
    #[serde(rename = "product")]
    pub name: String,
    pub stock: i64,
}

/// 外部商品搜尋服務回傳的項目，欄位名稱與型別由對方決定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalProduct {
    #[serde(default)]
    pub clave: serde_json::Value,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub existencia: serde_json::Value,
    #[serde(default, rename = "precioNeto")]
    pub precio_neto: serde_json::Value,
    #[serde(default)]
    pub precio: serde_json::Value,
}

impl ExternalProduct {
    pub fn id(&self) -> String {
        match &self.clave {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// 顯示用的庫存，取整數部分
    pub fn stock(&self) -> i64 {
        numeric::stock_from_value(&self.existencia).unwrap_or(0)
    }

    /// 以原始數值判斷是否有庫存，避免 0.5 這類數量被取整成 0
    pub fn in_stock(&self) -> bool {
        numeric::value_as_f64(&self.existencia).is_some_and(|v| v > 0.0)
    }

    /// 優先使用 `precioNeto`，沒有時退回 `precio`
    pub fn price(&self) -> Option<i64> {
        numeric::price_from_value(&self.precio_neto)
            .or_else(|| numeric::price_from_value(&self.precio))
    }

    pub fn product_ref(&self) -> ProductRef {
        ProductRef {
            id: self.id(),
            name: self.descripcion.clone(),
            stock: self.stock(),
        }
    }
}

/// 比對輸入：商品與其規格、用於排序的價格
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub product: ProductRef,
    pub price: i64,
    pub specs: TireSpecification,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub product: ProductRef,
    pub price: i64,
    pub specs: TireSpecification,
}

impl From<Candidate> for MatchResult {
    fn from(candidate: Candidate) -> Self {
        Self {
            product: candidate.product,
            price: candidate.price,
            specs: candidate.specs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_specification_display() {
        assert_eq!(TireSpecification::car(185, Some(60), 15, "").to_string(), "185/60R15");
        assert_eq!(TireSpecification::truck(1100, 22, "").to_string(), "1100R22");
        assert!(!TireSpecification::unparseable("OIL").is_parseable());
    }

    #[test]
    fn test_specification_serializes_like_wire_format() {
        let spec = TireSpecification::truck(1100, 22, "1100 R22 T-2400 14/C");
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            value,
            json!({
                "width": 1100,
                "aspect_ratio": null,
                "rim_diameter": 22,
                "type": "truck",
                "original": "1100 R22 T-2400 14/C"
            })
        );
    }

    #[test]
    fn test_unparseable_specification_has_null_type() {
        let spec = TireSpecification::unparseable("OIL FILTER");
        let value = serde_json::to_value(&spec).unwrap();
        assert!(value["type"].is_null());
        assert_eq!(value["original"], "OIL FILTER");

        let back: TireSpecification = serde_json::from_value(value).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_fractional_stock_counts_as_in_stock() {
        let item: ExternalProduct = serde_json::from_value(json!({
            "clave": "HALF",
            "descripcion": "185/65R15 88H",
            "existencia": 0.5
        }))
        .unwrap();
        assert!(item.in_stock());
        assert_eq!(item.stock(), 0);

        let empty: ExternalProduct = serde_json::from_value(json!({"existencia": "0"})).unwrap();
        assert!(!empty.in_stock());
        assert!(!ExternalProduct::default().in_stock());
    }

    #[test]
    fn test_external_product_loose_fields() {
        let item: ExternalProduct = serde_json::from_value(json!({
            "clave": 12345,
            "descripcion": "185/65R15 88H ECOPIA",
            "existencia": "4.0",
            "precio": "1299.6"
        }))
        .unwrap();

        assert_eq!(item.id(), "12345");
        assert_eq!(item.stock(), 4);
        assert_eq!(item.price(), Some(1300));
    }

    #[test]
    fn test_match_result_flattens_product() {
        let result = MatchResult {
            product: ProductRef {
                id: "A-1".to_string(),
                name: "155 70 13 GOODYEAR".to_string(),
                stock: 3,
            },
            price: 900,
            specs: TireSpecification::car(155, Some(70), 13, "155 70 13 GOODYEAR"),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["id"], "A-1");
        assert_eq!(value["product"], "155 70 13 GOODYEAR");
        assert_eq!(value["specs"]["type"], "car");
    }
}
