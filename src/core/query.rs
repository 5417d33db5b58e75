use serde::{Deserialize, Serialize};

use crate::domain::model::TireCategory;
use crate::utils::error::{Result, TireSearchError};
use crate::utils::numeric;
use crate::utils::validation::validate_required_field;

pub const DEFAULT_RESULT_LIMIT: usize = 10;
pub const MAX_RESULT_LIMIT: usize = 100;

/// 數字欄位可能以數字或字串傳入（例如 `"R15"`、`"205"`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Int(u64),
    Float(f64),
    Text(String),
}

impl From<u32> for LooseNumber {
    fn from(value: u32) -> Self {
        LooseNumber::Int(value as u64)
    }
}

impl From<&str> for LooseNumber {
    fn from(value: &str) -> Self {
        LooseNumber::Text(value.to_string())
    }
}

impl From<String> for LooseNumber {
    fn from(value: String) -> Self {
        LooseNumber::Text(value)
    }
}

impl std::fmt::Display for LooseNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LooseNumber::Int(v) => write!(f, "{}", v),
            LooseNumber::Float(v) => write!(f, "{}", v),
            LooseNumber::Text(v) => f.write_str(v),
        }
    }
}

/// 解析尺寸欄位；`R`/`r` 會被去掉，0 或空字串視為未提供
pub fn parse_measure_field(field: &str, value: Option<&LooseNumber>) -> Result<Option<u32>> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value {
        LooseNumber::Int(0) => Ok(None),
        LooseNumber::Int(v) => u32::try_from(*v)
            .map(Some)
            .map_err(|_| TireSearchError::invalid_field(field, v, "value is too large")),
        LooseNumber::Float(v) if v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64 => {
            Ok(Some(*v as u32).filter(|v| *v > 0))
        }
        LooseNumber::Float(v) => Err(TireSearchError::invalid_field(
            field,
            v,
            "value must be a whole number",
        )),
        LooseNumber::Text(text) => {
            numeric::parse_measure(text).map_err(|reason| TireSearchError::invalid_field(field, text, reason))
        }
    }
}

/// 結果筆數限制：無法解析時使用預設值，並夾在 [1, 100]
pub fn clamp_result_limit(value: Option<&LooseNumber>) -> usize {
    let requested: i64 = match value {
        Some(LooseNumber::Int(v)) => i64::try_from(*v).unwrap_or(i64::MAX),
        Some(LooseNumber::Float(v)) => v.trunc() as i64,
        Some(LooseNumber::Text(text)) => numeric::parse_float_prefix(text)
            .map(|v| v.trunc() as i64)
            .unwrap_or(0),
        None => 0,
    };
    let requested = if requested == 0 {
        DEFAULT_RESULT_LIMIT as i64
    } else {
        requested
    };
    requested.clamp(1, MAX_RESULT_LIMIT as i64) as usize
}

/// 來自 CLI 或 JSON 的原始搜尋請求
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TireSearchRequest {
    #[serde(default)]
    pub width: Option<LooseNumber>,
    #[serde(default, alias = "aspectRatio")]
    pub aspect_ratio: Option<LooseNumber>,
    #[serde(default, alias = "diameter")]
    pub rim_diameter: Option<LooseNumber>,
    #[serde(default)]
    pub exact_match: bool,
    #[serde(default)]
    pub limit: Option<LooseNumber>,
    #[serde(default)]
    pub brand: Option<String>,
}

impl TireSearchRequest {
    pub fn into_query(self) -> Result<MatchQuery> {
        MatchQuery::try_from(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Exact,
    Tolerant,
}

/// 經過驗證的搜尋條件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchQuery {
    pub width: u32,
    pub aspect_ratio: Option<u32>,
    pub rim_diameter: Option<u32>,
    pub exact_mode: bool,
    pub result_limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl MatchQuery {
    pub fn new(width: u32) -> Self {
        Self {
            width,
            aspect_ratio: None,
            rim_diameter: None,
            exact_mode: false,
            result_limit: DEFAULT_RESULT_LIMIT,
            brand: None,
        }
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: u32) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
        self
    }

    pub fn with_rim_diameter(mut self, rim_diameter: u32) -> Self {
        self.rim_diameter = Some(rim_diameter);
        self
    }

    pub fn exact(mut self, exact_mode: bool) -> Self {
        self.exact_mode = exact_mode;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.result_limit = limit.clamp(1, MAX_RESULT_LIMIT);
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        let brand = brand.into();
        self.brand = Some(brand).filter(|b| !b.trim().is_empty());
        self
    }

    /// 有扁平比即為轎車胎，否則視為卡車胎
    pub fn category(&self) -> TireCategory {
        if self.aspect_ratio.is_some() {
            TireCategory::Car
        } else {
            TireCategory::Truck
        }
    }

    pub fn is_fully_specified(&self) -> bool {
        self.aspect_ratio.is_some() && self.rim_diameter.is_some()
    }

    /// 例如 `155/70R13` 或 `1100R22`
    pub fn search_spec(&self) -> String {
        let mut spec = self.width.to_string();
        if let Some(ratio) = self.aspect_ratio {
            spec.push_str(&format!("/{}", ratio));
        }
        if let Some(rim) = self.rim_diameter {
            spec.push_str(&format!("R{}", rim));
        }
        spec
    }

    /// 送往外部搜尋服務的關鍵字
    pub fn search_text(&self) -> String {
        let mut parts = vec![self.width.to_string()];
        if let Some(ratio) = self.aspect_ratio {
            parts.push(ratio.to_string());
        }
        if let Some(rim) = self.rim_diameter {
            parts.push(rim.to_string());
        }
        if let Some(brand) = &self.brand {
            parts.push(brand.trim().to_string());
        }
        parts.join(" ")
    }
}

impl TryFrom<TireSearchRequest> for MatchQuery {
    type Error = TireSearchError;

    fn try_from(request: TireSearchRequest) -> Result<Self> {
        let width = parse_measure_field("width", request.width.as_ref())?;
        let width = *validate_required_field("width", &width)?;

        let mut query = MatchQuery::new(width).exact(request.exact_match);
        query.aspect_ratio = parse_measure_field("aspect_ratio", request.aspect_ratio.as_ref())?;
        query.rim_diameter = parse_measure_field("rim_diameter", request.rim_diameter.as_ref())?;
        query.result_limit = clamp_result_limit(request.limit.as_ref());
        if let Some(brand) = request.brand {
            query = query.with_brand(brand);
        }
        Ok(query)
    }
}

/// 外部搜尋前套用的預設扁平比：特定寬度與輪圈直徑在沒有指定扁平比時使用固定值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatioDefault {
    pub widths: Vec<u32>,
    pub rim_diameter: u32,
    pub aspect_ratio: u32,
}

impl AspectRatioDefault {
    pub fn builtin() -> Vec<AspectRatioDefault> {
        vec![AspectRatioDefault {
            widths: vec![205, 255],
            rim_diameter: 18,
            aspect_ratio: 70,
        }]
    }

    pub fn applies_to(&self, query: &MatchQuery) -> bool {
        query.aspect_ratio.is_none()
            && query.rim_diameter == Some(self.rim_diameter)
            && self.widths.contains(&query.width)
    }

    pub fn apply(&self, query: &mut MatchQuery) -> bool {
        if !self.applies_to(query) {
            return false;
        }
        query.aspect_ratio = Some(self.aspect_ratio);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> TireSearchRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_aliases_and_strings() {
        let query = request(json!({"width": "185", "aspectRatio": 65, "diameter": "R15"}))
            .into_query()
            .unwrap();
        assert_eq!(query.width, 185);
        assert_eq!(query.aspect_ratio, Some(65));
        assert_eq!(query.rim_diameter, Some(15));
        assert_eq!(query.category(), TireCategory::Car);
        assert_eq!(query.result_limit, DEFAULT_RESULT_LIMIT);
        assert!(!query.exact_mode);
    }

    #[test]
    fn test_missing_width_is_rejected() {
        let err = request(json!({"aspect_ratio": 70, "rim_diameter": 13}))
            .into_query()
            .unwrap_err();
        assert!(matches!(err, TireSearchError::MissingField { ref field } if field == "width"));

        let err = request(json!({"width": 0})).into_query().unwrap_err();
        assert!(matches!(err, TireSearchError::MissingField { .. }));
    }

    #[test]
    fn test_non_numeric_measures_are_rejected() {
        let err = request(json!({"width": "abc"})).into_query().unwrap_err();
        assert!(matches!(err, TireSearchError::InvalidField { ref field, .. } if field == "width"));

        let err = request(json!({"width": 185, "rim_diameter": "15|.*"}))
            .into_query()
            .unwrap_err();
        assert!(matches!(err, TireSearchError::InvalidField { ref field, .. } if field == "rim_diameter"));
    }

    #[test]
    fn test_limit_clamping() {
        assert_eq!(clamp_result_limit(None), 10);
        assert_eq!(clamp_result_limit(Some(&LooseNumber::Int(0))), 10);
        assert_eq!(clamp_result_limit(Some(&LooseNumber::Int(500))), 100);
        assert_eq!(clamp_result_limit(Some(&LooseNumber::Float(-3.0))), 1);
        assert_eq!(clamp_result_limit(Some(&"25".into())), 25);
        assert_eq!(clamp_result_limit(Some(&"lots".into())), 10);
        assert_eq!(MatchQuery::new(155).with_limit(0).result_limit, 1);
    }

    #[test]
    fn test_truck_query_without_aspect_ratio() {
        let query = MatchQuery::new(1100).with_rim_diameter(22);
        assert_eq!(query.category(), TireCategory::Truck);
        assert_eq!(query.search_spec(), "1100R22");
        assert_eq!(query.search_text(), "1100 22");
    }

    #[test]
    fn test_search_spec_and_text() {
        let query = MatchQuery::new(155)
            .with_aspect_ratio(70)
            .with_rim_diameter(13)
            .with_brand(" MICHELIN ");
        assert_eq!(query.search_spec(), "155/70R13");
        assert_eq!(query.search_text(), "155 70 13 MICHELIN");
        assert!(query.is_fully_specified());

        assert_eq!(MatchQuery::new(185).with_aspect_ratio(65).search_spec(), "185/65");
        assert_eq!(MatchQuery::new(185).with_brand("   ").brand, None);
    }

    #[test]
    fn test_aspect_ratio_default() {
        let rules = AspectRatioDefault::builtin();
        let rule = &rules[0];

        let mut query = MatchQuery::new(205).with_rim_diameter(18);
        assert!(rule.apply(&mut query));
        assert_eq!(query.aspect_ratio, Some(70));
        assert_eq!(query.category(), TireCategory::Car);

        let mut explicit = MatchQuery::new(255).with_aspect_ratio(55).with_rim_diameter(18);
        assert!(!rule.apply(&mut explicit));
        assert_eq!(explicit.aspect_ratio, Some(55));

        let mut other = MatchQuery::new(215).with_rim_diameter(18);
        assert!(!rule.apply(&mut other));
    }
}
