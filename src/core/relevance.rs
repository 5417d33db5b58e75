//! Relevance filter for candidates coming from the external search service.
//!
//! The external service returns free-text descriptions in many formats
//! (`185/65R15`, `185 65 R15`, `225/45ZRF17`, ...), so instead of running the
//! extractor over each one a single pattern is built from the query.

use regex::Regex;

use crate::core::query::MatchQuery;
use crate::utils::error::Result;

/// 由查詢條件建立比對描述文字的正規表達式（不分大小寫）。
/// 數值欄位在建立 `MatchQuery` 時已驗證為整數，不會產生不合法的樣式。
pub fn build_relevance_pattern(query: &MatchQuery) -> Result<Regex> {
    let mut pattern = format!("(?i){}", query.width);
    if let Some(ratio) = query.aspect_ratio {
        pattern.push_str(&format!(r"[/\s]*{}", ratio));
    }
    pattern.push_str(r"[/\s]*Z?R?F?");
    if let Some(rim) = query.rim_diameter {
        pattern.push_str(&rim.to_string());
    }
    Ok(Regex::new(&pattern)?)
}
