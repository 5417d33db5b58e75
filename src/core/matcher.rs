//! Matches tire specifications against a query and ranks the survivors by
//! price.

use serde::{Deserialize, Serialize};

use crate::core::query::{MatchMode, MatchQuery};
use crate::core::relevance::build_relevance_pattern;
use crate::domain::model::{Candidate, ExternalProduct, MatchResult, TireCategory, TireSpecification};
use crate::utils::error::Result;

pub const DEFAULT_ASPECT_RATIO_TOLERANCE: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherSettings {
    /// 非精確模式下扁平比可接受的差距
    pub aspect_ratio_tolerance: u32,
    /// 扁平比與輪圈直徑皆提供時自動改用精確模式
    pub auto_exact_when_complete: bool,
    /// 外部搜尋結果價格必須大於 0；預設關閉，無價格的項目以 0 排在最前面
    pub require_positive_price: bool,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            aspect_ratio_tolerance: DEFAULT_ASPECT_RATIO_TOLERANCE,
            auto_exact_when_complete: true,
            require_positive_price: false,
        }
    }
}

impl MatcherSettings {
    pub fn resolve_mode(&self, query: &MatchQuery) -> MatchMode {
        if query.exact_mode || (self.auto_exact_when_complete && query.is_fully_specified()) {
            MatchMode::Exact
        } else {
            MatchMode::Tolerant
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpecificationMatcher {
    settings: MatcherSettings,
}

impl SpecificationMatcher {
    pub fn new(settings: MatcherSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MatcherSettings {
        &self.settings
    }

    pub fn resolve_mode(&self, query: &MatchQuery) -> MatchMode {
        self.settings.resolve_mode(query)
    }

    pub fn matches(&self, query: &MatchQuery, mode: MatchMode, spec: &TireSpecification) -> bool {
        if spec.width != Some(query.width) {
            return false;
        }

        let rim_matches = |required: bool| match query.rim_diameter {
            Some(rim) => spec.rim_diameter == Some(rim),
            None => !required,
        };

        match query.category() {
            TireCategory::Car => match mode {
                // 精確模式下沒有輪圈直徑可比對，視為不符
                MatchMode::Exact => spec.aspect_ratio == query.aspect_ratio && rim_matches(true),
                MatchMode::Tolerant => {
                    let aspect_matches = match (query.aspect_ratio, spec.aspect_ratio) {
                        (None, _) => true,
                        (Some(wanted), Some(actual)) => {
                            wanted.abs_diff(actual) <= self.settings.aspect_ratio_tolerance
                        }
                        (Some(_), None) => false,
                    };
                    aspect_matches && rim_matches(false)
                }
            },
            _ => rim_matches(false),
        }
    }

    /// 所有符合的候選項，依價格由低到高排序（價格相同時保留原順序）
    pub fn rank_candidates<I>(&self, query: &MatchQuery, candidates: I) -> Vec<MatchResult>
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mode = self.resolve_mode(query);
        let mut matched: Vec<MatchResult> = candidates
            .into_iter()
            .filter(|candidate| candidate.specs.is_parseable())
            .filter(|candidate| self.matches(query, mode, &candidate.specs))
            .map(MatchResult::from)
            .collect();
        matched.sort_by_key(|result| result.price);

        tracing::debug!(
            "🔍 {} ({:?}) matched {} candidates",
            query.search_spec(),
            mode,
            matched.len()
        );
        matched
    }

    pub fn match_candidates<I>(&self, query: &MatchQuery, candidates: I) -> Vec<MatchResult>
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut matched = self.rank_candidates(query, candidates);
        matched.truncate(query.result_limit);
        matched
    }

    /// 外部來源的候選項沒有結構化規格，改用描述文字的正規表達式過濾，
    /// 並要求有庫存。這是盡力而為的過濾，不保證與精確比對一致。
    pub fn rank_external<I>(&self, query: &MatchQuery, candidates: I) -> Result<Vec<MatchResult>>
    where
        I: IntoIterator<Item = ExternalProduct>,
    {
        let pattern = build_relevance_pattern(query)?;
        let category = query.category();

        let mut matched: Vec<MatchResult> = candidates
            .into_iter()
            .filter(|item| item.in_stock() && pattern.is_match(&item.descripcion))
            .filter_map(|item| {
                let price = item.price().unwrap_or(0);
                if self.settings.require_positive_price && price <= 0 {
                    tracing::warn!(
                        "⚠️ Dropping external item {} ({}): price {} is not positive",
                        item.id(),
                        item.descripcion,
                        price
                    );
                    return None;
                }
                Some(MatchResult {
                    product: item.product_ref(),
                    price,
                    specs: TireSpecification {
                        width: Some(query.width),
                        aspect_ratio: query.aspect_ratio,
                        rim_diameter: query.rim_diameter,
                        category,
                        original_text: item.descripcion,
                    },
                })
            })
            .collect();
        matched.sort_by_key(|result| result.price);

        tracing::debug!(
            "🔍 {} matched {} external candidates with /{}/",
            query.search_spec(),
            matched.len(),
            pattern.as_str()
        );
        Ok(matched)
    }

    pub fn match_external<I>(&self, query: &MatchQuery, candidates: I) -> Result<Vec<MatchResult>>
    where
        I: IntoIterator<Item = ExternalProduct>,
    {
        let mut matched = self.rank_external(query, candidates)?;
        matched.truncate(query.result_limit);
        Ok(matched)
    }
}
