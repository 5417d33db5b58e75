use serde::Serialize;

use crate::core::extractor::{self, ExtractionRule};
use crate::core::matcher::SpecificationMatcher;
use crate::core::query::{AspectRatioDefault, MatchMode, MatchQuery, TireSearchRequest};
use crate::domain::model::{Candidate, MatchResult, TireCategory, TireSpecification};
use crate::domain::ports::{Catalog, ProductSearch};
use crate::utils::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    pub input: String,
    pub parsed_specs: TireSpecification,
    pub is_parseable: bool,
    /// 命中的解析規則，無法解析時為 `null`
    pub rule: Option<ExtractionRule>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub search_type: TireCategory,
    pub search_spec: String,
    pub mode: MatchMode,
    /// 截斷前的符合筆數
    pub total_found: usize,
    pub results: Vec<MatchResult>,
    pub query: MatchQuery,
}

impl SearchOutcome {
    fn new(query: MatchQuery, mode: MatchMode, mut matched: Vec<MatchResult>) -> Self {
        let total_found = matched.len();
        matched.truncate(query.result_limit);
        Self {
            search_type: query.category(),
            search_spec: query.search_spec(),
            mode,
            total_found,
            results: matched,
            query,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiSearchOutcome {
    pub total_found: usize,
    pub car_tires: usize,
    pub truck_tires: usize,
    pub searches: Vec<SearchOutcome>,
}

pub struct TireSearchService<C: Catalog, S: ProductSearch> {
    catalog: C,
    search: S,
    matcher: SpecificationMatcher,
    aspect_ratio_defaults: Vec<AspectRatioDefault>,
}

impl<C: Catalog, S: ProductSearch> TireSearchService<C, S> {
    pub fn new(catalog: C, search: S, matcher: SpecificationMatcher) -> Self {
        Self {
            catalog,
            search,
            matcher,
            aspect_ratio_defaults: AspectRatioDefault::builtin(),
        }
    }

    pub fn with_aspect_ratio_defaults(mut self, defaults: Vec<AspectRatioDefault>) -> Self {
        self.aspect_ratio_defaults = defaults;
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn parse(&self, product_name: &str) -> ParseOutcome {
        let parsed_specs = extractor::extract(product_name);
        ParseOutcome {
            input: product_name.to_string(),
            is_parseable: parsed_specs.is_parseable(),
            rule: extractor::matched_rule(product_name),
            parsed_specs,
        }
    }

    pub fn reload_catalog(&self) -> Result<usize> {
        self.catalog.load()
    }

    /// 在價目表中依規格搜尋；每次都重新解析商品名稱
    pub fn search_catalog(&self, request: TireSearchRequest) -> Result<SearchOutcome> {
        let query = request.into_query()?;
        let mode = self.matcher.resolve_mode(&query);
        tracing::info!(
            "🔍 Tire search ({}): {} [{:?}]",
            query.category(),
            query.search_spec(),
            mode
        );

        let products = self.catalog.products();
        let candidates = products.iter().filter_map(|product| {
            let specs = extractor::extract(&product.name);
            specs.is_parseable().then(|| Candidate {
                product: product.product_ref(),
                price: product.price,
                specs,
            })
        });

        let matched = self.matcher.rank_candidates(&query, candidates);
        let outcome = SearchOutcome::new(query, mode, matched);
        tracing::info!("✅ Found {} tires for {}", outcome.total_found, outcome.search_spec);
        Ok(outcome)
    }

    fn prepare_external_query(&self, request: TireSearchRequest) -> Result<MatchQuery> {
        let mut query = request.into_query()?;
        if let Some(rule) = self
            .aspect_ratio_defaults
            .iter()
            .find(|rule| rule.applies_to(&query))
        {
            rule.apply(&mut query);
            tracing::debug!(
                "Applied default aspect ratio {} to {}",
                rule.aspect_ratio,
                query.search_spec()
            );
        }
        Ok(query)
    }

    async fn run_external(&self, query: MatchQuery) -> Result<SearchOutcome> {
        let text = query.search_text();
        let items = self.search.search(&text).await?;
        let mode = self.matcher.resolve_mode(&query);
        let matched = self.matcher.rank_external(&query, items)?;
        Ok(SearchOutcome::new(query, mode, matched))
    }

    /// 透過外部搜尋服務查詢，再以正規表達式過濾描述文字
    pub async fn search_external(&self, request: TireSearchRequest) -> Result<SearchOutcome> {
        let query = self.prepare_external_query(request)?;
        tracing::info!("🔍 External tire search: {}", query.search_spec());

        let outcome = self.run_external(query).await?;
        tracing::info!("✅ Found {} tires for {}", outcome.total_found, outcome.search_spec);
        Ok(outcome)
    }

    /// 依序搜尋多組規格。單一規格的外部呼叫失敗視為沒有結果，
    /// 但不合法的查詢條件仍直接回傳錯誤。
    pub async fn search_external_many(
        &self,
        requests: Vec<TireSearchRequest>,
    ) -> Result<MultiSearchOutcome> {
        let queries = requests
            .into_iter()
            .map(|request| self.prepare_external_query(request))
            .collect::<Result<Vec<_>>>()?;

        let mut searches = Vec::with_capacity(queries.len());
        for query in queries {
            let search_spec = query.search_spec();
            let outcome = match self.run_external(query.clone()).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(
                        retryable = e.is_retryable(),
                        "⚠️ External search for {} failed: {}",
                        search_spec,
                        e
                    );
                    let mode = self.matcher.resolve_mode(&query);
                    SearchOutcome::new(query, mode, Vec::new())
                }
            };
            tracing::info!("Found {} tires for {}", outcome.total_found, search_spec);
            searches.push(outcome);
        }

        let results = searches.iter().flat_map(|s| s.results.iter());
        let car_tires = results
            .clone()
            .filter(|r| r.specs.category == TireCategory::Car)
            .count();
        let truck_tires = results
            .filter(|r| r.specs.category == TireCategory::Truck)
            .count();

        Ok(MultiSearchOutcome {
            total_found: searches.iter().map(|s| s.total_found).sum(),
            car_tires,
            truck_tires,
            searches,
        })
    }
}
