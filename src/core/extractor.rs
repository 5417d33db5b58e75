//! Turns free-text product names into [`TireSpecification`]s.
//!
//! Names are tried against an ordered rule table and the first rule that
//! matches wins. The anchored space-separated rules run before the slash
//! notations so that truck sizes such as `1100 R22` are never read as car
//! sizes, and digit counts are fixed so load ratings and part numbers in the
//! rest of the name are not picked up.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::domain::model::{TireCategory, TireSpecification};
use crate::utils::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionRule {
    /// `155 70 13 ...`
    CarSpaced,
    /// `175 65 R14 ...`
    CarSpacedWithR,
    /// `1100 R22 ...`
    TruckWithR,
    /// `185/65-15`, `185/65R15`
    SlashDashOrR,
    /// `185/60 R15`
    SlashSpaceR,
    /// `185/60R 15`, `185/6015`, ...
    SlashFlexible,
}

impl ExtractionRule {
    pub const ORDERED: [ExtractionRule; 6] = [
        ExtractionRule::CarSpaced,
        ExtractionRule::CarSpacedWithR,
        ExtractionRule::TruckWithR,
        ExtractionRule::SlashDashOrR,
        ExtractionRule::SlashSpaceR,
        ExtractionRule::SlashFlexible,
    ];

    fn pattern(self) -> &'static str {
        match self {
            ExtractionRule::CarSpaced => r"^([0-9]{3})\s+([0-9]{2})\s+([0-9]{2})\s",
            ExtractionRule::CarSpacedWithR => r"^([0-9]{3})\s+([0-9]{2})\s+R([0-9]{2})\s",
            ExtractionRule::TruckWithR => r"^([0-9]{3,4})\s+R([0-9]{2})\s",
            ExtractionRule::SlashDashOrR => r"([0-9]{3})/([0-9]{2})[-R]([0-9]{2})",
            ExtractionRule::SlashSpaceR => r"([0-9]{3})/([0-9]{2})\s+R([0-9]{2})",
            ExtractionRule::SlashFlexible => r"([0-9]{3})/([0-9]{2})\s*R?\s*([0-9]{2})",
        }
    }

    pub fn category(self) -> TireCategory {
        match self {
            ExtractionRule::TruckWithR => TireCategory::Truck,
            _ => TireCategory::Car,
        }
    }

    fn build(self, caps: &Captures<'_>, original: &str) -> Option<TireSpecification> {
        let width = capture_number(caps, 1)?;
        let spec = match self.category() {
            TireCategory::Truck => {
                TireSpecification::truck(width, capture_number(caps, 2)?, original)
            }
            _ => TireSpecification::car(
                width,
                Some(capture_number(caps, 2)?),
                capture_number(caps, 3)?,
                original,
            ),
        };
        Some(spec)
    }
}

fn capture_number(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

pub struct SpecificationExtractor {
    rules: Vec<(ExtractionRule, Regex)>,
}

impl SpecificationExtractor {
    pub fn new() -> Result<Self> {
        let rules = ExtractionRule::ORDERED
            .iter()
            .map(|rule| Ok((*rule, Regex::new(rule.pattern())?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// 回傳第一個符合的規則與解析結果
    pub fn extract_with_rule(&self, product_name: &str) -> Option<(ExtractionRule, TireSpecification)> {
        let name = product_name.trim();
        self.rules.iter().find_map(|(rule, regex)| {
            let caps = regex.captures(name)?;
            rule.build(&caps, name).map(|spec| (*rule, spec))
        })
    }

    pub fn extract(&self, product_name: &str) -> TireSpecification {
        match self.extract_with_rule(product_name) {
            Some((rule, spec)) => {
                tracing::trace!(?rule, %spec, "parsed tire specification");
                spec
            }
            None => TireSpecification::unparseable(product_name.trim()),
        }
    }
}

static DEFAULT_EXTRACTOR: Lazy<SpecificationExtractor> = Lazy::new(|| {
    SpecificationExtractor::new().expect("built-in tire patterns are valid")
});

pub fn extract(product_name: &str) -> TireSpecification {
    DEFAULT_EXTRACTOR.extract(product_name)
}

pub fn matched_rule(product_name: &str) -> Option<ExtractionRule> {
    DEFAULT_EXTRACTOR
        .extract_with_rule(product_name)
        .map(|(rule, _)| rule)
}
