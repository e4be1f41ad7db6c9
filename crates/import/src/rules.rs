use khata_core::{Categorization, Money, TransactionType};
use regex::{RegexSet, RegexSetBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::default_rules;

const FALLBACK_CONFIDENCE: f32 = 0.3;
const MAX_RULE_CONFIDENCE: f32 = 0.9;
const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmountRange {
    #[serde(default)]
    pub min: Option<Decimal>,
    #[serde(default)]
    pub max: Option<Decimal>,
}

impl AmountRange {
    pub fn contains(&self, amount: Decimal) -> bool {
        self.min.map_or(true, |min| amount >= min) && self.max.map_or(true, |max| amount <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRule {
    pub category: String,
    pub subcategory: String,
    pub keywords: Vec<String>,
    pub priority: u32,
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub amount_range: Option<AmountRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRule {
    pub vendor: String,
    pub category: String,
    pub subcategory: String,
    pub keywords: Vec<String>,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category: String,
    pub subcategories: Vec<String>,
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Failed to parse rule table: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to compile keywords: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Invalid rule '{rule}': {reason}")]
    Invalid { rule: String, reason: String },
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default, rename = "category")]
    categories: Vec<CategoryRule>,
    #[serde(default, rename = "vendor")]
    vendors: Vec<VendorRule>,
}

/// Every keyword of every rule compiled into one case-insensitive literal
/// set. `owners[i]` is the rule that contributed pattern `i`.
#[derive(Debug)]
struct KeywordIndex {
    set: RegexSet,
    owners: Vec<usize>,
}

impl KeywordIndex {
    fn build<'a>(keyword_lists: impl Iterator<Item = &'a [String]>) -> Result<Self, regex::Error> {
        let mut patterns = Vec::new();
        let mut owners = Vec::new();
        for (rule, keywords) in keyword_lists.enumerate() {
            for keyword in keywords {
                patterns.push(regex::escape(keyword));
                owners.push(rule);
            }
        }
        let set = RegexSetBuilder::new(patterns)
            .case_insensitive(true)
            .build()?;
        Ok(Self { set, owners })
    }

    /// Number of matched keywords per rule.
    fn hits(&self, text: &str, rule_count: usize) -> Vec<u32> {
        let mut counts = vec![0; rule_count];
        for pattern in self.set.matches(text).iter() {
            counts[self.owners[pattern]] += 1;
        }
        counts
    }

    fn first_rule_hit(&self, text: &str) -> Option<usize> {
        self.set
            .matches(text)
            .iter()
            .map(|pattern| self.owners[pattern])
            .min()
    }
}

/// Keyword-scoring categorizer. Vendor rules are consulted first in
/// declaration order, then category rules are scored by
/// `priority * matched keywords`.
#[derive(Debug)]
pub struct Categorizer {
    category_rules: Vec<CategoryRule>,
    vendor_rules: Vec<VendorRule>,
    category_index: KeywordIndex,
    vendor_index: KeywordIndex,
}

impl Categorizer {
    pub fn new(
        category_rules: Vec<CategoryRule>,
        vendor_rules: Vec<VendorRule>,
    ) -> Result<Self, RuleError> {
        for rule in &vendor_rules {
            if !(0.0..=1.0).contains(&rule.confidence) {
                return Err(RuleError::Invalid {
                    rule: rule.vendor.clone(),
                    reason: format!("confidence {} outside [0, 1]", rule.confidence),
                });
            }
        }

        let category_index =
            KeywordIndex::build(category_rules.iter().map(|r| r.keywords.as_slice()))?;
        let vendor_index = KeywordIndex::build(vendor_rules.iter().map(|r| r.keywords.as_slice()))?;

        Ok(Self {
            category_rules,
            vendor_rules,
            category_index,
            vendor_index,
        })
    }

    /// Loads rule tables from TOML with `[[category]]` and `[[vendor]]`
    /// arrays. Either may be absent.
    pub fn from_toml(toml_content: &str) -> Result<Self, RuleError> {
        let file: RuleFile = toml::from_str(toml_content)?;
        Self::new(file.categories, file.vendors)
    }

    pub fn category_rules(&self) -> &[CategoryRule] {
        &self.category_rules
    }

    pub fn vendor_rules(&self) -> &[VendorRule] {
        &self.vendor_rules
    }

    pub fn categorize(
        &self,
        description: &str,
        amount: Money,
        transaction_type: TransactionType,
    ) -> Categorization {
        let text = description.trim();

        if let Some(i) = self.vendor_index.first_rule_hit(text) {
            let vendor = &self.vendor_rules[i];
            return Categorization {
                category: vendor.category.clone(),
                subcategory: vendor.subcategory.clone(),
                vendor: Some(vendor.vendor.clone()),
                confidence: vendor.confidence,
            };
        }

        let hits = self.category_index.hits(text, self.category_rules.len());
        let mut best: Option<(usize, u32)> = None;
        for (i, rule) in self.category_rules.iter().enumerate() {
            if rule.transaction_type.is_some_and(|t| t != transaction_type) {
                continue;
            }
            if let Some(range) = &rule.amount_range {
                if !range.contains(amount.as_decimal()) {
                    continue;
                }
            }
            if hits[i] == 0 {
                continue;
            }
            let score = rule.priority.saturating_mul(hits[i]);
            if score > best.map_or(0, |(_, top)| top) {
                best = Some((i, score));
            }
        }

        match best {
            Some((i, _)) => {
                let rule = &self.category_rules[i];
                let confidence = 0.5 + hits[i] as f32 * 0.1 + rule.priority as f32 * 0.05;
                Categorization {
                    category: rule.category.clone(),
                    subcategory: rule.subcategory.clone(),
                    vendor: None,
                    confidence: confidence.min(MAX_RULE_CONFIDENCE),
                }
            }
            None => fallback(transaction_type),
        }
    }

    /// Distinct categories in first-seen order, each with its sorted
    /// distinct subcategories.
    pub fn all_categories(&self) -> Vec<CategoryGroup> {
        let mut groups: Vec<(String, BTreeSet<String>)> = Vec::new();
        for rule in &self.category_rules {
            match groups.iter_mut().find(|(name, _)| *name == rule.category) {
                Some((_, subs)) => {
                    subs.insert(rule.subcategory.clone());
                }
                None => groups.push((
                    rule.category.clone(),
                    BTreeSet::from([rule.subcategory.clone()]),
                )),
            }
        }
        groups
            .into_iter()
            .map(|(category, subs)| CategoryGroup {
                category,
                subcategories: subs.into_iter().collect(),
            })
            .collect()
    }

    /// Up to five category suggestions for a partial description. Only
    /// category rules are consulted; type and amount filters do not apply.
    pub fn suggest(&self, partial: &str) -> Vec<Categorization> {
        let text = partial.trim();
        let hits = self.category_index.hits(text, self.category_rules.len());

        let mut suggestions: Vec<Categorization> = self
            .category_rules
            .iter()
            .zip(&hits)
            .filter(|(_, n)| **n > 0)
            .map(|(rule, n)| Categorization {
                category: rule.category.clone(),
                subcategory: rule.subcategory.clone(),
                vendor: None,
                confidence: (rule.priority.saturating_mul(*n) as f32 * 0.1).min(MAX_RULE_CONFIDENCE),
            })
            .collect();

        suggestions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        suggestions.truncate(MAX_SUGGESTIONS);
        suggestions
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(default_rules::category_rules(), default_rules::vendor_rules())
            .expect("built-in rule tables compile")
    }
}

fn fallback(transaction_type: TransactionType) -> Categorization {
    let (category, subcategory) = match transaction_type {
        TransactionType::Credit => ("Income", "Other Income"),
        TransactionType::Debit => ("Other", "Miscellaneous"),
    };
    Categorization {
        category: category.to_string(),
        subcategory: subcategory.to_string(),
        vendor: None,
        confidence: FALLBACK_CONFIDENCE,
    }
}
