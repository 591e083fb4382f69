//! Coarse traffic classes over the aggregated bot counts.
//!
//! Categories are independent tallies: a user-agent matching two category
//! pattern sets counts toward both.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::aggregator::GlobalStats;
use crate::bot_classifier::PatternMatcher;
use crate::file_processor::percentage;
use crate::pattern_config::{CategoryDefinition, PatternConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category_name: String,
    pub total_hits: u64,
    pub percentage_of_bot_traffic: f64,
}

#[derive(Debug, Clone)]
struct Category {
    name: String,
    matcher: PatternMatcher,
}

#[derive(Debug, Clone)]
pub struct Categorizer {
    categories: Vec<Category>,
}

impl Categorizer {
    pub fn new(definitions: &[CategoryDefinition]) -> Result<Self> {
        let categories = definitions
            .iter()
            .map(|def| {
                let matcher = PatternMatcher::new(def.patterns.as_slice())
                    .with_context(|| format!("Invalid patterns for category '{}'", def.name))?;
                Ok(Category {
                    name: def.name.clone(),
                    matcher,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { categories })
    }

    pub fn from_config(config: &PatternConfig) -> Result<Self> {
        Self::new(&config.categories)
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// One entry per configured category, in configuration order.
    pub fn categorize(&self, global: &GlobalStats) -> Vec<CategoryStats> {
        let mut totals = vec![0u64; self.categories.len()];

        for (user_agent, &count) in &global.bot_counts {
            for (total, category) in totals.iter_mut().zip(&self.categories) {
                if category.matcher.is_match(user_agent) {
                    *total += count;
                }
            }
        }

        self.categories
            .iter()
            .zip(totals)
            .map(|(category, total_hits)| CategoryStats {
                category_name: category.name.clone(),
                total_hits,
                percentage_of_bot_traffic: percentage(total_hits, global.bot_requests),
            })
            .collect()
    }
}
