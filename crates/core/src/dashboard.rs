//! Library statistics

use std::collections::BTreeMap;

use serde::Serialize;

use crate::filters;
use crate::prompt::Prompt;

/// How many categories and tags the overview lists
pub const TOP_N: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_prompts:   usize,
    pub category_counts: BTreeMap<String, usize>,
    pub tag_counts:      BTreeMap<String, usize>,
}

/// One row of a top-N list, with the deep link into the filtered list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranked {
    pub name:  String,
    pub count: usize,
    pub link:  String,
}

impl DashboardStats {
    pub fn from_prompts(prompts: &[Prompt]) -> Self {
        let mut stats = DashboardStats {
            total_prompts: prompts.len(),
            ..Default::default()
        };
        for prompt in prompts {
            *stats
                .category_counts
                .entry(prompt.category.to_string())
                .or_default() += 1;
            for tag in prompt.tags.iter() {
                *stats.tag_counts.entry(tag.to_string()).or_default() += 1;
            }
        }
        stats
    }

    /// Mean tags per prompt, 0 for an empty library
    pub fn average_tags(&self) -> f64 {
        if self.total_prompts == 0 {
            return 0.0;
        }
        self.tag_counts.values().sum::<usize>() as f64 / self.total_prompts as f64
    }

    pub fn top_categories(&self, n: usize) -> Vec<Ranked> {
        top(&self.category_counts, n, filters::category_link)
    }

    pub fn top_tags(&self, n: usize) -> Vec<Ranked> {
        top(&self.tag_counts, n, filters::tag_link)
    }
}

/// Highest counts first; equal counts keep name order
fn top(counts: &BTreeMap<String, usize>, n: usize, link: fn(&str) -> String) -> Vec<Ranked> {
    let mut ranked: Vec<_> = counts.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1));
    ranked
        .into_iter()
        .take(n)
        .map(|(name, count)| Ranked {
            name:  name.clone(),
            count: *count,
            link:  link(name),
        })
        .collect()
}
