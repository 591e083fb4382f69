use serde::{Deserialize, Serialize};

use crate::file_processor::{percentage, BotCounts, FileStats, TopBot};

/// Cross-file totals. Built by folding in per-file stats; every operation is
/// a sum, so merge order never changes the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_requests: u64,
    pub bot_requests: u64,
    pub files_processed: usize,
    pub files_failed: usize,
    pub bot_counts: BotCounts,
}

impl GlobalStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's results in.
    pub fn merge_file(&mut self, stats: &FileStats) {
        self.files_processed += 1;
        if stats.is_failed() {
            self.files_failed += 1;
        }
        self.total_requests += stats.total_requests;
        self.bot_requests += stats.bot_requests;
        merge_counts(&mut self.bot_counts, &stats.bot_counts);
    }

    /// Combine two partial aggregates.
    pub fn merge(&mut self, other: &GlobalStats) {
        self.files_processed += other.files_processed;
        self.files_failed += other.files_failed;
        self.total_requests += other.total_requests;
        self.bot_requests += other.bot_requests;
        merge_counts(&mut self.bot_counts, &other.bot_counts);
    }

    pub fn from_files<'a, I>(files: I) -> Self
    where
        I: IntoIterator<Item = &'a FileStats>,
    {
        files.into_iter().fold(Self::new(), |mut acc, stats| {
            acc.merge_file(stats);
            acc
        })
    }

    pub fn bot_percentage(&self) -> f64 {
        percentage(self.bot_requests, self.total_requests)
    }

    pub fn unique_bot_count(&self) -> usize {
        self.bot_counts.len()
    }

    pub fn get_count(&self, user_agent: &str) -> u64 {
        self.bot_counts.get(user_agent).copied().unwrap_or(0)
    }

    /// Highest-count user-agents; ties ordered lexically.
    pub fn top_bots(&self, limit: usize) -> Vec<TopBot> {
        let mut ranked: Vec<TopBot> = self
            .bot_counts
            .iter()
            .map(|(ua, &count)| TopBot {
                user_agent: ua.clone(),
                count,
            })
            .collect();
        ranked.sort_unstable_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.user_agent.cmp(&b.user_agent))
        });
        ranked.truncate(limit);
        ranked
    }
}

fn merge_counts(into: &mut BotCounts, from: &BotCounts) {
    for (user_agent, &count) in from {
        *into.entry(user_agent.clone()).or_insert(0) += count;
    }
}
