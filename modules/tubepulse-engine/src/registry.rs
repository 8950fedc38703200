//! Query-to-aggregator registry: one aggregator task per distinct query.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use tubepulse_common::{Config, WordCount};

use crate::aggregator::{self, AggregatorHandle, AggregatorSettings, WordStatsTable};
use crate::detail::{DetailFetcher, VideoApi};

/// Maps query strings (exact match, no normalization) to their aggregator
/// handles, and owns the state shared across aggregators: the detail cache
/// and the word-stats table.
///
/// Entries are never evicted; an idle aggregator skips work on every tick,
/// so a stale query costs memory but no API quota.
pub struct AggregatorRegistry {
    api: Arc<dyn VideoApi>,
    fetcher: Arc<DetailFetcher>,
    word_stats_table: WordStatsTable,
    settings: AggregatorSettings,
    aggregators: Mutex<HashMap<String, AggregatorHandle>>,
}

impl AggregatorRegistry {
    pub fn new(api: Arc<dyn VideoApi>, config: &Config) -> Self {
        let fetcher = Arc::new(DetailFetcher::new(
            Arc::clone(&api),
            config.detail_cache_ttl,
            config.detail_fetch_timeout,
        ));
        Self {
            api,
            fetcher,
            word_stats_table: Arc::new(Mutex::new(HashMap::new())),
            settings: AggregatorSettings::from_config(config),
            aggregators: Mutex::new(HashMap::new()),
        }
    }

    /// Look up the aggregator for a query, creating it on first use. A handle
    /// whose task has died is replaced with a fresh one (fresh subscriber
    /// set); other queries are unaffected.
    pub async fn get_or_create(&self, query: &str) -> AggregatorHandle {
        let mut aggregators = self.aggregators.lock().await;
        if let Some(handle) = aggregators.get(query) {
            if !handle.is_closed() {
                return handle.clone();
            }
            info!(query, "Aggregator task gone, respawning");
        }
        let handle = aggregator::spawn(
            query.to_string(),
            Arc::clone(&self.api),
            Arc::clone(&self.fetcher),
            Arc::clone(&self.word_stats_table),
            self.settings.clone(),
        );
        aggregators.insert(query.to_string(), handle.clone());
        handle
    }

    /// Word-frequency table for a query, if at least one run has stored one.
    pub async fn word_stats(&self, query: &str) -> Option<Vec<WordCount>> {
        self.word_stats_table.lock().await.get(query).cloned()
    }

    /// The shared detail fetcher, reused by the synchronous search path so
    /// both paths hit the same TTL cache.
    pub fn fetcher(&self) -> &Arc<DetailFetcher> {
        &self.fetcher
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }
}
