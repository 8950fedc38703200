//! Per-query aggregation: the fetch, enrich, summarize, broadcast pipeline.
//!
//! Each distinct query string owns one long-lived task with a command
//! mailbox. The task is the single writer for that query's state: subscribe
//! and refresh triggers are processed serially, so two runs for the same
//! query can never interleave.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use tubepulse_common::{AggregatedResult, Config, Sentiment, VideoSummary, WordCount};

use crate::detail::{DetailFetcher, VideoApi};
use crate::{readability, sentiment, word_stats};

/// Cap on items in the outward payload. Averages and sentiment always cover
/// the full fetched set.
const MAX_PAYLOAD_ITEMS: usize = 10;

/// Word-frequency results keyed by query. Owned by the registry and shared
/// with every aggregator task.
pub type WordStatsTable = Arc<Mutex<HashMap<String, Vec<WordCount>>>>;

/// Tunables for aggregation runs, lifted out of [`Config`].
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    pub search_page_size: u32,
    pub refresh_interval: Duration,
    pub sentiment_timeout: Duration,
}

impl AggregatorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            search_page_size: config.search_page_size,
            refresh_interval: config.refresh_interval,
            sentiment_timeout: config.sentiment_timeout,
        }
    }
}

/// A registered recipient of broadcast results.
pub struct Subscriber {
    pub id: Uuid,
    pub sender: mpsc::UnboundedSender<AggregatedResult>,
}

enum Command {
    Subscribe(Subscriber),
    Unsubscribe(Uuid),
}

/// Handle to a query's aggregator task. Cloneable; all clones feed the same
/// mailbox.
#[derive(Clone)]
pub struct AggregatorHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl AggregatorHandle {
    /// Register a subscriber and kick off a run. Registering an id that is
    /// already present re-runs the search without duplicating the entry.
    pub fn subscribe(&self, subscriber: Subscriber) {
        let _ = self.tx.send(Command::Subscribe(subscriber));
    }

    pub fn unsubscribe(&self, id: Uuid) {
        let _ = self.tx.send(Command::Unsubscribe(id));
    }

    /// True if the task behind this handle is gone and the registry should
    /// replace it.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Spawn the aggregator task for a query and return its handle.
pub fn spawn(
    query: String,
    api: Arc<dyn VideoApi>,
    fetcher: Arc<DetailFetcher>,
    word_stats_table: WordStatsTable,
    settings: AggregatorSettings,
) -> AggregatorHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let aggregator = QueryAggregator {
        query,
        api,
        fetcher,
        word_stats_table,
        settings,
        subscribers: HashMap::new(),
        last_result: None,
    };
    tokio::spawn(aggregator.run_loop(rx));
    AggregatorHandle { tx }
}

struct QueryAggregator {
    query: String,
    api: Arc<dyn VideoApi>,
    fetcher: Arc<DetailFetcher>,
    word_stats_table: WordStatsTable,
    settings: AggregatorSettings,
    subscribers: HashMap<Uuid, mpsc::UnboundedSender<AggregatedResult>>,
    last_result: Option<AggregatedResult>,
}

impl QueryAggregator {
    async fn run_loop(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        info!(query = %self.query, "Aggregator started");
        let mut ticker = tokio::time::interval(self.settings.refresh_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The interval's first tick is immediate; with no subscribers yet it
        // falls through the quota guard.
        loop {
            tokio::select! {
                cmd = rx.recv() => {
                    let Some(cmd) = cmd else {
                        info!(query = %self.query, "All handles dropped, stopping aggregator");
                        break;
                    };
                    let mut kick = self.apply(cmd);
                    // Coalesce a burst of commands into one run.
                    while let Ok(cmd) = rx.try_recv() {
                        kick |= self.apply(cmd);
                    }
                    if kick && !self.subscribers.is_empty() {
                        self.run_aggregation().await;
                    }
                }
                _ = ticker.tick() => {
                    if !self.subscribers.is_empty() {
                        self.run_aggregation().await;
                    }
                }
            }
        }
    }

    /// Apply one command; returns whether it should trigger a run.
    fn apply(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Subscribe(subscriber) => {
                debug!(query = %self.query, id = %subscriber.id, "Subscriber registered");
                // Replay the cached result so a new subscriber has data
                // before the fresh run completes.
                if let Some(result) = &self.last_result {
                    let _ = subscriber.sender.send(result.clone());
                }
                self.subscribers.insert(subscriber.id, subscriber.sender);
                true
            }
            Command::Unsubscribe(id) => {
                debug!(query = %self.query, %id, "Subscriber removed");
                self.subscribers.remove(&id);
                false
            }
        }
    }

    /// One end-to-end aggregation run. Failures never escape: an upstream
    /// search error degrades to an empty result and everything else is
    /// absorbed per item, so the task and its subscriber set survive.
    async fn run_aggregation(&mut self) {
        let result = match aggregate_once(
            self.api.as_ref(),
            &self.fetcher,
            &self.query,
            self.settings.search_page_size,
            self.settings.sentiment_timeout,
        )
        .await
        {
            Ok((result, corpus)) => {
                // Word stats are off the critical path: stored into the shared
                // table whenever they finish, never awaited before the
                // broadcast. A failed run leaves the previous table entry.
                let table = Arc::clone(&self.word_stats_table);
                let query = self.query.clone();
                tokio::spawn(async move {
                    let stats = word_stats::compute(&corpus);
                    table.lock().await.insert(query, stats);
                });
                result
            }
            Err(e) => {
                warn!(query = %self.query, error = %e, "Search failed, broadcasting empty result");
                empty_result(&self.query)
            }
        };

        self.last_result = Some(result.clone());
        self.broadcast(result);
    }

    /// Fire-and-forget fan-out to every subscriber. A receiver that has gone
    /// away is dropped from the set; it cannot block the rest.
    fn broadcast(&mut self, result: AggregatedResult) {
        self.subscribers
            .retain(|id, sender| match sender.send(result.clone()) {
                Ok(()) => true,
                Err(_) => {
                    debug!(query = %result.query, %id, "Dropping disconnected subscriber");
                    false
                }
            });
    }
}

/// Execute one aggregation for a query and return the consolidated result
/// plus the full description corpus.
///
/// A search failure propagates to the caller (the synchronous HTTP path maps
/// it to a 5xx); per-item detail failures degrade to absent descriptions and
/// are excluded from the averages and the sentiment corpus.
pub async fn aggregate_once(
    api: &dyn VideoApi,
    fetcher: &DetailFetcher,
    query: &str,
    page_size: u32,
    sentiment_timeout: Duration,
) -> youtube_client::Result<(AggregatedResult, Vec<String>)> {
    let search = api.search(query, page_size).await?;

    // Fan out one detail-fetch-and-enrich chain per result, then barrier on
    // all of them. Order of the output follows the search response.
    let chains = search.items.iter().filter_map(|item| {
        let video_id = item.video_id()?.to_string();
        let channel_id = item.channel_id().map(str::to_string);
        let snippet = item.snippet.clone();
        Some(async move {
            let description = fetcher.fetch_description(&video_id).await;
            let (grade_level, reading_score) = match &description {
                Some(text) => (readability::grade_level(text), readability::reading_score(text)),
                None => (0.0, 0.0),
            };
            let snippet = snippet.unwrap_or_default();
            let summary = VideoSummary {
                video_id,
                channel_id,
                title: snippet.title,
                description: description.clone().unwrap_or_default(),
                channel_title: snippet.channel_title,
                published_at: snippet.published_at,
                thumbnail_url: snippet
                    .thumbnails
                    .and_then(|t| t.default)
                    .and_then(|t| t.url),
                grade_level,
                reading_score,
            };
            (summary, description)
        })
    });
    let enriched: Vec<(VideoSummary, Option<String>)> = join_all(chains).await;

    let mut grades = Vec::new();
    let mut scores = Vec::new();
    let mut corpus = Vec::new();
    for (summary, description) in &enriched {
        if let Some(text) = description {
            grades.push(summary.grade_level);
            scores.push(summary.reading_score);
            corpus.push(text.clone());
        }
    }

    let grade_level_avg = mean(&grades);
    let reading_score_avg = mean(&scores);

    let sentiment = aggregate_sentiment(corpus.clone(), sentiment_timeout).await;

    let items: Vec<VideoSummary> = enriched
        .into_iter()
        .map(|(summary, _)| summary)
        .take(MAX_PAYLOAD_ITEMS)
        .collect();

    let result = AggregatedResult {
        query: query.to_string(),
        items,
        grade_level_avg,
        reading_score_avg,
        sentiment,
    };
    Ok((result, corpus))
}

/// Sentiment aggregation bounded by a timeout; falls back to neutral rather
/// than stalling the broadcast.
async fn aggregate_sentiment(corpus: Vec<String>, timeout: Duration) -> Sentiment {
    let task = tokio::task::spawn_blocking(move || sentiment::aggregate(&corpus));
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(sentiment)) => sentiment,
        Ok(Err(e)) => {
            warn!(error = %e, "Sentiment aggregation failed, falling back to neutral");
            Sentiment::Neutral
        }
        Err(_) => {
            warn!("Sentiment aggregation timed out, falling back to neutral");
            Sentiment::Neutral
        }
    }
}

fn empty_result(query: &str) -> AggregatedResult {
    AggregatedResult {
        query: query.to_string(),
        items: Vec::new(),
        grade_level_avg: 0.0,
        reading_score_avg: 0.0,
        sentiment: Sentiment::Neutral,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
