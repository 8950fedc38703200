//! Per-connection subscription state: the query history, the last-known
//! result per query, and the aggregators this client has joined.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use tubepulse_common::{AggregatedResult, WsPayload, WsRequest};
use tubepulse_engine::{AggregatorHandle, AggregatorRegistry, Subscriber};

/// Most recent queries a client sees merged results for.
pub const HISTORY_LIMIT: usize = 5;

/// Bounded most-recent-first query history. Re-searching an existing entry
/// promotes it to the front without duplicating it; beyond the cap the oldest
/// entry is evicted.
#[derive(Debug, Default)]
pub struct SearchHistory {
    entries: Vec<String>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `query` to the front, returning the entry evicted by the cap, if
    /// any.
    pub fn promote(&mut self, query: &str) -> Option<String> {
        self.entries.retain(|q| q != query);
        self.entries.insert(0, query.to_string());
        if self.entries.len() > HISTORY_LIMIT {
            self.entries.pop()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// One client's subscription endpoint, independent of the transport. The
/// WebSocket layer feeds inbound text in and pushes the rebuilt payload out.
pub struct Session {
    id: Uuid,
    history: SearchHistory,
    results: HashMap<String, AggregatedResult>,
    joined: HashMap<String, AggregatorHandle>,
    result_tx: mpsc::UnboundedSender<AggregatedResult>,
}

impl Session {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AggregatedResult>) {
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        (
            Self {
                id: Uuid::new_v4(),
                history: SearchHistory::new(),
                results: HashMap::new(),
                joined: HashMap::new(),
                result_tx,
            },
            result_rx,
        )
    }

    /// Handle one inbound message. Anything that is not a well-formed search
    /// request is ignored without a reply.
    pub async fn handle_message(&mut self, text: &str, registry: &AggregatorRegistry) {
        let Ok(request) = serde_json::from_str::<WsRequest>(text) else {
            debug!(session = %self.id, "Ignoring malformed message");
            return;
        };
        if request.action != "search" {
            debug!(session = %self.id, action = %request.action, "Ignoring unknown action");
            return;
        }
        let Some(query) = request.query else {
            return;
        };

        if let Some(evicted) = self.history.promote(&query) {
            self.results.remove(&evicted);
            if let Some(handle) = self.joined.remove(&evicted) {
                handle.unsubscribe(self.id);
            }
        }

        let handle = registry.get_or_create(&query).await;
        handle.subscribe(Subscriber {
            id: self.id,
            sender: self.result_tx.clone(),
        });
        self.joined.insert(query, handle);
    }

    /// Record a broadcast result and rebuild the outbound payload: results
    /// for the history's queries in history order, skipping queries that have
    /// not completed a run yet.
    pub fn apply_result(&mut self, result: AggregatedResult) -> WsPayload {
        self.results.insert(result.query.clone(), result);
        WsPayload {
            responses: self
                .history
                .iter()
                .filter_map(|q| self.results.get(q).cloned())
                .collect(),
        }
    }

    /// Unsubscribe from every joined aggregator. Called on disconnect so the
    /// subscriber reference does not leak.
    pub fn leave_all(&mut self) {
        for (query, handle) in self.joined.drain() {
            debug!(session = %self.id, query = %query, "Unsubscribing on disconnect");
            handle.unsubscribe(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubepulse_common::Sentiment;

    fn result_for(query: &str) -> AggregatedResult {
        AggregatedResult {
            query: query.to_string(),
            items: Vec::new(),
            grade_level_avg: 0.0,
            reading_score_avg: 0.0,
            sentiment: Sentiment::Neutral,
        }
    }

    #[test]
    fn history_keeps_five_most_recent() {
        let mut history = SearchHistory::new();
        for q in ["a", "b", "c", "d", "e"] {
            assert_eq!(history.promote(q), None);
        }
        // The sixth query evicts the oldest.
        assert_eq!(history.promote("f").as_deref(), Some("a"));
        assert_eq!(history.len(), HISTORY_LIMIT);
        let entries: Vec<&str> = history.iter().collect();
        assert_eq!(entries, vec!["f", "e", "d", "c", "b"]);
    }

    #[test]
    fn repeat_search_promotes_without_duplicating() {
        let mut history = SearchHistory::new();
        for q in ["a", "b", "c"] {
            history.promote(q);
        }
        assert_eq!(history.promote("a"), None);
        let entries: Vec<&str> = history.iter().collect();
        assert_eq!(entries, vec!["a", "c", "b"]);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn payload_follows_history_order_and_skips_pending() {
        let (mut session, _rx) = Session::new();
        session.history.promote("first");
        session.history.promote("second");
        session.history.promote("third");

        // Only "first" and "third" have completed runs.
        session.apply_result(result_for("first"));
        let payload = session.apply_result(result_for("third"));

        let queries: Vec<&str> = payload.responses.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, vec!["third", "first"]);
    }

    #[test]
    fn newer_result_overwrites_older() {
        let (mut session, _rx) = Session::new();
        session.history.promote("q");

        session.apply_result(result_for("q"));
        let mut updated = result_for("q");
        updated.grade_level_avg = 4.2;
        let payload = session.apply_result(updated);

        assert_eq!(payload.responses.len(), 1);
        assert_eq!(payload.responses[0].grade_level_avg, 4.2);
    }
}
