//! The upstream video API seam and the cached per-video detail fetcher.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use youtube_client::{SearchListResponse, VideoListResponse, YoutubeClient};

/// The upstream collaborator as the engine sees it. Production uses
/// [`YoutubeClient`]; tests substitute a mock.
#[async_trait]
pub trait VideoApi: Send + Sync {
    async fn search(&self, query: &str, max_results: u32)
        -> youtube_client::Result<SearchListResponse>;

    async fn video_details(&self, video_id: &str) -> youtube_client::Result<VideoListResponse>;
}

#[async_trait]
impl VideoApi for YoutubeClient {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> youtube_client::Result<SearchListResponse> {
        self.search_videos(query, max_results).await
    }

    async fn video_details(&self, video_id: &str) -> youtube_client::Result<VideoListResponse> {
        YoutubeClient::video_details(self, video_id).await
    }
}

/// Fetches full video descriptions through a TTL cache.
///
/// Failure policy: a non-success upstream status, transport error, or timeout
/// yields `None` — the caller tolerates missing descriptions per item and the
/// batch proceeds.
pub struct DetailFetcher {
    api: Arc<dyn VideoApi>,
    cache: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    fetch_timeout: Duration,
}

struct CacheEntry {
    stored_at: Instant,
    description: String,
}

impl DetailFetcher {
    pub fn new(api: Arc<dyn VideoApi>, ttl: Duration, fetch_timeout: Duration) -> Self {
        Self {
            api,
            cache: Mutex::new(HashMap::new()),
            ttl,
            fetch_timeout,
        }
    }

    /// Fetch a video's full description, consulting the cache first.
    pub async fn fetch_description(&self, video_id: &str) -> Option<String> {
        {
            let mut cache = self.cache.lock().await;
            match cache.get(video_id) {
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    debug!(video_id, "Detail cache hit");
                    return Some(entry.description.clone());
                }
                Some(_) => {
                    cache.remove(video_id);
                }
                None => {}
            }
        }

        let fetch = self.api.video_details(video_id);
        let result = match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => {
                warn!(video_id, "Detail fetch timed out");
                return None;
            }
        };

        let list = match result {
            Ok(list) => list,
            Err(e) => {
                warn!(video_id, error = %e, "Detail fetch failed");
                return None;
            }
        };

        let description = list
            .items
            .first()
            .and_then(|v| v.description())
            .map(str::to_string)?;

        let mut cache = self.cache.lock().await;
        cache.insert(
            video_id.to_string(),
            CacheEntry {
                stored_at: Instant::now(),
                description: description.clone(),
            },
        );
        Some(description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use youtube_client::types::{Snippet, Video};
    use youtube_client::YoutubeError;

    struct CountingApi {
        detail_calls: AtomicUsize,
        fail: bool,
    }

    impl CountingApi {
        fn new(fail: bool) -> Self {
            Self {
                detail_calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl VideoApi for CountingApi {
        async fn search(
            &self,
            _query: &str,
            _max_results: u32,
        ) -> youtube_client::Result<SearchListResponse> {
            Ok(SearchListResponse { items: vec![] })
        }

        async fn video_details(
            &self,
            video_id: &str,
        ) -> youtube_client::Result<VideoListResponse> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(YoutubeError::Api {
                    status: 403,
                    message: "quota".to_string(),
                });
            }
            Ok(VideoListResponse {
                items: vec![Video {
                    id: Some(video_id.to_string()),
                    snippet: Some(Snippet {
                        channel_id: None,
                        title: None,
                        description: Some(format!("description of {video_id}")),
                        channel_title: None,
                        published_at: None,
                        thumbnails: None,
                    }),
                    statistics: None,
                }],
            })
        }
    }

    #[tokio::test]
    async fn cache_hit_skips_network_call() {
        let api = Arc::new(CountingApi::new(false));
        let fetcher = DetailFetcher::new(
            api.clone(),
            Duration::from_secs(3600),
            Duration::from_secs(5),
        );

        let first = fetcher.fetch_description("v1").await;
        let second = fetcher.fetch_description("v1").await;
        assert_eq!(first.as_deref(), Some("description of v1"));
        assert_eq!(first, second);
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entry_refetches() {
        let api = Arc::new(CountingApi::new(false));
        let fetcher = DetailFetcher::new(api.clone(), Duration::ZERO, Duration::from_secs(5));

        fetcher.fetch_description("v1").await;
        fetcher.fetch_description("v1").await;
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn upstream_failure_is_absent_not_error() {
        let api = Arc::new(CountingApi::new(true));
        let fetcher = DetailFetcher::new(
            api.clone(),
            Duration::from_secs(3600),
            Duration::from_secs(5),
        );

        assert_eq!(fetcher.fetch_description("v1").await, None);
        // Failures are not cached; the next call tries again.
        assert_eq!(fetcher.fetch_description("v1").await, None);
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 2);
    }
}
