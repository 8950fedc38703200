pub mod error;
pub mod types;

pub use error::{Result, YoutubeError};
pub use types::{
    Channel, ChannelListResponse, SearchListResponse, SearchResult, Snippet, Video,
    VideoListResponse,
};

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

pub struct YoutubeClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YoutubeClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different base URL. Used by tests and local stubs.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    /// Search for videos matching a free-text query, newest first.
    pub async fn search_videos(&self, query: &str, max_results: u32) -> Result<SearchListResponse> {
        let url = format!("{}/search", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("maxResults", &max_results.to_string()),
                ("q", query),
                ("type", "video"),
                ("order", "date"),
                ("key", &self.api_key),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(YoutubeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        tracing::debug!(query, "Search request succeeded");
        let list: SearchListResponse = resp.json().await?;
        Ok(list)
    }

    /// Fetch full details for a single video.
    pub async fn video_details(&self, video_id: &str) -> Result<VideoListResponse> {
        let url = format!("{}/videos", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet,statistics"),
                ("id", video_id),
                ("key", &self.api_key),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(YoutubeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let list: VideoListResponse = resp.json().await?;
        Ok(list)
    }

    /// Fetch a channel's snippet and statistics.
    pub async fn channel_details(&self, channel_id: &str) -> Result<ChannelListResponse> {
        let url = format!("{}/channels", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet,statistics"),
                ("id", channel_id),
                ("key", &self.api_key),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(YoutubeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let list: ChannelListResponse = resp.json().await?;
        Ok(list)
    }

    /// Fetch a channel's most recent uploads, newest first.
    pub async fn channel_latest_videos(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<SearchListResponse> {
        let url = format!("{}/search", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("channelId", channel_id),
                ("maxResults", &max_results.to_string()),
                ("order", "date"),
                ("type", "video"),
                ("key", &self.api_key),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(YoutubeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let list: SearchListResponse = resp.json().await?;
        Ok(list)
    }
}
