use serde::Deserialize;

// --- Search endpoint types ---

/// Response envelope for `GET /search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

/// A single search result. The id is compound because search can return
/// channels and playlists too; we only request `type=video` but the field
/// stays optional regardless.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: Option<SearchResultId>,
    pub snippet: Option<Snippet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResultId {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

/// Snippet shared by search results and video details. Search responses carry
/// a truncated description; the videos endpoint carries the full one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snippet {
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "channelTitle")]
    pub channel_title: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: Option<String>,
}

// --- Videos endpoint types ---

/// Response envelope for `GET /videos`.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<Video>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    pub id: Option<String>,
    pub snippet: Option<Snippet>,
    pub statistics: Option<VideoStatistics>,
}

/// Statistics counters arrive as strings on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoStatistics {
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
    #[serde(rename = "likeCount")]
    pub like_count: Option<String>,
    #[serde(rename = "commentCount")]
    pub comment_count: Option<String>,
}

// --- Channels endpoint types ---

/// Response envelope for `GET /channels`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<Channel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: Option<String>,
    pub snippet: Option<Snippet>,
    pub statistics: Option<ChannelStatistics>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelStatistics {
    #[serde(rename = "subscriberCount")]
    pub subscriber_count: Option<String>,
    #[serde(rename = "videoCount")]
    pub video_count: Option<String>,
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
}

impl SearchResult {
    /// The video id, if this result actually is a video.
    pub fn video_id(&self) -> Option<&str> {
        self.id.as_ref()?.video_id.as_deref()
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.snippet.as_ref()?.channel_id.as_deref()
    }
}

impl Video {
    /// Full description from the videos endpoint, if present.
    pub fn description(&self) -> Option<&str> {
        self.snippet.as_ref()?.description.as_deref()
    }
}
