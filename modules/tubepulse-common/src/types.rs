use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Categorical sentiment over a description corpus. Serialized as the
/// emoticon strings the browser client renders verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_emoticon(&self) -> &'static str {
        match self {
            Sentiment::Positive => ":-)",
            Sentiment::Negative => ":-(",
            Sentiment::Neutral => ":-|",
        }
    }
}

impl Serialize for Sentiment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_emoticon())
    }
}

impl<'de> Deserialize<'de> for Sentiment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            ":-)" => Ok(Sentiment::Positive),
            ":-(" => Ok(Sentiment::Negative),
            ":-|" => Ok(Sentiment::Neutral),
            other => Err(serde::de::Error::custom(format!(
                "unknown sentiment {other:?}"
            ))),
        }
    }
}

/// One enriched video in an aggregated payload.
///
/// Readability numbers cross the wire as two-decimal strings; the original
/// client depends on that display-oriented formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSummary {
    #[serde(rename = "videoId")]
    pub video_id: String,
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    pub title: Option<String>,
    pub description: String,
    #[serde(rename = "channelTitle")]
    pub channel_title: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(rename = "thumbnailUrl")]
    pub thumbnail_url: Option<String>,
    #[serde(
        rename = "fleschKincaidGradeLevel",
        serialize_with = "two_decimal",
        deserialize_with = "from_two_decimal"
    )]
    pub grade_level: f64,
    #[serde(
        rename = "fleschReadingScore",
        serialize_with = "two_decimal",
        deserialize_with = "from_two_decimal"
    )]
    pub reading_score: f64,
}

/// The consolidated result of one aggregation run for a query.
///
/// Invariant: `items` is capped at 10 for transmission, while the averages
/// and sentiment cover the full fetched set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub query: String,
    pub items: Vec<VideoSummary>,
    #[serde(
        rename = "fleschKincaidGradeLevelAvg",
        serialize_with = "two_decimal",
        deserialize_with = "from_two_decimal"
    )]
    pub grade_level_avg: f64,
    #[serde(
        rename = "fleschReadingScoreAvg",
        serialize_with = "two_decimal",
        deserialize_with = "from_two_decimal"
    )]
    pub reading_score_avg: f64,
    pub sentiment: Sentiment,
}

/// Inbound WebSocket message. Unknown actions are ignored, not answered.
#[derive(Debug, Clone, Deserialize)]
pub struct WsRequest {
    pub action: String,
    pub query: Option<String>,
}

/// Outbound WebSocket payload: the client's recent queries, freshest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsPayload {
    pub responses: Vec<AggregatedResult>,
}

/// One entry of a ranked word-frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

/// A channel profile with its most recent uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelProfile {
    #[serde(rename = "channelId")]
    pub channel_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "subscriberCount")]
    pub subscriber_count: Option<String>,
    #[serde(rename = "videoCount")]
    pub video_count: Option<String>,
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
    #[serde(rename = "latestVideos")]
    pub latest_videos: Vec<ChannelVideo>,
}

/// A bare video reference on a channel profile (no enrichment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelVideo {
    #[serde(rename = "videoId")]
    pub video_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(rename = "thumbnailUrl")]
    pub thumbnail_url: Option<String>,
}

fn two_decimal<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:.2}"))
}

fn from_two_decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}
