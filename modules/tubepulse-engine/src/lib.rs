pub mod aggregator;
pub mod detail;
pub mod readability;
pub mod registry;
pub mod sentiment;
pub mod word_stats;

pub use aggregator::{
    aggregate_once, AggregatorHandle, AggregatorSettings, Subscriber, WordStatsTable,
};
pub use detail::{DetailFetcher, VideoApi};
pub use registry::AggregatorRegistry;
