pub mod client;
pub mod types;

pub use client::{GraphClient, DEFAULT_ACCOUNT_METRICS, DEFAULT_MEDIA_LIMIT, DEFAULT_MEDIA_METRICS};
pub use types::{
    CheckOutcome, ConnectionCheck, ConnectionReport, InsightMetric, InsightValue, Insights,
    MediaItem, MediaPage, Overall, TokenValidation,
};
