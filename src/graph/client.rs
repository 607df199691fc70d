use serde::de::DeserializeOwned;

use crate::error::IgtokenError;
use crate::oauth::exchanger::map_graph_error;
use crate::oauth::GraphEndpoints;
use crate::provider::{get_json, CallError};
use crate::types::AccountInfo;

use super::types::{
    CheckOutcome, ConnectionCheck, ConnectionReport, Insights, MediaItem, MediaPage,
    RawMediaPage, TokenValidation,
};

const ACCOUNT_FIELDS: &str = "id,username,name,media_count";
const DETAILED_ACCOUNT_FIELDS: &str =
    "id,username,name,media_count,followers_count,follows_count,profile_picture_url,website,biography";
const MEDIA_FIELDS: &str =
    "id,caption,media_type,media_url,thumbnail_url,permalink,timestamp,username";
const MEDIA_DETAIL_FIELDS: &str =
    "id,caption,media_type,media_url,thumbnail_url,permalink,timestamp,username,like_count,comments_count";

pub const DEFAULT_MEDIA_LIMIT: u32 = 25;
pub const DEFAULT_MEDIA_METRICS: &[&str] = &["impressions", "reach", "engagement"];
pub const DEFAULT_ACCOUNT_METRICS: &[&str] = &["impressions", "reach", "profile_views"];

const INSIGHTS_UNAVAILABLE: &str = "Insights not available for this account type";

/// Read-only Instagram Graph API calls against a business account.
#[derive(Debug, Clone, Default)]
pub struct GraphClient {
    client: reqwest::Client,
    endpoints: GraphEndpoints,
}

impl GraphClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoints(endpoints: GraphEndpoints) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
        params: &[(&str, &str)],
    ) -> Result<T, CallError> {
        let mut query = params.to_vec();
        query.push(("access_token", access_token));
        get_json(&self.client, &self.endpoints.node(path), &query).await
    }

    pub async fn account_info(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<AccountInfo, IgtokenError> {
        self.fetch(account_id, access_token, &[("fields", ACCOUNT_FIELDS)])
            .await
            .map_err(map_graph_error)
    }

    /// Account info with follower counts and profile fields, degrading to
    /// [`GraphClient::account_info`] when the provider rejects those fields.
    pub async fn detailed_account_info(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<AccountInfo, IgtokenError> {
        match self
            .fetch::<AccountInfo>(account_id, access_token, &[("fields", DETAILED_ACCOUNT_FIELDS)])
            .await
        {
            Ok(info) => Ok(info),
            Err(CallError::Provider(failure)) if failure.is_unsupported_field() => {
                tracing::warn!(
                    account_id,
                    message = %failure.message,
                    "detailed fields unsupported, falling back to basic account info"
                );
                self.account_info(access_token, account_id).await
            }
            Err(e) => Err(map_graph_error(e)),
        }
    }

    /// One page of the account's media, newest first.
    pub async fn media(
        &self,
        access_token: &str,
        account_id: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<MediaPage, IgtokenError> {
        let limit = limit.to_string();
        let mut params = vec![("fields", MEDIA_FIELDS), ("limit", limit.as_str())];
        if let Some(cursor) = after {
            params.push(("after", cursor));
        }
        let raw: RawMediaPage = self
            .fetch(&format!("{account_id}/media"), access_token, &params)
            .await
            .map_err(map_graph_error)?;
        Ok(raw.into_page())
    }

    pub async fn media_details(
        &self,
        access_token: &str,
        media_id: &str,
    ) -> Result<MediaItem, IgtokenError> {
        self.fetch(media_id, access_token, &[("fields", MEDIA_DETAIL_FIELDS)])
            .await
            .map_err(map_graph_error)
    }

    pub async fn media_insights(
        &self,
        access_token: &str,
        media_id: &str,
        metrics: &[&str],
    ) -> Result<Insights, IgtokenError> {
        let metric = metrics.join(",");
        self.insights(
            &format!("{media_id}/insights"),
            access_token,
            &[("metric", metric.as_str())],
        )
        .await
    }

    pub async fn account_insights(
        &self,
        access_token: &str,
        account_id: &str,
        period: &str,
        metrics: &[&str],
    ) -> Result<Insights, IgtokenError> {
        let metric = metrics.join(",");
        self.insights(
            &format!("{account_id}/insights"),
            access_token,
            &[("metric", metric.as_str()), ("period", period)],
        )
        .await
    }

    async fn insights(
        &self,
        path: &str,
        access_token: &str,
        params: &[(&str, &str)],
    ) -> Result<Insights, IgtokenError> {
        match self.fetch::<Insights>(path, access_token, params).await {
            Ok(insights) => Ok(insights),
            Err(CallError::Provider(failure)) if failure.is_unsupported_request() => {
                tracing::warn!(path, message = %failure.message, "insights unavailable");
                Ok(Insights::unavailable(INSIGHTS_UNAVAILABLE))
            }
            Err(e) => Err(map_graph_error(e)),
        }
    }

    /// Check a token by fetching basic account info. Never fails.
    pub async fn validate_token(&self, access_token: &str, account_id: &str) -> TokenValidation {
        match self.account_info(access_token, account_id).await {
            Ok(info) => TokenValidation {
                valid: true,
                account: Some(info),
                error: None,
            },
            Err(e) => TokenValidation {
                valid: false,
                account: None,
                error: Some(e.to_string()),
            },
        }
    }

    /// Probe account info, media access and detailed info in turn.
    pub async fn test_connection(&self, access_token: &str, account_id: &str) -> ConnectionReport {
        let mut checks = Vec::with_capacity(3);

        checks.push(check(
            "Account Info",
            self.account_info(access_token, account_id)
                .await
                .map(|info| format!("@{}", info.username)),
            CheckOutcome::Failed,
        ));

        checks.push(check(
            "Media Access",
            self.media(access_token, account_id, 1, None)
                .await
                .map(|page| format!("{} item(s) on first page", page.data.len())),
            CheckOutcome::Failed,
        ));

        checks.push(check(
            "Detailed Account Info",
            self.detailed_account_info(access_token, account_id)
                .await
                .map(|info| match info.followers_count {
                    Some(n) => format!("{n} followers"),
                    None => "follower count unavailable".to_string(),
                }),
            CheckOutcome::Warning,
        ));

        ConnectionReport { checks }
    }
}

fn check(
    name: &'static str,
    result: Result<String, IgtokenError>,
    on_error: CheckOutcome,
) -> ConnectionCheck {
    match result {
        Ok(detail) => ConnectionCheck {
            name,
            outcome: CheckOutcome::Passed,
            detail: Some(detail),
        },
        Err(e) => ConnectionCheck {
            name,
            outcome: on_error,
            detail: Some(e.to_string()),
        },
    }
}
