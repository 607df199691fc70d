use reqwest::Url;

use crate::config::AppConfig;
use crate::error::IgtokenError;
use crate::provider::{get_json, CallError};

use super::endpoints::{GraphEndpoints, SCOPES};
use super::state::generate_state;
use super::token::{
    AuthorizationRequest, BusinessAccount, FacebookPage, GrantResponse, PageBusinessLink,
    PageList, ShortLivedToken, TokenGrant,
};

/// Drives the authorization-code grant and long-lived token lifecycle.
///
/// Every method is one network round trip at most. Nothing is retried: a
/// failure is returned with the provider's message so the caller can decide
/// whether to restart the flow.
#[derive(Debug, Clone, Default)]
pub struct TokenExchanger {
    client: reqwest::Client,
    endpoints: GraphEndpoints,
}

impl TokenExchanger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoints(endpoints: GraphEndpoints) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &GraphEndpoints {
        &self.endpoints
    }

    /// Build the Facebook login dialog URL with a fresh `state`.
    pub fn authorization_url(
        &self,
        config: &AppConfig,
    ) -> Result<AuthorizationRequest, IgtokenError> {
        let state = generate_state();
        let scope = SCOPES.join(",");
        let url = Url::parse_with_params(
            &self.endpoints.authorize(),
            &[
                ("client_id", config.app_id.as_str()),
                ("redirect_uri", config.redirect_uri.as_str()),
                ("scope", scope.as_str()),
                ("response_type", "code"),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| IgtokenError::validation("authorization endpoint", e.to_string()))?;

        Ok(AuthorizationRequest {
            url: url.into(),
            state,
        })
    }

    /// Trade a single-use authorization code for a short-lived user token.
    pub async fn exchange_code(
        &self,
        code: &str,
        config: &AppConfig,
    ) -> Result<ShortLivedToken, IgtokenError> {
        if code.trim().is_empty() {
            return Err(IgtokenError::validation(
                "authorization code",
                "code must not be empty",
            ));
        }
        get_json(
            &self.client,
            &self.endpoints.access_token(),
            &[
                ("client_id", config.app_id.as_str()),
                ("client_secret", config.app_secret.as_str()),
                ("redirect_uri", config.redirect_uri.as_str()),
                ("code", code),
            ],
        )
        .await
        .map_err(|e| map_call_error(e, IgtokenError::OAuthError))
    }

    /// Upgrade a short-lived token to a long-lived (about 60 day) one.
    pub async fn exchange_for_long_lived(
        &self,
        short_lived: &ShortLivedToken,
        config: &AppConfig,
    ) -> Result<TokenGrant, IgtokenError> {
        let resp: GrantResponse = self
            .fb_exchange(&short_lived.access_token, config)
            .await
            .map_err(|e| map_call_error(e, IgtokenError::OAuthError))?;
        Ok(resp.into_grant())
    }

    /// Re-exchange a still-valid long-lived token for one with a reset expiry.
    ///
    /// An already-expired or revoked token cannot be refreshed; the caller
    /// has to run the authorization flow again.
    pub async fn refresh_long_lived(
        &self,
        access_token: &str,
        config: &AppConfig,
    ) -> Result<TokenGrant, IgtokenError> {
        let resp: GrantResponse = self
            .fb_exchange(access_token, config)
            .await
            .map_err(|e| map_call_error(e, IgtokenError::TokenRefresh))?;
        Ok(resp.into_grant())
    }

    async fn fb_exchange(
        &self,
        token: &str,
        config: &AppConfig,
    ) -> Result<GrantResponse, CallError> {
        get_json(
            &self.client,
            &self.endpoints.access_token(),
            &[
                ("grant_type", "fb_exchange_token"),
                ("client_id", config.app_id.as_str()),
                ("client_secret", config.app_secret.as_str()),
                ("fb_exchange_token", token),
            ],
        )
        .await
    }

    /// Pages the user manages. An empty list is a normal outcome.
    pub async fn list_connected_pages(
        &self,
        user_access_token: &str,
    ) -> Result<Vec<FacebookPage>, IgtokenError> {
        let pages: PageList = get_json(
            &self.client,
            &self.endpoints.my_pages(),
            &[
                ("fields", "id,name,access_token"),
                ("access_token", user_access_token),
            ],
        )
        .await
        .map_err(map_graph_error)?;
        tracing::debug!(count = pages.data.len(), "listed connected pages");
        Ok(pages.data)
    }

    /// The Instagram Business account linked to a page, or `None` if the page
    /// has no linked account.
    pub async fn resolve_business_account(
        &self,
        page_access_token: &str,
        page_id: &str,
    ) -> Result<Option<BusinessAccount>, IgtokenError> {
        let link: PageBusinessLink = get_json(
            &self.client,
            &self.endpoints.node(page_id),
            &[
                ("fields", "instagram_business_account{id,username,name}"),
                ("access_token", page_access_token),
            ],
        )
        .await
        .map_err(map_graph_error)?;
        Ok(link.instagram_business_account)
    }
}

fn map_call_error(err: CallError, rejected: fn(String) -> IgtokenError) -> IgtokenError {
    match err {
        CallError::Network(msg) => IgtokenError::NetworkError(msg),
        CallError::Provider(failure) => rejected(failure.message),
        CallError::Malformed(msg) => rejected(msg),
    }
}

pub(crate) fn map_graph_error(err: CallError) -> IgtokenError {
    match err {
        CallError::Network(msg) => IgtokenError::NetworkError(msg),
        CallError::Provider(failure) => IgtokenError::GraphApi {
            status: Some(failure.status),
            message: failure.message,
        },
        CallError::Malformed(msg) => IgtokenError::GraphApi {
            status: None,
            message: msg,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::new("1234", "secret", "https://localhost:3000/auth/callback").unwrap()
    }

    fn query_value(url: &str, key: &str) -> Option<String> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn authorization_url_has_all_parameters() {
        let exchanger = TokenExchanger::new();
        let request = exchanger.authorization_url(&config()).unwrap();
        assert!(request
            .url
            .starts_with("https://www.facebook.com/v18.0/dialog/oauth?"));
        assert_eq!(query_value(&request.url, "client_id").as_deref(), Some("1234"));
        assert_eq!(
            query_value(&request.url, "redirect_uri").as_deref(),
            Some("https://localhost:3000/auth/callback")
        );
        assert_eq!(
            query_value(&request.url, "scope").as_deref(),
            Some("pages_show_list,pages_read_engagement,instagram_basic,instagram_manage_insights")
        );
        assert_eq!(
            query_value(&request.url, "response_type").as_deref(),
            Some("code")
        );
        assert_eq!(
            query_value(&request.url, "state"),
            Some(request.state.clone())
        );
    }

    #[test]
    fn authorization_url_state_changes_every_call() {
        let exchanger = TokenExchanger::new();
        let a = exchanger.authorization_url(&config()).unwrap();
        let b = exchanger.authorization_url(&config()).unwrap();
        assert_ne!(a.state, b.state);
        assert_eq!(a.state.len(), 32);
    }

    #[test]
    fn redirect_uri_with_query_is_preserved_exactly() {
        let mut cfg = config();
        cfg.redirect_uri = "https://example.com/cb?tenant=a&x=1 2".into();
        let request = TokenExchanger::new().authorization_url(&cfg).unwrap();
        assert_eq!(
            query_value(&request.url, "redirect_uri").as_deref(),
            Some("https://example.com/cb?tenant=a&x=1 2")
        );
    }

    #[tokio::test]
    async fn exchange_code_rejects_empty_code() {
        let err = TokenExchanger::new()
            .exchange_code("  ", &config())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn map_call_error_variants() {
        let net = map_call_error(CallError::Network("refused".into()), IgtokenError::OAuthError);
        assert!(matches!(net, IgtokenError::NetworkError(_)));

        let rejected = map_call_error(
            CallError::Provider(crate::provider::ProviderFailure {
                status: 400,
                code: Some(190),
                message: "Session has expired".into(),
            }),
            IgtokenError::TokenRefresh,
        );
        assert_eq!(rejected.to_string(), "Token refresh failed: Session has expired");
    }
}
