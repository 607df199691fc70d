use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Token type reported for every stored grant.
pub const TOKEN_TYPE: &str = "bearer";

/// Nominal lifetime of a long-lived token when the provider omits `expires_in` (60 days).
pub const DEFAULT_EXPIRES_IN: i64 = 5_184_000;

/// Fewer whole days than this left on a token counts as "expiring soon".
pub const EXPIRY_WARNING_DAYS: i64 = 7;

/// Snapshot of the Instagram identity taken when the account was authorized.
///
/// Graph API responses use snake_case, stored records camelCase; both parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "media_count", skip_serializing_if = "Option::is_none")]
    pub media_count: Option<u64>,
    #[serde(default, alias = "followers_count", skip_serializing_if = "Option::is_none")]
    pub followers_count: Option<u64>,
    #[serde(default, alias = "follows_count", skip_serializing_if = "Option::is_none")]
    pub follows_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, alias = "profile_picture_url", skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
}

/// Everything known about an account except the access token itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountMetadata {
    pub token_type: String,
    /// Seconds of validity counted from `last_refreshed`.
    pub expires_in: i64,
    pub created_at: DateTime<Utc>,
    pub last_refreshed: DateTime<Utc>,
    pub instagram_business_account_id: String,
    pub facebook_page_id: String,
    pub facebook_page_name: String,
    pub account_info: AccountInfo,
}

impl AccountMetadata {
    /// `last_refreshed + expires_in`, saturating at the representable range.
    pub fn expires_at(&self) -> DateTime<Utc> {
        TimeDelta::try_seconds(self.expires_in)
            .and_then(|lifetime| self.last_refreshed.checked_add_signed(lifetime))
            .unwrap_or(if self.expires_in < 0 {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            })
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> TokenStatus {
        TokenStatus::classify(self.expires_at(), now)
    }

    pub fn status(&self) -> TokenStatus {
        self.status_at(Utc::now())
    }
}

/// A stored account: metadata plus the secret access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub access_token: String,
    #[serde(flatten)]
    pub metadata: AccountMetadata,
}

impl Account {
    /// First few characters of the token, for display.
    pub fn masked_token(&self) -> String {
        let prefix: String = self.access_token.chars().take(20).collect();
        format!("{prefix}...")
    }
}

/// Expiry classification of a stored token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum TokenStatus {
    Valid { days_remaining: i64 },
    ExpiringSoon { days_remaining: i64 },
    Expired,
}

impl TokenStatus {
    pub fn classify(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if expires_at <= now {
            return TokenStatus::Expired;
        }
        let days_remaining = (expires_at - now).num_days();
        if days_remaining < EXPIRY_WARNING_DAYS {
            TokenStatus::ExpiringSoon { days_remaining }
        } else {
            TokenStatus::Valid { days_remaining }
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, TokenStatus::Expired)
    }
}

impl std::fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenStatus::Valid { days_remaining } => {
                write!(f, "Valid ({days_remaining} days remaining)")
            }
            TokenStatus::ExpiringSoon { days_remaining } => {
                write!(f, "Expires in {days_remaining} days")
            }
            TokenStatus::Expired => write!(f, "Expired"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn metadata(expires_in: i64, last_refreshed: DateTime<Utc>) -> AccountMetadata {
        AccountMetadata {
            token_type: TOKEN_TYPE.into(),
            expires_in,
            created_at: last_refreshed,
            last_refreshed,
            instagram_business_account_id: "17841400000000000".into(),
            facebook_page_id: "100200300".into(),
            facebook_page_name: "Coffee Shop".into(),
            account_info: AccountInfo {
                id: "17841400000000000".into(),
                username: "coffeeshop".into(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn status_valid_with_ten_days() {
        let now = Utc::now();
        let meta = metadata(86_400 * 10, now);
        assert_eq!(
            meta.status_at(now),
            TokenStatus::Valid { days_remaining: 10 }
        );
        assert_eq!(meta.status_at(now).to_string(), "Valid (10 days remaining)");
    }

    #[test]
    fn status_expired_after_eleven_days() {
        let now = Utc::now();
        let meta = metadata(86_400 * 10, now - Duration::days(11));
        assert_eq!(meta.status_at(now), TokenStatus::Expired);
        assert!(meta.status_at(now).is_expired());
    }

    #[test]
    fn status_expiring_soon_under_a_week() {
        let now = Utc::now();
        let meta = metadata(86_400 * 3, now);
        assert_eq!(
            meta.status_at(now),
            TokenStatus::ExpiringSoon { days_remaining: 3 }
        );
        assert_eq!(meta.status_at(now).to_string(), "Expires in 3 days");
    }

    #[test]
    fn status_expired_exactly_at_expiry() {
        let now = Utc::now();
        let meta = metadata(60, now - Duration::seconds(60));
        assert_eq!(meta.status_at(now), TokenStatus::Expired);
    }

    #[test]
    fn huge_lifetime_saturates_instead_of_overflowing() {
        let now = Utc::now();
        for expires_in in [i64::MAX, i64::MAX / 2, 9_000_000_000_000_000] {
            let meta = metadata(expires_in, now);
            assert_eq!(meta.expires_at(), DateTime::<Utc>::MAX_UTC);
            assert!(matches!(meta.status_at(now), TokenStatus::Valid { .. }));
        }
    }

    #[test]
    fn huge_negative_lifetime_is_expired() {
        let now = Utc::now();
        let meta = metadata(i64::MIN, now);
        assert_eq!(meta.expires_at(), DateTime::<Utc>::MIN_UTC);
        assert_eq!(meta.status_at(now), TokenStatus::Expired);
    }

    #[test]
    fn account_serializes_flat_camel_case() {
        let now = Utc::now();
        let account = Account {
            access_token: "EAAG-secret".into(),
            metadata: metadata(DEFAULT_EXPIRES_IN, now),
        };
        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(value["accessToken"], "EAAG-secret");
        assert_eq!(value["tokenType"], "bearer");
        assert_eq!(value["expiresIn"], DEFAULT_EXPIRES_IN);
        assert_eq!(value["facebookPageName"], "Coffee Shop");
        assert_eq!(value["accountInfo"]["username"], "coffeeshop");
        assert!(value["accountInfo"].get("followersCount").is_none());

        let back: Account = serde_json::from_value(value).unwrap();
        assert_eq!(back, account);
    }

    #[test]
    fn masked_token_truncates() {
        let account = Account {
            access_token: "A".repeat(40),
            metadata: metadata(DEFAULT_EXPIRES_IN, Utc::now()),
        };
        assert_eq!(account.masked_token(), format!("{}...", "A".repeat(20)));
    }
}
