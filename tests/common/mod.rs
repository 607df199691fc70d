use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use igtoken::config::AppConfig;
use igtoken::prompt::Prompter;
use igtoken::store::{MemoryVault, PlaintextStore, SecuredStore};
use igtoken::types::{Account, AccountInfo, AccountMetadata, TOKEN_TYPE};
use igtoken::{AccountRegistry, IgtokenError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REDIRECT_URI: &str = "https://localhost:3000/auth/callback";

#[allow(dead_code)]
pub fn app_config() -> AppConfig {
    AppConfig::new("1234567890", "app-s3cret", REDIRECT_URI).unwrap()
}

#[allow(dead_code)]
pub fn sample_account(token: &str, last_refreshed: DateTime<Utc>, expires_in: i64) -> Account {
    Account {
        access_token: token.into(),
        metadata: AccountMetadata {
            token_type: TOKEN_TYPE.into(),
            expires_in,
            created_at: last_refreshed,
            last_refreshed,
            instagram_business_account_id: "17841400000000001".into(),
            facebook_page_id: "100200300".into(),
            facebook_page_name: "Coffee Shop".into(),
            account_info: AccountInfo {
                id: "17841400000000001".into(),
                username: "coffeeshop".into(),
                name: Some("Coffee Shop".into()),
                media_count: Some(42),
                ..Default::default()
            },
        },
    }
}

#[allow(dead_code)]
pub fn plaintext_registry(dir: &Path) -> AccountRegistry {
    AccountRegistry::new(
        Box::new(PlaintextStore::new(dir.join("accounts.json"))),
        dir.join("settings.json"),
    )
}

#[allow(dead_code)]
pub fn secured_registry(dir: &Path, vault: Arc<MemoryVault>) -> AccountRegistry {
    AccountRegistry::new(
        Box::new(SecuredStore::new(dir.join("accounts.json"), vault)),
        dir.join("settings.json"),
    )
}

/// Answer GET `route` with a JSON body.
#[allow(dead_code)]
pub async fn mount_json(server: &MockServer, route: &str, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// A Graph API error body with the given code.
#[allow(dead_code)]
pub fn graph_error(message: &str, code: i64) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "message": message,
            "type": "OAuthException",
            "code": code,
            "fbtrace_id": "AbCdEf"
        }
    })
}

/// Prompter that replays canned answers and records what it was shown.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    pub inputs: VecDeque<String>,
    pub confirms: VecDeque<bool>,
    pub selections: VecDeque<usize>,
    pub opened: Vec<String>,
    pub messages: Vec<String>,
}

#[allow(dead_code)]
impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, answer: &str) -> Self {
        self.inputs.push_back(answer.to_string());
        self
    }

    pub fn with_confirm(mut self, answer: bool) -> Self {
        self.confirms.push_back(answer);
        self
    }

    pub fn with_selection(mut self, index: usize) -> Self {
        self.selections.push_back(index);
        self
    }
}

#[allow(dead_code)]
fn exhausted(what: &str) -> IgtokenError {
    IgtokenError::validation("script", format!("no scripted {what} left"))
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String, IgtokenError> {
        self.messages.push(message.to_string());
        let answer = self.inputs.pop_front().ok_or_else(|| exhausted("input"))?;
        match default {
            Some(d) if answer.is_empty() => Ok(d.to_string()),
            _ => Ok(answer),
        }
    }

    fn secret(&mut self, message: &str) -> Result<String, IgtokenError> {
        self.input(message, None)
    }

    fn confirm(&mut self, message: &str, _default: bool) -> Result<bool, IgtokenError> {
        self.messages.push(message.to_string());
        self.confirms.pop_front().ok_or_else(|| exhausted("confirm"))
    }

    fn select(&mut self, message: &str, _choices: &[String]) -> Result<usize, IgtokenError> {
        self.messages.push(message.to_string());
        self.selections.pop_front().ok_or_else(|| exhausted("selection"))
    }

    fn open_url(&mut self, url: &str) -> bool {
        self.opened.push(url.to_string());
        true
    }

    fn progress(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
