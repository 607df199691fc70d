//! The two multi-step operations: authorizing a new account and refreshing
//! a stored one.

use chrono::Utc;

use crate::config::AppConfig;
use crate::error::IgtokenError;
use crate::graph::GraphClient;
use crate::oauth::{extract_code, FacebookPage, GraphEndpoints, TokenExchanger};
use crate::prompt::Prompter;
use crate::registry::{validate_alias, AccountRegistry};
use crate::types::{Account, AccountMetadata, TOKEN_TYPE};

/// How an interactive add ended. Only `Added` persisted anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added { alias: String, account: Account },
    /// The user manages no Facebook Pages.
    NoPages,
    /// The chosen page has no linked Instagram Business account.
    NoBusinessAccount { page: FacebookPage },
    /// The user declined to overwrite an existing alias.
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct AccountFlow {
    exchanger: TokenExchanger,
    graph: GraphClient,
}

impl AccountFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoints(endpoints: GraphEndpoints) -> Self {
        Self {
            exchanger: TokenExchanger::with_endpoints(endpoints.clone()),
            graph: GraphClient::with_endpoints(endpoints),
        }
    }

    pub fn exchanger(&self) -> &TokenExchanger {
        &self.exchanger
    }

    pub fn graph(&self) -> &GraphClient {
        &self.graph
    }

    /// Authorize an Instagram Business account and store it under `alias`.
    ///
    /// Steps: authorization URL, pasted redirect, code exchange, long-lived
    /// exchange, page pick, business account lookup, profile fetch. The
    /// stored token is the chosen page's access token.
    pub async fn add_account(
        &self,
        registry: &AccountRegistry,
        config: &AppConfig,
        alias: Option<&str>,
        prompter: &mut dyn Prompter,
    ) -> Result<AddOutcome, IgtokenError> {
        let alias = match alias {
            Some(a) => a.trim().to_string(),
            None => prompter.input("Alias for this account", None)?,
        };
        validate_alias(&alias)?;

        if registry.has_account(&alias)?
            && !prompter.confirm(
                &format!("Account '{alias}' already exists. Overwrite it?"),
                false,
            )?
        {
            return Ok(AddOutcome::Cancelled);
        }

        let request = self.exchanger.authorization_url(config)?;
        prompter.progress(&format!(
            "Open this URL in your browser and authorize the app:\n{}",
            request.url
        ));
        if prompter.confirm("Open it in your browser now?", true)?
            && !prompter.open_url(&request.url)
        {
            prompter.progress("Could not open a browser. Copy the URL above instead.");
        }

        let pasted = prompter.input("Paste the full redirect URL", None)?;
        let code = extract_code(&pasted)?;

        prompter.progress("Exchanging authorization code...");
        let short_lived = self.exchanger.exchange_code(&code, config).await?;
        prompter.progress("Converting to a long-lived token...");
        let long_lived = self
            .exchanger
            .exchange_for_long_lived(&short_lived, config)
            .await?;

        prompter.progress("Fetching Facebook Pages...");
        let mut pages = self
            .exchanger
            .list_connected_pages(&long_lived.access_token)
            .await?;
        if pages.is_empty() {
            return Ok(AddOutcome::NoPages);
        }
        let labels: Vec<String> = pages
            .iter()
            .map(|p| format!("{} (ID: {})", p.name, p.id))
            .collect();
        let picked = prompter.select(
            "Select the Facebook Page connected to your Instagram account",
            &labels,
        )?;
        if picked >= pages.len() {
            return Err(IgtokenError::validation("selection", "choice out of range"));
        }
        let page = pages.swap_remove(picked);

        prompter.progress("Looking up the Instagram Business account...");
        let Some(business) = self
            .exchanger
            .resolve_business_account(&page.access_token, &page.id)
            .await?
        else {
            return Ok(AddOutcome::NoBusinessAccount { page });
        };

        let account_info = self
            .graph
            .detailed_account_info(&page.access_token, &business.id)
            .await?;

        let now = Utc::now();
        let account = Account {
            access_token: page.access_token,
            metadata: AccountMetadata {
                token_type: TOKEN_TYPE.to_string(),
                expires_in: long_lived.expires_in,
                created_at: now,
                last_refreshed: now,
                instagram_business_account_id: business.id,
                facebook_page_id: page.id,
                facebook_page_name: page.name,
                account_info,
            },
        };
        registry.save_account(&alias, &account)?;
        Ok(AddOutcome::Added { alias, account })
    }

    /// Re-exchange the stored token of `alias` (or the default account).
    ///
    /// Token, lifetime and `lastRefreshed` change; identity and `createdAt`
    /// are kept.
    pub async fn refresh_account(
        &self,
        registry: &AccountRegistry,
        config: &AppConfig,
        alias: Option<&str>,
    ) -> Result<(String, Account), IgtokenError> {
        let (alias, mut account) = registry.resolve(alias)?;
        let grant = self
            .exchanger
            .refresh_long_lived(&account.access_token, config)
            .await?;

        account.access_token = grant.access_token;
        account.metadata.token_type = grant.token_type;
        account.metadata.expires_in = grant.expires_in;
        account.metadata.last_refreshed = Utc::now();

        registry.save_account(&alias, &account)?;
        tracing::info!(alias, expires_in = account.metadata.expires_in, "refreshed token");
        Ok((alias, account))
    }
}
