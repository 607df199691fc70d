use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use crate::error::IgtokenError;
use crate::flow::AddOutcome;
use crate::prompt::Prompter;
use crate::types::{AccountMetadata, TokenStatus};

use super::output::{
    check_label, format_time, heading, overall_label, paint, print_json, status_label,
};
use super::Context;

/// One row of `igtoken list`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountSummary<'a> {
    alias: &'a str,
    default: bool,
    username: &'a str,
    instagram_business_account_id: &'a str,
    facebook_page_name: &'a str,
    status: TokenStatus,
    expires_at: DateTime<Utc>,
    last_refreshed: DateTime<Utc>,
}

impl<'a> AccountSummary<'a> {
    fn new(alias: &'a str, meta: &'a AccountMetadata, default: bool, now: DateTime<Utc>) -> Self {
        Self {
            alias,
            default,
            username: &meta.account_info.username,
            instagram_business_account_id: &meta.instagram_business_account_id,
            facebook_page_name: &meta.facebook_page_name,
            status: meta.status_at(now),
            expires_at: meta.expires_at(),
            last_refreshed: meta.last_refreshed,
        }
    }
}

pub async fn run_add(
    ctx: &Context,
    alias: Option<&str>,
    prompter: &mut dyn Prompter,
) -> Result<(), IgtokenError> {
    let config = ctx.app_config()?;
    let registry = ctx.registry()?;
    let is_tty = ctx.is_tty();

    match ctx.flow().add_account(&registry, &config, alias, prompter).await? {
        AddOutcome::Added { alias, account } => {
            let meta = &account.metadata;
            println!(
                "{}",
                paint(&format!("Account '{alias}' added."), is_tty, |s| s.green().bold())
            );
            println!("  Instagram: @{}", meta.account_info.username);
            println!("  Business account ID: {}", meta.instagram_business_account_id);
            println!("  Facebook Page: {}", meta.facebook_page_name);
            println!("  Token expires: {}", format_time(meta.expires_at()));
            println!("  Storage: {}", registry.policy());
        }
        AddOutcome::NoPages => {
            println!("{}", paint("No Facebook Pages found.", is_tty, |s| s.red()));
            println!("Create a Facebook Page and connect it to your Instagram Business account, then retry.");
        }
        AddOutcome::NoBusinessAccount { page } => {
            println!(
                "{}",
                paint(
                    &format!("Page '{}' has no linked Instagram Business account.", page.name),
                    is_tty,
                    |s| s.red()
                )
            );
            println!("Convert the Instagram account to a Business account and connect it to this Page.");
        }
        AddOutcome::Cancelled => println!("Operation cancelled."),
    }
    Ok(())
}

pub fn run_list(ctx: &Context) -> Result<(), IgtokenError> {
    let registry = ctx.registry()?;
    let accounts = registry.list_accounts()?;
    let default = registry.default_alias()?;
    let now = Utc::now();

    let rows: Vec<AccountSummary<'_>> = accounts
        .iter()
        .map(|(alias, meta)| {
            AccountSummary::new(alias, meta, default.as_deref() == Some(alias.as_str()), now)
        })
        .collect();

    if ctx.json {
        print_json(&rows);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No accounts found. Run: igtoken add");
        return Ok(());
    }

    let is_tty = ctx.is_tty();
    println!("{}", heading(&format!("{} account(s)", rows.len()), is_tty));
    for row in &rows {
        let marker = if row.default { "*" } else { " " };
        let name = paint(row.alias, is_tty, |s| s.bold());
        let suffix = if row.default {
            paint(" (default)", is_tty, |s| s.green())
        } else {
            String::new()
        };
        println!("{marker} {name}{suffix}");
        println!("    Username: @{}", row.username);
        println!("    Business account ID: {}", row.instagram_business_account_id);
        println!("    Facebook Page: {}", row.facebook_page_name);
        println!("    Status: {}", status_label(&row.status, is_tty));
        println!("    Last refreshed: {}", format_time(row.last_refreshed));
    }
    Ok(())
}

pub fn run_use(ctx: &Context, alias: &str) -> Result<(), IgtokenError> {
    ctx.registry()?.set_default(alias)?;
    if ctx.json {
        print_json(&serde_json::json!({ "defaultAccount": alias }));
    } else {
        println!("Default account set to '{alias}'.");
    }
    Ok(())
}

pub fn run_info(
    ctx: &Context,
    alias: Option<&str>,
    show_token: bool,
    token_only: bool,
) -> Result<(), IgtokenError> {
    let registry = ctx.registry()?;
    let (alias, account) = registry.resolve(alias)?;

    if token_only {
        println!("{}", account.access_token);
        return Ok(());
    }

    let token = if show_token {
        account.access_token.clone()
    } else {
        account.masked_token()
    };
    let meta = &account.metadata;
    let status = meta.status();

    if ctx.json {
        print_json(&serde_json::json!({
            "alias": alias,
            "accessToken": token,
            "status": status,
            "expiresAt": meta.expires_at(),
            "metadata": meta,
        }));
        return Ok(());
    }

    let is_tty = ctx.is_tty();
    let info = &meta.account_info;
    println!("{}", heading(&format!("Account: {alias}"), is_tty));
    println!("  Username: @{}", info.username);
    println!("  Name: {}", info.name.as_deref().unwrap_or("N/A"));
    println!("  Business account ID: {}", meta.instagram_business_account_id);
    if let Some(n) = info.followers_count {
        println!("  Followers: {n}");
    }
    if let Some(n) = info.media_count {
        println!("  Media: {n}");
    }
    println!("  Facebook Page: {} ({})", meta.facebook_page_name, meta.facebook_page_id);
    println!("  Status: {}", status_label(&status, is_tty));
    println!("  Expires: {}", format_time(meta.expires_at()));
    println!("  Created: {}", format_time(meta.created_at));
    println!("  Last refreshed: {}", format_time(meta.last_refreshed));
    println!("  Access token: {token}");
    Ok(())
}

pub async fn run_refresh(ctx: &Context, alias: Option<&str>) -> Result<(), IgtokenError> {
    let config = ctx.app_config()?;
    let registry = ctx.registry()?;
    let (alias, account) = ctx.flow().refresh_account(&registry, &config, alias).await?;
    let expires_at = account.metadata.expires_at();

    if ctx.json {
        print_json(&serde_json::json!({ "alias": alias, "expiresAt": expires_at }));
    } else {
        println!(
            "{} New expiry: {}",
            paint(&format!("Token for '{alias}' refreshed."), ctx.is_tty(), |s| s.green()),
            format_time(expires_at)
        );
    }
    Ok(())
}

pub fn run_remove(
    ctx: &Context,
    alias: &str,
    yes: bool,
    prompter: &mut dyn Prompter,
) -> Result<(), IgtokenError> {
    let registry = ctx.registry()?;
    // Resolve first so an unknown alias errors before asking anything.
    let alias = registry.resolve_alias(Some(alias))?;
    if !yes && !prompter.confirm(&format!("Remove account '{alias}'?"), false)? {
        println!("Operation cancelled.");
        return Ok(());
    }
    registry.remove_account(&alias)?;
    if ctx.json {
        print_json(&serde_json::json!({
            "removed": alias,
            "defaultAccount": registry.default_alias()?,
        }));
    } else {
        println!("Account '{alias}' removed.");
    }
    Ok(())
}

/// Local expiry status plus live Graph API checks for one account.
pub async fn run_validate(ctx: &Context, alias: Option<&str>) -> Result<(), IgtokenError> {
    let registry = ctx.registry()?;
    let (alias, account) = registry.resolve(alias)?;
    let meta = &account.metadata;
    let status = meta.status();

    let report = ctx
        .flow()
        .graph()
        .test_connection(&account.access_token, &meta.instagram_business_account_id)
        .await;
    let overall = report.overall();

    if ctx.json {
        print_json(&serde_json::json!({
            "alias": alias,
            "status": status,
            "overall": overall,
            "checks": report.checks,
        }));
    } else {
        let is_tty = ctx.is_tty();
        println!("{}", heading(&format!("Validating '{alias}'"), is_tty));
        println!("  Token: {}", status_label(&status, is_tty));
        for check in &report.checks {
            println!(
                "  [{}] {}{}",
                check_label(check.outcome, is_tty),
                check.name,
                check
                    .detail
                    .as_deref()
                    .map(|d| format!(": {d}"))
                    .unwrap_or_default()
            );
        }
        println!("{}", overall_label(overall, is_tty));
    }

    if overall == crate::graph::Overall::Failed {
        return Err(IgtokenError::GraphApi {
            status: None,
            message: format!("token for '{alias}' could not be used"),
        });
    }
    Ok(())
}

pub fn run_cleanup(
    ctx: &Context,
    yes: bool,
    prompter: &mut dyn Prompter,
) -> Result<(), IgtokenError> {
    let registry = ctx.registry()?;
    let now = Utc::now();
    let expired = registry.expired_aliases(now)?;

    if expired.is_empty() {
        if ctx.json {
            print_json(&serde_json::json!({ "removed": expired }));
        } else {
            println!("No expired accounts.");
        }
        return Ok(());
    }

    if !ctx.json {
        println!("Expired: {}", expired.join(", "));
    }
    if !yes
        && !prompter.confirm(&format!("Remove {} expired account(s)?", expired.len()), false)?
    {
        println!("Operation cancelled.");
        return Ok(());
    }

    let removed = registry.remove_expired(now)?;
    if ctx.json {
        print_json(&serde_json::json!({ "removed": removed }));
    } else {
        println!("Removed {} account(s).", removed.len());
    }
    Ok(())
}

pub async fn run_media(
    ctx: &Context,
    alias: Option<&str>,
    limit: u32,
    after: Option<&str>,
) -> Result<(), IgtokenError> {
    let registry = ctx.registry()?;
    let (alias, account) = registry.resolve(alias)?;
    let page = ctx
        .flow()
        .graph()
        .media(
            &account.access_token,
            &account.metadata.instagram_business_account_id,
            limit,
            after,
        )
        .await?;

    if ctx.json {
        print_json(&page);
        return Ok(());
    }

    let is_tty = ctx.is_tty();
    println!("{}", heading(&format!("Media for '{alias}'"), is_tty));
    if page.data.is_empty() {
        println!("  (no media)");
    }
    for item in &page.data {
        let caption: String = item
            .caption
            .as_deref()
            .unwrap_or_default()
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(60)
            .collect();
        println!(
            "  {}  {:<14} {}",
            item.timestamp.as_deref().unwrap_or("-"),
            item.media_type.as_deref().unwrap_or("-"),
            caption
        );
        if let Some(link) = &item.permalink {
            println!("      {}", paint(link, is_tty, |s| s.dimmed()));
        }
    }
    if let Some(cursor) = &page.next_cursor {
        println!("More: igtoken media {alias} --after {cursor}");
    }
    Ok(())
}
