use colored::Colorize;

use crate::config::{
    app_config_info, check_redirect_uri, has_app_config, recommended_redirect_uris,
    remove_app_config, save_app_config, AppConfig, FacebookAppUrls,
};
use crate::error::IgtokenError;
use crate::prompt::Prompter;

use super::output::{format_time, heading, paint, print_json};
use super::Context;

/// Ask for the Facebook app credentials and write `config.json`.
pub fn run_init(ctx: &Context, prompter: &mut dyn Prompter) -> Result<(), IgtokenError> {
    let is_tty = ctx.is_tty();

    if has_app_config(&ctx.paths)
        && !prompter.confirm("App configuration already exists. Overwrite it?", false)?
    {
        println!("Initialization cancelled.");
        return Ok(());
    }

    println!("{}", heading("Facebook app credentials", is_tty));
    println!("Find these in the Facebook developer console under Settings > Basic.");

    let app_id = prompter.input("Facebook App ID", None)?;
    let app_secret = prompter.secret("Facebook App Secret")?;
    let default_redirect = recommended_redirect_uris()[0];
    let redirect_uri = prompter.input("Redirect URI", Some(default_redirect))?;

    let check = check_redirect_uri(&redirect_uri);
    for warning in &check.warnings {
        println!("{} {warning}", paint("warning:", is_tty, |s| s.yellow()));
    }

    let config = AppConfig::new(app_id, app_secret, redirect_uri)?;
    let saved = save_app_config(&ctx.paths, &config)?;

    let urls = FacebookAppUrls::for_app(&saved.app_id);
    println!(
        "{} Saved to {}",
        paint("Configuration saved.", is_tty, |s| s.green().bold()),
        ctx.paths.config_file().display()
    );
    println!();
    println!("Make sure {} is listed under Valid OAuth Redirect URIs:", saved.redirect_uri);
    println!("  {}", urls.settings);
    println!("Add the Instagram Graph API product: {}", urls.products);
    println!("Review permissions: {}", urls.permissions);
    println!("App dashboard: {}", urls.dashboard);
    println!("Next: run `igtoken add` to authorize your first Instagram account.");
    Ok(())
}

/// Delete `config.json`. Stored accounts are left alone.
pub fn run_config_reset(
    ctx: &Context,
    yes: bool,
    prompter: &mut dyn Prompter,
) -> Result<(), IgtokenError> {
    if !yes
        && !prompter.confirm(
            "Remove the stored app configuration? Accounts are kept.",
            false,
        )?
    {
        println!("Operation cancelled.");
        return Ok(());
    }

    remove_app_config(&ctx.paths)?;
    tracing::info!(path = %ctx.paths.config_file().display(), "removed app configuration");
    if ctx.json {
        print_json(&serde_json::json!({ "reset": true }));
    } else {
        println!("Configuration reset. Run `igtoken init` to reconfigure.");
    }
    Ok(())
}

/// Print the stored app config (never the secret) and registry summary.
pub fn run_config_show(ctx: &Context) -> Result<(), IgtokenError> {
    let info = app_config_info(&ctx.paths)?;
    let registry = ctx.registry()?;
    let account_count = registry.account_count()?;
    let default_account = registry.default_alias()?;

    if ctx.json {
        print_json(&serde_json::json!({
            "configDir": ctx.paths.root(),
            "storage": registry.policy().to_string(),
            "app": info,
            "accountCount": account_count,
            "defaultAccount": default_account,
        }));
        return Ok(());
    }

    let is_tty = ctx.is_tty();
    println!("{}", heading("Configuration", is_tty));
    println!("  Directory:  {}", ctx.paths.root().display());
    println!("  Storage:    {}", registry.policy());
    match info {
        Some(info) => {
            println!("  App ID:     {}", info.app_id);
            println!("  Redirect:   {}", info.redirect_uri);
            println!(
                "  App secret: {}",
                if info.has_app_secret { "set" } else { "missing (run: igtoken init)" }
            );
            if let Some(created) = info.created_at {
                println!("  Created:    {}", format_time(created));
            }
            if let Some(updated) = info.last_updated {
                println!("  Updated:    {}", format_time(updated));
            }
        }
        None => println!("  App:        not configured (run: igtoken init)"),
    }
    println!("  Accounts:   {account_count}");
    println!(
        "  Default:    {}",
        default_account.as_deref().unwrap_or("(none)")
    );
    Ok(())
}
