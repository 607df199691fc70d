use std::path::{Path, PathBuf};

use chrono::Utc;
use colored::Colorize;

use crate::config::{has_app_config, load_app_config};
use crate::error::IgtokenError;
use crate::prompt::Prompter;
use crate::registry::ExportBundle;

use super::output::{format_time, paint, print_json};
use super::Context;

fn default_export_file() -> PathBuf {
    PathBuf::from(format!("igtoken-backup-{}.json", Utc::now().format("%Y-%m-%d")))
}

/// Write account metadata and the public app config to `file`.
pub fn run_export(ctx: &Context, file: Option<&Path>) -> Result<(), IgtokenError> {
    let config = if has_app_config(&ctx.paths) {
        Some(load_app_config(&ctx.paths)?)
    } else {
        None
    };
    let bundle = ctx.registry()?.export(config.as_ref())?;
    let path = file.map(Path::to_path_buf).unwrap_or_else(default_export_file);

    std::fs::write(&path, bundle.to_json()? + "\n")?;
    tracing::info!(path = %path.display(), accounts = bundle.accounts.len(), "exported registry");

    if ctx.json {
        print_json(&serde_json::json!({
            "file": path,
            "accounts": bundle.accounts.len(),
        }));
    } else {
        println!(
            "Exported {} account(s) to {}",
            bundle.accounts.len(),
            path.display()
        );
        println!(
            "{}",
            paint(
                "Access tokens and the app secret are not exported.",
                ctx.is_tty(),
                |s| s.yellow()
            )
        );
    }
    Ok(())
}

pub fn run_import(
    ctx: &Context,
    file: &Path,
    yes: bool,
    prompter: &mut dyn Prompter,
) -> Result<(), IgtokenError> {
    let content = std::fs::read_to_string(file).map_err(|e| IgtokenError::ConfigError {
        path: file.to_path_buf(),
        detail: format!("Cannot read file: {e}"),
    })?;
    let bundle = ExportBundle::from_json(&content)?;

    if !ctx.json {
        println!("Export created: {}", format_time(bundle.exported_at));
        println!("Accounts to import: {}", bundle.accounts.len());
    }
    if !yes
        && !prompter.confirm("This will overwrite matching accounts. Continue?", false)?
    {
        println!("Import cancelled.");
        return Ok(());
    }

    let summary = ctx.registry()?.import(&bundle)?;
    let needs_init = !has_app_config(&ctx.paths);

    if ctx.json {
        print_json(&summary);
        return Ok(());
    }

    let is_tty = ctx.is_tty();
    println!(
        "{}",
        paint(
            &format!("Imported {} account(s).", summary.imported.len()),
            is_tty,
            |s| s.green()
        )
    );
    if !summary.replaced.is_empty() {
        println!("Replaced: {}", summary.replaced.join(", "));
    }
    if let Some(default) = &summary.default_account {
        println!("Default account: {default}");
    }
    println!("Accounts without a stored token need `igtoken add <alias>` before use.");
    if needs_init {
        if let Some(config) = &summary.config {
            println!(
                "{} run `igtoken init` with App ID {} and redirect URI {}.",
                paint("App secret required:", is_tty, |s| s.yellow()),
                config.app_id,
                config.redirect_uri
            );
        } else {
            println!("Run `igtoken init` to configure your Facebook app.");
        }
    }
    Ok(())
}
