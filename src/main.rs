use std::path::PathBuf;

use clap::{Parser, Subcommand};

use igtoken::cli::Context;
use igtoken::config::{ConfigPaths, StoragePolicy};
use igtoken::graph::DEFAULT_MEDIA_LIMIT;
use igtoken::prompt::TerminalPrompter;
use igtoken::IgtokenError;

#[derive(Parser)]
#[command(
    name = "igtoken",
    version,
    about = "Obtain and manage long-lived Instagram Graph API access tokens"
)]
struct Cli {
    /// Configuration directory (default: ~/.igtoken)
    #[arg(long, global = true, env = "IGTOKEN_HOME")]
    config_dir: Option<String>,

    /// Where access tokens are stored (default: the policy existing accounts use, else plaintext)
    #[arg(long, global = true, value_enum, env = "IGTOKEN_STORAGE")]
    storage: Option<StoragePolicy>,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the Facebook app credentials
    Init,

    /// Authorize an Instagram Business account
    Add {
        /// Name to store the account under
        alias: Option<String>,
    },

    /// List stored accounts
    List,

    /// Set the default account
    Use { alias: String },

    /// Show account details
    Info {
        /// Account alias (default account if omitted)
        alias: Option<String>,

        /// Print the full access token
        #[arg(long)]
        show_token: bool,

        /// Print only the access token
        #[arg(long, conflicts_with = "show_token")]
        token_only: bool,
    },

    /// Extend an account's long-lived token
    Refresh { alias: Option<String> },

    /// Remove a stored account
    Remove {
        alias: String,

        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Check an account's token against the Graph API
    Validate { alias: Option<String> },

    /// Remove accounts whose tokens have expired
    Cleanup {
        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// List recent media of an account
    Media {
        alias: Option<String>,

        /// Items per page
        #[arg(long, default_value_t = DEFAULT_MEDIA_LIMIT)]
        limit: u32,

        /// Cursor from a previous page
        #[arg(long)]
        after: Option<String>,
    },

    /// Write account metadata to a backup file (no tokens, no app secret)
    Export { file: Option<PathBuf> },

    /// Restore account metadata from a backup file
    Import {
        file: PathBuf,

        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display the app configuration and registry summary
    Show,

    /// Remove the stored app configuration
    Reset {
        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("IGTOKEN_LOG_LEVEL")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli).await {
        igtoken::cli::output::print_error(&e, json);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), IgtokenError> {
    let paths = ConfigPaths::discover(cli.config_dir.as_deref())?;
    let ctx = Context::new(paths, cli.storage, cli.json);
    let mut prompter = TerminalPrompter::stdin();

    match cli.command {
        Commands::Init => igtoken::cli::init::run_init(&ctx, &mut prompter),
        Commands::Add { alias } => {
            igtoken::cli::account::run_add(&ctx, alias.as_deref(), &mut prompter).await
        }
        Commands::List => igtoken::cli::account::run_list(&ctx),
        Commands::Use { alias } => igtoken::cli::account::run_use(&ctx, &alias),
        Commands::Info {
            alias,
            show_token,
            token_only,
        } => igtoken::cli::account::run_info(&ctx, alias.as_deref(), show_token, token_only),
        Commands::Refresh { alias } => igtoken::cli::account::run_refresh(&ctx, alias.as_deref()).await,
        Commands::Remove { alias, yes } => {
            igtoken::cli::account::run_remove(&ctx, &alias, yes, &mut prompter)
        }
        Commands::Validate { alias } => igtoken::cli::account::run_validate(&ctx, alias.as_deref()).await,
        Commands::Cleanup { yes } => igtoken::cli::account::run_cleanup(&ctx, yes, &mut prompter),
        Commands::Media {
            alias,
            limit,
            after,
        } => igtoken::cli::account::run_media(&ctx, alias.as_deref(), limit, after.as_deref()).await,
        Commands::Export { file } => igtoken::cli::transfer::run_export(&ctx, file.as_deref()),
        Commands::Import { file, yes } => {
            igtoken::cli::transfer::run_import(&ctx, &file, yes, &mut prompter)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => igtoken::cli::init::run_config_show(&ctx),
            ConfigAction::Reset { yes } => {
                igtoken::cli::init::run_config_reset(&ctx, yes, &mut prompter)
            }
        },
    }
}
