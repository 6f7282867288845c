//! CLI entrypoint for farmstand
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use farmstand_application::{
    BrowseProductsUseCase, ChatListUseCase, ChatSessionController, CredentialStore,
    InMemoryCredentialStore, InMemorySearchHistory, LoginUseCase, MarketplaceApi, ProductQuery,
    SearchHistoryStore, SessionContext,
};
use farmstand_domain::{User, UserId};
use farmstand_infrastructure::{
    ConfigLoader, FileConfig, FileCredentialStore, FileSearchHistory, RestMarketplaceApi,
    Severity,
};
use farmstand_presentation::{
    ChatArgs, ChatRepl, Cli, Command, ConsoleFormatter, OutputConfig, ProductArgs, ReplConfig,
    Spinner, TerminalNavigator,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting farmstand");

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    check_config(&config)?;

    let output = OutputConfig {
        color: config.output.color,
        json: cli.json || config.output.json,
    };
    output.apply();

    if let Command::ShowConfig = cli.command {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        println!();
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    // === Dependency Injection ===
    let store: Arc<dyn CredentialStore> = if config.auth.ephemeral {
        Arc::new(InMemoryCredentialStore::new())
    } else {
        let path = config
            .auth
            .credential_file
            .clone()
            .or_else(FileCredentialStore::default_path)
            .context("No data directory found; set auth.credential_file")?;
        Arc::new(FileCredentialStore::new(path))
    };
    let context = Arc::new(SessionContext::new(store));
    let api: Arc<dyn MarketplaceApi> = Arc::new(
        RestMarketplaceApi::new(&config.api.base_url, config.api.timeout(), context.clone())
            .context("Failed to build HTTP client")?,
    );
    info!("Using backend at {}", config.api.base_url);

    let login = LoginUseCase::new(api.clone(), context.clone());
    let show_progress = !cli.quiet && !output.json;

    match cli.command {
        Command::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt("Password: ")?,
            };
            let user = login.login(&email, &password).await?;
            print_user(&user, &output, "Signed in as");
        }
        Command::Logout => {
            login.logout().await;
            println!("{}", ConsoleFormatter::success("Signed out"));
        }
        Command::Whoami => match login.restore().await? {
            Some(user) => print_user(&user, &output, "Signed in as"),
            None => println!("Not signed in. Run `farmstand login` first."),
        },
        Command::Chats => {
            require_user(&login).await?;
            let spinner = Spinner::start("Loading chats...", show_progress);
            let chats = ChatListUseCase::new(api, context).list().await;
            spinner.clear();
            let chats = chats?;
            if output.json {
                println!("{}", ConsoleFormatter::format_json(&chats));
            } else {
                print!("{}", ConsoleFormatter::format_chat_list(&chats));
            }
        }
        Command::Chat(args) => {
            require_user(&login).await?;
            let repl_config = ReplConfig {
                show_progress: !cli.quiet && config.repl.show_progress,
                history_file: config.repl.history_file.as_ref().map(PathBuf::from),
            };
            run_chat(args, api, context, &config, repl_config).await?;
        }
        Command::Sellers => {
            let browse = BrowseProductsUseCase::new(api);
            let spinner = Spinner::start("Loading sellers...", show_progress);
            let sellers = browse.sellers().await;
            spinner.clear();
            let sellers = sellers?;
            if output.json {
                println!("{}", ConsoleFormatter::format_json(&sellers));
            } else {
                print!("{}", ConsoleFormatter::format_sellers(&sellers));
            }
        }
        Command::Products(args) => {
            let history = search_history(&config);
            search_products(args, api, history, &output, show_progress).await?;
        }
        // Printed before any backend wiring above
        Command::ShowConfig => {}
    }

    Ok(())
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Initialize logging based on verbosity level; RUST_LOG takes precedence
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let name = path
                .file_name()
                .context("--log-file must name a file")?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create log directory {}", dir.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn check_config(config: &FileConfig) -> Result<()> {
    let mut errors = 0;
    for issue in config.validate() {
        match issue.severity {
            Severity::Warning => warn!("Config: {}", issue),
            Severity::Error => {
                eprintln!("{}", ConsoleFormatter::error(&format!("config {}", issue)));
                errors += 1;
            }
        }
    }
    if errors > 0 {
        bail!("{} configuration error(s)", errors);
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    let mut rl = rustyline::DefaultEditor::new()?;
    Ok(rl.readline(label)?)
}

fn print_user(user: &User, output: &OutputConfig, label: &str) {
    if output.json {
        println!("{}", ConsoleFormatter::format_json(user));
    } else {
        print!("{} {}", label, ConsoleFormatter::format_user(user));
    }
}

async fn require_user(login: &LoginUseCase) -> Result<User> {
    login
        .restore()
        .await?
        .context("Not signed in. Run `farmstand login` first.")
}

async fn run_chat(
    args: ChatArgs,
    api: Arc<dyn MarketplaceApi>,
    context: Arc<SessionContext>,
    config: &FileConfig,
    repl_config: ReplConfig,
) -> Result<()> {
    let navigator = Arc::new(TerminalNavigator::new());
    let behavior = config.chat.to_behavior();

    let controller = match (args.chat_id, args.with_user) {
        (_, Some(user)) => {
            let spinner = Spinner::start("Opening chat...", repl_config.show_progress);
            let opened =
                ChatSessionController::open_with_user(api, context, &UserId::new(user)).await;
            spinner.clear();
            opened?
        }
        (Some(chat_id), None) => ChatSessionController::new(api, context, chat_id),
        (None, None) => bail!("Pass a chat id or --with <user-id>"),
    };
    let controller = controller
        .with_navigator(navigator.clone())
        .with_behavior(behavior);

    ChatRepl::new(Arc::new(controller), navigator)
        .with_config(repl_config)
        .run()
        .await?;
    Ok(())
}

/// File-backed unless the run is ephemeral or there is no data directory.
fn search_history(config: &FileConfig) -> Arc<dyn SearchHistoryStore> {
    match FileSearchHistory::default_path() {
        Some(path) if !config.auth.ephemeral => Arc::new(FileSearchHistory::new(path)),
        _ => Arc::new(InMemorySearchHistory::new()),
    }
}

async fn search_products(
    args: ProductArgs,
    api: Arc<dyn MarketplaceApi>,
    history: Arc<dyn SearchHistoryStore>,
    output: &OutputConfig,
    show_progress: bool,
) -> Result<()> {
    let browse = BrowseProductsUseCase::new(api).with_history(history);

    if args.clear_recent {
        browse.clear_recent_searches()?;
        println!("{}", ConsoleFormatter::success("Recent searches cleared"));
        return Ok(());
    }
    if let Some(query) = &args.forget_recent {
        browse.forget_recent_search(query)?;
        println!(
            "{}",
            ConsoleFormatter::success(&format!("Forgot \"{}\"", query.trim()))
        );
        return Ok(());
    }
    if args.recent {
        let recent = browse.recent_searches()?;
        if output.json {
            println!("{}", ConsoleFormatter::format_json(&recent));
        } else {
            print!("{}", ConsoleFormatter::format_recent_searches(&recent));
        }
        return Ok(());
    }

    let query = ProductQuery {
        seller: args.seller.clone().map(UserId::new),
        category: args.category.clone(),
    };
    let filter = args.filter();

    let spinner = Spinner::start("Searching...", show_progress);
    let products = browse.search(&query, &filter).await;
    spinner.clear();
    let products = products?;

    if output.json {
        println!("{}", ConsoleFormatter::format_json(&products));
    } else {
        print!("{}", ConsoleFormatter::format_products(&products));
    }
    Ok(())
}
