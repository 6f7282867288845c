//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use farmstand_domain::{ProductFilter, SortBy};
use std::path::PathBuf;

/// Sort order for `products`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// Cheapest first
    Price,
    /// Most expensive first
    PriceDesc,
    /// Best rated first
    Rating,
    /// Nearest first
    Distance,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Price => SortBy::PriceAsc,
            SortArg::PriceDesc => SortBy::PriceDesc,
            SortArg::Rating => SortBy::Rating,
            SortArg::Distance => SortBy::Distance,
        }
    }
}

/// CLI arguments for farmstand
#[derive(Parser, Debug)]
#[command(name = "farmstand")]
#[command(author, version, about = "Farm-to-consumer marketplace client")]
#[command(long_about = r#"
Farmstand talks to a farm-to-consumer marketplace: browse products and
sellers, chat with farmers and bargain over prices.

Configuration is merged from (highest priority first):
1. FARMSTAND_* environment variables (e.g. FARMSTAND_API__BASE_URL)
2. --config <path>        Explicit config file
3. ./farmstand.toml       Project-level config
4. ~/.config/farmstand/config.toml   Global config

Example:
  farmstand login --email asha@example.com
  farmstand products --query tomato --sort rating
  farmstand products --recent
  farmstand chat --with 64f1c2...
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress spinners and banners
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and remember the credential
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and forget the credential
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List your conversations
    Chats,
    /// Open a conversation in an interactive session
    Chat(ChatArgs),
    /// List sellers
    Sellers,
    /// Search products
    Products(ProductArgs),
    /// Show configuration sources and merged values
    ShowConfig,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ChatArgs {
    /// Conversation id
    pub chat_id: Option<String>,

    /// Open (or start) the conversation with this user id
    #[arg(long = "with", value_name = "USER_ID")]
    pub with_user: Option<String>,
}

#[derive(Args, Debug)]
pub struct ProductArgs {
    /// Case-insensitive text to look for in product names
    #[arg(short = 'Q', long)]
    pub query: Option<String>,

    /// Only products of this seller
    #[arg(long, value_name = "USER_ID")]
    pub seller: Option<String>,

    /// Only products in this category
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, value_enum, default_value = "price")]
    pub sort: SortArg,

    #[arg(long, value_name = "STARS")]
    pub min_rating: Option<f64>,

    #[arg(long, requires = "max_price")]
    pub min_price: Option<f64>,

    #[arg(long, requires = "min_price")]
    pub max_price: Option<f64>,

    /// Show recent searches instead of searching
    #[arg(long, conflicts_with_all = ["query", "clear_recent", "forget_recent"])]
    pub recent: bool,

    /// Forget all recent searches
    #[arg(long, conflicts_with_all = ["query", "forget_recent"])]
    pub clear_recent: bool,

    /// Forget one recent search
    #[arg(long, value_name = "QUERY", conflicts_with = "query")]
    pub forget_recent: Option<String>,
}

impl ProductArgs {
    /// Client-side filter described by these arguments.
    pub fn filter(&self) -> ProductFilter {
        let mut filter = ProductFilter::new().with_sort(self.sort.into());
        if let Some(query) = &self.query {
            filter = filter.with_query(query);
        }
        if let Some(rating) = self.min_rating {
            filter = filter.with_min_rating(rating);
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            filter = filter.with_price_range(min, max);
        }
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_products_filter() {
        let cli = Cli::parse_from([
            "farmstand",
            "products",
            "-Q",
            "tomato",
            "--sort",
            "rating",
            "--min-price",
            "10",
            "--max-price",
            "50",
        ]);
        let Command::Products(args) = cli.command else {
            panic!("expected products");
        };
        let filter = args.filter();
        assert_eq!(filter.query.as_deref(), Some("tomato"));
        assert_eq!(filter.sort_by, SortBy::Rating);
        assert_eq!(filter.price_range, Some((10.0, 50.0)));
    }

    #[test]
    fn test_recent_search_flags() {
        let cli = Cli::try_parse_from(["farmstand", "products", "--recent"]).unwrap();
        let Command::Products(args) = cli.command else {
            panic!("expected products");
        };
        assert!(args.recent);
        assert!(!args.clear_recent);

        let cli =
            Cli::try_parse_from(["farmstand", "products", "--forget-recent", "okra"]).unwrap();
        let Command::Products(args) = cli.command else {
            panic!("expected products");
        };
        assert_eq!(args.forget_recent.as_deref(), Some("okra"));

        assert!(Cli::try_parse_from(["farmstand", "products", "--recent", "-Q", "okra"]).is_err());
        assert!(
            Cli::try_parse_from(["farmstand", "products", "--recent", "--clear-recent"]).is_err()
        );
    }

    #[test]
    fn test_chat_requires_id_or_user() {
        assert!(Cli::try_parse_from(["farmstand", "chat"]).is_err());
        assert!(Cli::try_parse_from(["farmstand", "chat", "c1", "--with", "u1"]).is_err());

        let cli = Cli::try_parse_from(["farmstand", "-v", "chat", "--with", "farmer-9"]).unwrap();
        assert_eq!(cli.verbose, 1);
        let Command::Chat(args) = cli.command else {
            panic!("expected chat");
        };
        assert_eq!(args.with_user.as_deref(), Some("farmer-9"));
    }
}
