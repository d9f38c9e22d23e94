use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pokewiki",
    about = "Pokewiki: a community pokemon wiki with a guessing game",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Data directory (overrides `data_root` from the config file)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Server/wiki configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Create an account
    Signup(AccountArgs),
    /// Check a username and password
    Login(AccountArgs),
    /// Read, query and upload wiki pages
    Page(PageArgs),
    /// Show the leaderboard
    Leaderboard(LeaderboardArgs),
    /// Set or adjust a player's points
    Score(ScoreArgs),
    /// Load the pokedex, filter categories and pokemon images
    Seed(SeedArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<String>,
    /// Keep everything in memory instead of under the data directory
    #[arg(long)]
    pub memory: bool,
}

#[derive(Args)]
pub struct AccountArgs {
    pub username: String,
    pub password: String,
}

#[derive(Args)]
pub struct PageArgs {
    #[command(subcommand)]
    pub action: PageAction,
}

#[derive(Subcommand)]
pub enum PageAction {
    /// Show one page
    Show {
        name: String,
        /// Also print the page image as base64
        #[arg(long)]
        image: bool,
    },
    /// List every page
    List,
    /// Pages whose name contains a query (case-insensitive)
    Search { query: String },
    /// Pages matching every given field
    Filter(FilterArgs),
    /// Pages ordered by a numeric field
    Sort {
        #[arg(long, default_value = "level")]
        field: String,
        /// LowestToHighest or HighestToLowest
        #[arg(long, default_value = "LowestToHighest")]
        direction: String,
    },
    /// Create a page
    Upload(UploadArgs),
}

#[derive(Args)]
pub struct FilterArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long = "type")]
    pub kind: Option<String>,
    #[arg(long)]
    pub region: Option<String>,
    #[arg(long)]
    pub nature: Option<String>,
}

#[derive(Args)]
pub struct UploadArgs {
    pub name: String,
    #[arg(long = "type")]
    pub kind: Option<String>,
    #[arg(long)]
    pub region: Option<String>,
    #[arg(long)]
    pub nature: Option<String>,
    #[arg(long)]
    pub level: Option<i64>,
    /// Extra field as key=value; repeatable
    #[arg(long = "attr")]
    pub attributes: Vec<String>,
    /// Image file to attach
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Args)]
pub struct LeaderboardArgs {
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
    /// Check the stored ranking instead of printing it
    #[arg(long)]
    pub verify: bool,
}

#[derive(Args)]
pub struct ScoreArgs {
    pub username: String,
    #[arg(allow_negative_numbers = true)]
    pub points: i64,
    /// Add to the current total instead of replacing it
    #[arg(long)]
    pub add: bool,
}

#[derive(Args)]
pub struct SeedArgs {
    /// JSON array of pokedex entries, ordered by id
    #[arg(long)]
    pub pokedex: Option<PathBuf>,
    /// JSON filter categories
    #[arg(long)]
    pub categories: Option<PathBuf>,
    /// Directory of `<id>.png` images and `pokeball.png`
    #[arg(long)]
    pub images: Option<PathBuf>,
}
