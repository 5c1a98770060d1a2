use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lectern",
    about = "Lectern: citation parsing and text lookup for a canonical library",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// JSON file with works, texts and links to load before running
    #[arg(long, global = true)]
    pub seed: Option<String>,

    /// Library settings in TOML
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LanguageArg {
    En,
    He,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse a citation and show its structure
    Parse(ParseArgs),
    /// Fetch the text at a citation
    Text(TextArgs),
    /// List links touching a citation
    Links(LinksArgs),
    /// List citable titles, or categories
    Titles(TitlesArgs),
}

#[derive(Args)]
pub struct ParseArgs {
    pub citation: String,
    /// Leave missing sections off instead of padding them with 1
    #[arg(long)]
    pub no_pad: bool,
}

#[derive(Args)]
pub struct TextArgs {
    pub citation: String,
    #[arg(short, long)]
    pub context: Option<usize>,
    #[arg(long)]
    pub version: Option<String>,
    #[arg(long, requires = "version")]
    pub lang: Option<LanguageArg>,
    #[arg(long)]
    pub no_commentary: bool,
}

#[derive(Args)]
pub struct LinksArgs {
    pub citation: String,
    /// Include linked text
    #[arg(long)]
    pub with_text: bool,
}

#[derive(Args)]
pub struct TitlesArgs {
    #[arg(long)]
    pub categories: bool,
}
