use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mandala", about = concat!("mandala v", env!("CARGO_PKG_VERSION"), " - nine cells, eighty-one ideas"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Read and write data in a different directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the whole tree, or one cell and its children, as an outline
    Show(ShowArgs),
    /// Show the nine cells of the root grid or of a main cell's grid
    Grid(GridArgs),
    /// Write the tree as a markdown outline
    Export(ExportArgs),
    /// Replace the tree with a markdown outline
    Import(ImportArgs),
    /// Set the title and/or content of a cell
    Set(SetArgs),
    /// Clear the text of a grid, or of every cell
    Clear(ClearArgs),
    /// Restore the starter tree
    Reset,
    /// View or change settings
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ShowArgs {
    /// Cell ID to show (default: the whole tree)
    pub id: Option<String>,
}

#[derive(Args)]
pub struct GridArgs {
    /// Main cell ID whose grid to show (default: the root grid)
    pub id: Option<String>,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file; `-` writes to stdout (default: mandala-YYYY-MM-DD.md)
    #[arg(short, long)]
    pub output: Option<String>,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ImportArgs {
    /// Markdown file to import
    pub file: String,
    /// Skip the AI rewrite even if it is enabled in settings
    #[arg(long)]
    pub no_ai: bool,
}

#[derive(Args)]
pub struct SetArgs {
    /// Cell ID to edit
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New content
    #[arg(long)]
    pub content: Option<String>,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Main cell ID whose grid to clear (default: the root grid)
    pub id: Option<String>,
    /// Clear every cell in the tree
    #[arg(long, conflicts_with = "id")]
    pub all: bool,
}

// ---------------------------------------------------------------------------
// Config subcommands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current settings
    Show,
    /// Change one setting
    Set(ConfigSetArgs),
    /// Print the settings file path
    Path,
    /// Add a custom model and select it
    AddModel(ConfigModelArgs),
    /// Remove a custom model
    RemoveModel(ConfigModelArgs),
    /// Restore every setting to its default
    Reset,
}

#[derive(Args)]
pub struct ConfigModelArgs {
    /// Model name as the provider expects it
    pub name: String,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    /// Setting name (e.g. ai_enabled, active_api, model)
    pub key: String,
    /// New value
    pub value: String,
}
