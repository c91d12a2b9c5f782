use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

const DEFAULT_GATEWAY: &str = "https://ipfs.io/ipfs";

#[derive(Parser)]
#[command(
    name = "cidgraph",
    about = "Materialize and compare content-addressed link graphs",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch a linked-object graph and write it as local JSON files
    Materialize(MaterializeArgs),
    /// Compare independently-submitted roots of the same logical record
    Compare(CompareArgs),
}

#[derive(Args)]
pub struct MaterializeArgs {
    /// Root content reference to materialize
    #[arg(required_unless_present = "transaction")]
    pub reference: Option<String>,

    #[arg(long, default_value = "out")]
    pub out: PathBuf,

    #[arg(long, default_value = DEFAULT_GATEWAY)]
    pub gateway: String,

    /// JSON file mapping data-group labels to canonical identifiers
    #[arg(long)]
    pub labels: Option<PathBuf>,

    /// JSON file of decoded transaction items (alternate input)
    #[arg(long, conflicts_with = "reference")]
    pub transaction: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompareArgs {
    /// Two or more root references believed to hold the same record
    pub refs: Vec<String>,

    #[arg(long, default_value = "")]
    pub record_id: String,

    #[arg(long, default_value = "")]
    pub group: String,

    #[arg(long, default_value = DEFAULT_GATEWAY)]
    pub gateway: String,
}
