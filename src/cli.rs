use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "pubprops",
    version,
    about = "Annotation retrieval and physical-property reconciliation tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Fetch(FetchArgs),
    Reconcile(ReconcileArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    #[arg(long, default_value = ".cache/pubprops")]
    pub cache_root: PathBuf,

    #[arg(long, default_value = "Boiling Point")]
    pub annotation: String,

    #[arg(long, default_value = "Compound")]
    pub heading_type: String,

    #[arg(
        long,
        default_value = "https://pubchem.ncbi.nlm.nih.gov/rest/pug_view/annotations/heading"
    )]
    pub base_url: String,

    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    #[arg(long)]
    pub max_pages: Option<u32>,

    #[arg(long)]
    pub raw_pages_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ReconcileArgs {
    #[arg(long, default_value = ".cache/pubprops")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub raw_pages_path: Option<PathBuf>,

    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long)]
    pub run_manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = 2.0)]
    pub max_std_dev: f64,

    #[arg(long, value_enum, default_value_t = GroupingMode::PerPressure)]
    pub grouping: GroupingMode,

    #[arg(long, value_enum, default_value_t = MultiRecordPolicy::Merge)]
    pub multi_record: MultiRecordPolicy,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum GroupingMode {
    PerPressure,
    Global,
}

impl GroupingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PerPressure => "per-pressure",
            Self::Global => "global",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum MultiRecordPolicy {
    Merge,
    Reject,
}

impl MultiRecordPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Reject => "reject",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/pubprops")]
    pub cache_root: PathBuf,
}
