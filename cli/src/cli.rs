use std::path::PathBuf;

use louvain::{ConsiderComms, QualityKind};

/// Multilevel community detection on edge-list graphs
#[derive(clap::Parser, Debug)]
#[command(name = "louvain", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Partition a graph read from an edge list
    Optimise(OptimiseArgs),
}

#[derive(clap::Args, Debug)]
pub struct OptimiseArgs {
    /// Edge list, one `u v [w]` per line ("-" for stdin)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub edges: PathBuf,

    /// Output file, defaults to stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Csv)]
    pub format: Format,

    /// Quality function to maximise
    #[arg(short, long, value_enum, default_value_t = QualityKind::default().into())]
    pub quality: Quality,

    /// Resolution parameter
    #[arg(short, long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub resolution: f64,

    /// Treat edges as directed arcs
    #[arg(long)]
    pub directed: bool,

    /// Ignore edge weights (every edge counts 1)
    #[arg(long)]
    pub unweighted: bool,

    /// Candidate communities for each node
    #[arg(long, value_enum)]
    pub consider_comms: Option<Consider>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum number of aggregation levels
    #[arg(long)]
    pub max_levels: Option<usize>,

    /// Refine communities before aggregating
    #[arg(long)]
    pub refine: bool,

    /// JSON optimiser settings; flags given on the command line take precedence
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quality {
    Cpm,
    Modularity,
    RbConfiguration,
    Rber,
}

impl From<QualityKind> for Quality {
    fn from(kind: QualityKind) -> Self {
        match kind {
            QualityKind::Cpm => Quality::Cpm,
            QualityKind::Modularity => Quality::Modularity,
            QualityKind::RbConfiguration => Quality::RbConfiguration,
            QualityKind::Rber => Quality::Rber,
        }
    }
}

impl From<Quality> for QualityKind {
    fn from(quality: Quality) -> Self {
        match quality {
            Quality::Cpm => QualityKind::Cpm,
            Quality::Modularity => QualityKind::Modularity,
            Quality::RbConfiguration => QualityKind::RbConfiguration,
            Quality::Rber => QualityKind::Rber,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Consider {
    All,
    AllNeigh,
    Rand,
    RandNeigh,
}

impl From<Consider> for ConsiderComms {
    fn from(consider: Consider) -> Self {
        match consider {
            Consider::All => ConsiderComms::AllComms,
            Consider::AllNeigh => ConsiderComms::AllNeighComms,
            Consider::Rand => ConsiderComms::RandComms,
            Consider::RandNeigh => ConsiderComms::RandNeighComms,
        }
    }
}
