use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which communities a node (or community) is tried against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsiderComms {
    /// Every non-empty community.
    AllComms,
    /// Communities of the node's neighbours.
    #[default]
    AllNeighComms,
    /// One non-empty community chosen uniformly at random.
    RandComms,
    /// One neighbouring community chosen uniformly at random.
    RandNeighComms,
}

/// Local-search pass run at each level of `optimise_partition`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Routine {
    /// Move single nodes between communities.
    #[default]
    MoveNodes,
    /// Merge whole communities.
    MergeNodes,
}

/// Serializable optimiser settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimiserConfig {
    pub consider_comms: ConsiderComms,
    /// Offer one empty community as a candidate in `move_nodes`.
    pub consider_empty_community: bool,
    pub optimise_routine: Routine,
    /// Refine communities before aggregating.
    pub refine_partition: bool,
    pub refine_routine: Routine,
    pub refine_consider_comms: ConsiderComms,
    /// Largest community size (in original vertices) a move or merge may create.
    pub max_comm_size: Option<usize>,
    /// Maximum number of aggregation levels, the finest included.
    pub max_levels: Option<usize>,
    /// Maximum number of sweeps (or merge passes) per routine call.
    pub max_sweeps: usize,
    /// Seed for the random source; drawn from the OS when absent.
    pub seed: Option<u64>,
}

impl Default for OptimiserConfig {
    fn default() -> Self {
        Self {
            consider_comms: ConsiderComms::AllNeighComms,
            consider_empty_community: true,
            optimise_routine: Routine::MoveNodes,
            refine_partition: false,
            refine_routine: Routine::MergeNodes,
            refine_consider_comms: ConsiderComms::RandNeighComms,
            max_comm_size: None,
            max_levels: None,
            max_sweeps: 1000,
            seed: None,
        }
    }
}

impl OptimiserConfig {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::invalid("config", e.to_string()))
    }

    /// Reject settings no routine can run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_comm_size == Some(0) {
            return Err(Error::invalid("max_comm_size", "must be at least 1"));
        }
        if self.max_levels == Some(0) {
            return Err(Error::invalid("max_levels", "must be at least 1"));
        }
        if self.max_sweeps == 0 {
            return Err(Error::invalid("max_sweeps", "must be at least 1"));
        }
        Ok(())
    }
}

/// Greedy local search over a `Partition`, with multilevel aggregation.
///
/// The optimiser owns its random source; seed it with [`Optimiser::with_seed`]
/// for reproducible runs.
#[derive(Clone, Debug)]
pub struct Optimiser {
    pub(super) config: OptimiserConfig,
    pub(super) rng: StdRng,
}

impl Default for Optimiser {
    fn default() -> Self { Self::new() }
}

impl Optimiser {
    /// Optimiser with default settings and an OS-seeded random source.
    pub fn new() -> Self {
        Self { config: OptimiserConfig::default(), rng: StdRng::from_os_rng() }
    }

    /// Optimiser running with `config`.
    pub fn from_config(config: OptimiserConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self { config, rng })
    }

    /// Current settings.
    #[inline] pub fn config(&self) -> &OptimiserConfig { &self.config }

    /// Reseed the random source.
    pub fn set_seed(&mut self, seed: u64) {
        self.config.seed = Some(seed);
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.set_seed(seed);
        self
    }

    pub fn with_consider_comms(mut self, consider_comms: ConsiderComms) -> Self {
        self.config.consider_comms = consider_comms;
        self
    }

    pub fn with_consider_empty_community(mut self, consider: bool) -> Self {
        self.config.consider_empty_community = consider;
        self
    }

    pub fn with_optimise_routine(mut self, routine: Routine) -> Self {
        self.config.optimise_routine = routine;
        self
    }

    pub fn with_refine_partition(mut self, refine: bool) -> Self {
        self.config.refine_partition = refine;
        self
    }

    pub fn with_refine_routine(mut self, routine: Routine) -> Self {
        self.config.refine_routine = routine;
        self
    }

    pub fn with_refine_consider_comms(mut self, consider_comms: ConsiderComms) -> Self {
        self.config.refine_consider_comms = consider_comms;
        self
    }

    /// Cap community sizes; validated when a routine runs.
    pub fn with_max_comm_size(mut self, max_comm_size: Option<usize>) -> Self {
        self.config.max_comm_size = max_comm_size;
        self
    }

    pub fn with_max_levels(mut self, max_levels: Option<usize>) -> Self {
        self.config.max_levels = max_levels;
        self
    }

    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.config.max_sweeps = max_sweeps;
        self
    }

    /// Whether a community of `size` may grow by `extra` original vertices.
    #[inline]
    pub(super) fn fits(&self, size: usize, extra: usize) -> bool {
        self.config.max_comm_size.is_none_or(|max| size + extra <= max)
    }
}
