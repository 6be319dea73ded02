//! Solver and backbone-extraction configuration.

/// Configurable parameters used during CDCL search.
///
/// Mirrors the shape of the teacher's `varisat::config::SolverConfig`.
#[derive(Clone, Copy, Debug)]
pub struct SolverConfig {
    /// Multiplicative decay for the VSIDS decision heuristic. (Default: 0.95)
    pub vsids_decay: f32,
    /// Multiplicative decay for clause activities. (Default: 0.999)
    pub clause_activity_decay: f32,
    /// Scaling factor for the Luby-sequence restart schedule, in conflicts. (Default: 100)
    pub luby_restart_interval_scale: u64,
    /// Number of conflicts between learnt clause database reductions. (Default: 2000)
    pub reduce_interval: u64,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            vsids_decay: 0.95,
            clause_activity_decay: 0.999,
            luby_restart_interval_scale: 100,
            reduce_interval: 2000,
        }
    }
}

/// Toggles for the five candidate-pruning heuristics used by the backbone driver (C6/C7,
/// `spec.md` §4.4). All flags default to on; soundness and completeness hold for every subset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackboneConfig {
    /// Before the main loop, drop any candidate that is rotatable in the initial model.
    pub initial_ub_check_for_rotatable_literals: bool,
    /// Before the main loop, commit as backbone any relevant variable fixed at level 0.
    pub initial_lb_check_for_up_zero_literals: bool,
    /// During refinement, commit candidates now at level 0.
    pub check_for_up_zero_literals: bool,
    /// During refinement, drop candidates contradicted by the most recent SAT model.
    pub check_for_complement_model_literals: bool,
    /// During refinement, drop rotatable candidates.
    pub check_for_rotatable_literals: bool,
}

impl Default for BackboneConfig {
    fn default() -> BackboneConfig {
        BackboneConfig {
            initial_ub_check_for_rotatable_literals: true,
            initial_lb_check_for_up_zero_literals: true,
            check_for_up_zero_literals: true,
            check_for_complement_model_literals: true,
            check_for_rotatable_literals: true,
        }
    }
}

impl BackboneConfig {
    /// All heuristics disabled: only the per-candidate assumption-guarded SAT calls are used.
    /// Slower, but a useful baseline for `config_independence` tests (`spec.md` §8).
    pub fn none() -> BackboneConfig {
        BackboneConfig {
            initial_ub_check_for_rotatable_literals: false,
            initial_lb_check_for_up_zero_literals: false,
            check_for_up_zero_literals: false,
            check_for_complement_model_literals: false,
            check_for_rotatable_literals: false,
        }
    }
}
