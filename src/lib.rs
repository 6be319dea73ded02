//! Incremental backbone extraction for propositional formulas, built on a small CDCL SAT engine.
//!
//! Given a formula F and a set of relevant variables, [`backbone::compute`] partitions the
//! relevant variables into the ones forced true in every model of F (positive backbone), forced
//! false in every model (negative backbone), and the rest (optional). See `SPEC_FULL.md` for the
//! full design and `DESIGN.md` for how each part of this crate is grounded.
//!
//! No logger is installed by this crate; a binary or test harness that wants to see the
//! `trace!`/`debug!`/`info!` output should install one (e.g. `env_logger`).

pub mod backbone;
pub mod clause;
pub mod config;
pub mod engine;
pub mod error;
pub mod formula;
pub mod ingest;
pub mod lit;
pub mod variables;
pub mod watch;

mod analyze_conflict;
mod decision;
mod incremental;
mod prop;
mod schedule;

pub use backbone::{compute, Backbone};
pub use clause::{Clause, ClauseRef};
pub use config::{BackboneConfig, SolverConfig};
pub use engine::{Checkpoint, Engine, SolveResult};
pub use error::EngineError;
pub use formula::Formula;
pub use lit::{Lit, Var};
pub use variables::Reason;
pub use watch::Watch;
