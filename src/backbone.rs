//! The backbone driver (C6): the candidate-refinement loop that repeatedly drives the CDCL
//! engine (C4) under single-literal assumptions, per Janota–Lynce–Marques-Silva Algorithm 3.

use std::collections::BTreeSet;

use log::{debug, info};

use crate::config::BackboneConfig;
use crate::engine::{Engine, SolveResult};
use crate::error::EngineError;
use crate::formula::Formula;
use crate::ingest;
use crate::lit::Lit;

/// The partition of the relevant variables computed by [`compute`] (`spec.md` §3 "Backbone
/// result" / §6).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Backbone {
    /// Variables assigned true in every model.
    pub positive: BTreeSet<Box<str>>,
    /// Variables assigned false in every model.
    pub negative: BTreeSet<Box<str>>,
    /// Relevant variables that are neither: `relevant \ (positive ∪ negative)`.
    pub optional: BTreeSet<Box<str>>,
}

/// Computes the backbone of `engine`'s clause base extended with `restrictions`, projected onto
/// `relevant` (`spec.md` §4.3, §6).
///
/// Returns `Ok(None)` if the formula plus restrictions is unsatisfiable. A name in `relevant`
/// that `engine` has never seen is treated as unconstrained and reported as optional — open
/// question (b) in `spec.md` §9 (see `SPEC_FULL.md` §9 for why: `compute` has no way to add an
/// unseen variable to the clause base itself, since that is `ingest`'s job).
///
/// On every successful exit path (UNSAT or a computed backbone), `engine` is rolled back to
/// exactly the state it was in when this function was called (`spec.md` §5 "scoped state
/// discipline"). A fatal [`EngineError`] is never rolled back, since it signals the engine's
/// internal state is already inconsistent (`spec.md` §7).
pub fn compute(
    engine: &mut Engine,
    restrictions: &[Formula],
    relevant: &[&str],
    config: BackboneConfig,
) -> Result<Option<Backbone>, EngineError> {
    let checkpoint = engine.save_state();

    for restriction in restrictions {
        ingest::add_formula(engine, restriction)?;
    }

    match engine.solve(&[]) {
        SolveResult::Unsat => {
            debug!("backbone: formula plus restrictions is unsatisfiable");
            engine.load_state(checkpoint);
            return Ok(None);
        }
        SolveResult::Undef => {
            // `Engine::solve` never passes a decision budget, so an unbounded call can never
            // return `Undef`; if it does, something is badly wrong with the engine.
            return Err(EngineError::InvariantViolated(
                "unbounded solve() returned Undef".to_owned(),
            ));
        }
        SolveResult::Sat => {}
    }

    let mut positive: BTreeSet<Box<str>> = BTreeSet::new();
    let mut negative: BTreeSet<Box<str>> = BTreeSet::new();
    let mut candidates: Vec<Lit> = Vec::new();

    for &name in relevant {
        let var = match engine.get_var(name) {
            Some(var) => var,
            None => continue,
        };
        let model_value = match engine.model(var) {
            Some(value) => value,
            None => continue,
        };
        // The candidate literal encodes "the original model value is forced": committing it
        // later records exactly `model_value` for this variable (`spec.md` §4.3 algorithm note).
        let lit = var.lit(model_value);

        if config.initial_lb_check_for_up_zero_literals && engine.level(var) == 0 {
            commit(engine, lit, &mut positive, &mut negative);
            continue;
        }

        if config.initial_ub_check_for_rotatable_literals && engine.is_rotatable(lit) {
            continue;
        }

        candidates.push(lit);
    }

    while let Some(lit) = candidates.pop() {
        match engine.solve(&[!lit]) {
            SolveResult::Unsat => {
                commit(engine, lit, &mut positive, &mut negative);
            }
            // `spec.md` §5: the driver treats a budget-exhausted `Undef` identically to `Sat` —
            // neither proves `lit` forced, so it falls through to the same refinement.
            SolveResult::Sat | SolveResult::Undef => {
                refine_upper_bound(engine, &mut candidates, &mut positive, &mut negative, config);
            }
        }
    }

    let mut optional: BTreeSet<Box<str>> = BTreeSet::new();
    for &name in relevant {
        if !positive.contains(name) && !negative.contains(name) {
            optional.insert(name.into());
        }
    }

    info!(
        "backbone computed: {} positive, {} negative, {} optional",
        positive.len(),
        negative.len(),
        optional.len()
    );

    engine.load_state(checkpoint);
    Ok(Some(Backbone {
        positive,
        negative,
        optional,
    }))
}

/// Sweeps `candidates`, dropping (and sometimes committing) any for which an enabled heuristic
/// fires (`spec.md` §4.3 `refine_upper_bound`).
fn refine_upper_bound(
    engine: &mut Engine,
    candidates: &mut Vec<Lit>,
    positive: &mut BTreeSet<Box<str>>,
    negative: &mut BTreeSet<Box<str>>,
    config: BackboneConfig,
) {
    let mut i = 0;
    while i < candidates.len() {
        let lit = candidates[i];
        let var = lit.var();

        if config.check_for_up_zero_literals && engine.level(var) == 0 {
            candidates.remove(i);
            commit(engine, lit, positive, negative);
            continue;
        }

        if config.check_for_complement_model_literals && engine.model(var) == Some(!lit.is_positive())
        {
            // The latest model witnesses the complement of `lit`'s phase: both polarities are
            // achievable, so `lit` cannot be a backbone literal. Drop without committing.
            candidates.remove(i);
            continue;
        }

        if config.check_for_rotatable_literals && engine.is_rotatable(lit) {
            candidates.remove(i);
            continue;
        }

        i += 1;
    }
}

/// Records `lit` as a confirmed backbone literal and makes the engine permanently aware of the
/// commitment within the current checkpoint (`spec.md` §4.3 "Backbone literal addition").
fn commit(
    engine: &mut Engine,
    lit: Lit,
    positive: &mut BTreeSet<Box<str>>,
    negative: &mut BTreeSet<Box<str>>,
) {
    engine.add_clause(&[lit]);
    let name: Box<str> = engine.name_of(lit.var()).into();
    if lit.is_positive() {
        positive.insert(name);
    } else {
        negative.insert(name);
    }
}
