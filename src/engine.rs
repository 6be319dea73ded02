//! The CDCL engine (C4): the state machine the backbone driver (C6) drives.
//!
//! Modeled as a single struct whose fields are only reachable through the introspection and
//! mutation functions below — no subclassing, unlike the teacher's `SolverExt` style. Where the
//! teacher splits `Context` into borrow-checker-friendly "parts" via the `partial_ref` crate, this
//! engine instead exposes its search loop as ordinary methods and lets its few genuinely
//! performance-sensitive routines (`propagate`, `analyze_conflict`) take disjoint `&mut` borrows of
//! individual fields directly — the same decoupling `partial_ref` buys, without the extra
//! dependency (see `DESIGN.md`).

use log::{debug, trace};

use crate::analyze_conflict::analyze_conflict;
use crate::clause::{Clause, ClauseActivity, ClauseRef};
use crate::config::SolverConfig;
use crate::decision::Vsids;
use crate::incremental::{enqueue_assumption, EnqueueAssumption};
use crate::lit::{Lit, Var};
use crate::prop::{propagate, unchecked_enqueue};
use crate::schedule::RestartSchedule;
use crate::variables::{lit_value, Reason, VarNames, VarRecord};
use crate::watch::{Watch, WatchLists};

/// The three outcomes a (possibly budgeted) `solve` call can produce (`spec.md` §5).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SolveResult {
    Sat,
    Unsat,
    /// The decision budget was exhausted before a verdict was reached.
    Undef,
}

/// A saved engine state that a later `load_state` can restore to verbatim (`spec.md` §3 "Engine
/// checkpoint").
#[derive(Copy, Clone, Debug)]
pub struct Checkpoint {
    clause_count: usize,
    var_count: usize,
    root_len: usize,
    name_count: usize,
}

/// A CDCL based SAT engine with incremental (assumption based) solving and checkpoint/restore.
pub struct Engine {
    vars: Vec<VarRecord>,
    clauses: Vec<Clause>,
    watches: WatchLists,
    trail: Vec<Lit>,
    trail_lim: Vec<usize>,
    qhead: usize,
    vsids: Vsids,
    clause_activity: ClauseActivity,
    var_flags_scratch: Vec<bool>,
    names: VarNames,
    model: Vec<Option<bool>>,
    root_unsat: bool,
    assumptions: Vec<Lit>,
    /// Number of decision levels currently forced by assumptions (as opposed to search
    /// decisions), updated every time `incremental::enqueue_assumption` succeeds.
    assumption_levels: usize,
    config: SolverConfig,
    restart_schedule: RestartSchedule,
    reduce_counter: u64,
    conflicts_total: u64,
}

impl Default for Engine {
    fn default() -> Engine {
        let config = SolverConfig::default();
        let mut vsids = Vsids::default();
        vsids.set_decay(config.vsids_decay);
        let mut clause_activity = ClauseActivity::default();
        clause_activity.set_decay(config.clause_activity_decay);
        Engine {
            vars: Vec::new(),
            clauses: Vec::new(),
            watches: WatchLists::default(),
            trail: Vec::new(),
            trail_lim: Vec::new(),
            qhead: 0,
            vsids,
            clause_activity,
            var_flags_scratch: Vec::new(),
            names: VarNames::default(),
            model: Vec::new(),
            root_unsat: false,
            assumptions: Vec::new(),
            assumption_levels: 0,
            restart_schedule: RestartSchedule::new(config.luby_restart_interval_scale),
            config,
            reduce_counter: 0,
            conflicts_total: 0,
        }
    }
}

impl Engine {
    pub fn new() -> Engine {
        Engine::default()
    }

    pub fn with_config(config: SolverConfig) -> Engine {
        let mut engine = Engine::new();
        engine.restart_schedule = RestartSchedule::new(config.luby_restart_interval_scale);
        engine.vsids.set_decay(config.vsids_decay);
        engine.clause_activity.set_decay(config.clause_activity_decay);
        engine.config = config;
        engine
    }

    /// Number of variables currently known to the engine.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Allocates a new variable.
    ///
    /// `polarity` is the initial saved phase used the first time the variable is picked as a
    /// decision. `decision` controls whether the variable is ever picked as a decision at all —
    /// variables that exist only to be driven by propagation (e.g. Tseitin auxiliaries from CNF
    /// conversion) can be excluded from the VSIDS heap (`spec.md` §4.1).
    pub fn new_var(&mut self, polarity: bool, decision: bool) -> Var {
        let index = self.vars.len();
        self.vars.push(VarRecord {
            saved_phase: polarity,
            decision,
            ..VarRecord::default()
        });
        self.var_flags_scratch.push(false);
        self.watches.set_var_count(self.vars.len());
        let make_available = |_: usize| decision;
        self.vsids.set_var_count(self.vars.len(), make_available);
        Var::from_index(index)
    }

    /// Looks up the variable for `name`, allocating a new decision variable if this is the first
    /// time it is seen (C5's "if absent, a new variable is allocated").
    pub fn intern_var(&mut self, name: &str) -> Var {
        let (index, fresh) = self.names.intern(name);
        if fresh {
            debug_assert_eq!(index, self.vars.len());
            self.new_var(false, true);
        }
        Var::from_index(index)
    }

    /// Looks up the variable for `name` without allocating one.
    pub fn get_var(&self, name: &str) -> Option<Var> {
        self.names.get(name)
    }

    pub fn name_of(&self, var: Var) -> &str {
        self.names.name_of(var)
    }

    /// Installs a clause into the permanent base (C4 `add_clause`).
    ///
    /// Sorts and deduplicates literals and drops trivially tautological clauses. A unit clause is
    /// assigned immediately at level 0 and propagated. Returns `false` iff the base is now
    /// unsatisfiable at the root.
    pub fn add_clause(&mut self, lits: &[Lit]) -> bool {
        if self.root_unsat {
            return false;
        }

        let mut lits: Vec<Lit> = lits.to_vec();
        lits.sort_unstable();
        lits.dedup();

        // A sorted clause is tautological iff some literal is immediately followed by its own
        // negation: negation only flips the low bit of the packed code, so `l` and `!l` are
        // always adjacent once sorted by code.
        if lits.windows(2).any(|w| w[0] == !w[1]) {
            return true;
        }

        if lits.is_empty() {
            debug!("empty clause added: clause base is unsatisfiable");
            self.root_unsat = true;
            return false;
        }

        if lits.len() == 1 {
            let lit = lits[0];
            match lit_value(&self.vars, lit) {
                Some(true) => return true,
                Some(false) => {
                    self.root_unsat = true;
                    return false;
                }
                None => {}
            }
            let cref = self.clauses.len();
            self.clauses.push(Clause::new(lits, false));
            unchecked_enqueue(&mut self.vars, &mut self.vsids, &mut self.trail, lit, 0, Reason::Clause(cref));
            if propagate(
                &mut self.vars,
                &mut self.vsids,
                &mut self.clauses,
                &mut self.watches,
                &mut self.trail,
                &mut self.qhead,
            )
            .is_some()
            {
                trace!("root-level unit propagation conflict");
                self.root_unsat = true;
                return false;
            }
            return true;
        }

        let cref = self.clauses.len();
        self.watches.add(
            lits[0],
            Watch {
                clause: cref,
                blocker: lits[1],
            },
        );
        self.watches.add(
            lits[1],
            Watch {
                clause: cref,
                blocker: lits[0],
            },
        );
        self.clauses.push(Clause::new(lits, false));
        true
    }

    fn current_level(&self) -> usize {
        self.trail_lim.len()
    }

    fn backtrack_to(&mut self, level: usize) {
        while self.trail_lim.len() > level {
            let boundary = self.trail_lim.pop().unwrap();
            while self.trail.len() > boundary {
                let lit = self.trail.pop().unwrap();
                let var = lit.var();
                let decision = self.vars[var.index()].decision;
                let rec = &mut self.vars[var.index()];
                rec.value = None;
                rec.level = -1;
                rec.reason = Reason::Decision;
                if decision {
                    self.vsids.make_available(var);
                }
            }
        }
        self.qhead = self.qhead.min(self.trail.len());
    }

    /// Checks the satisfiability of the clause base under the given assumptions.
    pub fn solve(&mut self, assumptions: &[Lit]) -> SolveResult {
        self.solve_with_budget(assumptions, None)
    }

    /// As [`Engine::solve`], but aborts with [`SolveResult::Undef`] if more than `budget`
    /// decisions are made (`spec.md` §5's "optional decision-count budget per `solve`").
    pub fn solve_with_budget(&mut self, assumptions: &[Lit], budget: Option<u64>) -> SolveResult {
        if self.root_unsat {
            return SolveResult::Unsat;
        }

        self.backtrack_to(0);
        self.assumptions.clear();
        self.assumptions.extend_from_slice(assumptions);
        self.assumption_levels = 0;

        let mut decisions = 0u64;

        loop {
            let conflict = propagate(
                &mut self.vars,
                &mut self.vsids,
                &mut self.clauses,
                &mut self.watches,
                &mut self.trail,
                &mut self.qhead,
            );

            if let Some(conflict) = conflict {
                let level = self.current_level();
                if level == 0 {
                    debug!("root-level conflict: clause base is unsatisfiable");
                    self.root_unsat = true;
                    self.backtrack_to(0);
                    return SolveResult::Unsat;
                }

                let analysis = analyze_conflict(
                    &self.vars,
                    &self.clauses,
                    &self.trail,
                    level,
                    conflict,
                    &mut self.var_flags_scratch,
                );

                if analysis.backtrack_level < self.assumption_levels {
                    trace!("conflict resolves below the assumption levels: unsat under assumptions");
                    self.backtrack_to(0);
                    return SolveResult::Unsat;
                }

                for &v in &analysis.bumped {
                    self.vsids.bump(v);
                }
                self.vsids.decay();

                for &cref in &analysis.involved {
                    self.clause_activity.bump(&mut self.clauses, cref);
                }
                self.clause_activity.decay(&mut self.clauses);

                self.backtrack_to(analysis.backtrack_level);

                let uip = analysis.clause[0];
                let cref = self.clauses.len();
                if analysis.clause.len() > 1 {
                    self.watches.add(
                        analysis.clause[0],
                        Watch {
                            clause: cref,
                            blocker: analysis.clause[1],
                        },
                    );
                    self.watches.add(
                        analysis.clause[1],
                        Watch {
                            clause: cref,
                            blocker: analysis.clause[0],
                        },
                    );
                }
                self.clauses.push(Clause::new(analysis.clause, true));

                let level = self.current_level() as i32;
                unchecked_enqueue(
                    &mut self.vars,
                    &mut self.vsids,
                    &mut self.trail,
                    uip,
                    level,
                    Reason::Clause(cref),
                );

                self.conflicts_total += 1;
                if self.restart_schedule.conflict() {
                    debug!("restart after {} conflicts", self.conflicts_total);
                    self.backtrack_to(self.assumption_levels);
                }
                self.reduce_counter += 1;
                if self.reduce_counter >= self.config.reduce_interval {
                    self.reduce_counter = 0;
                    self.reduce_clause_db();
                }
                continue;
            }

            match enqueue_assumption(
                &mut self.assumptions,
                &mut self.vars,
                &mut self.vsids,
                &mut self.trail,
                &mut self.trail_lim,
            ) {
                EnqueueAssumption::Conflict => {
                    self.backtrack_to(0);
                    return SolveResult::Unsat;
                }
                EnqueueAssumption::Enqueued => {
                    self.assumption_levels = self.trail_lim.len();
                    continue;
                }
                EnqueueAssumption::Done => {}
            }

            match self.vsids.pop() {
                None => {
                    self.capture_model();
                    return SolveResult::Sat;
                }
                Some(var) => {
                    if let Some(budget) = budget {
                        if decisions >= budget {
                            self.vsids.make_available(var);
                            return SolveResult::Undef;
                        }
                    }
                    decisions += 1;
                    self.trail_lim.push(self.trail.len());
                    let level = self.trail_lim.len() as i32;
                    let polarity = self.vars[var.index()].saved_phase;
                    unchecked_enqueue(
                        &mut self.vars,
                        &mut self.vsids,
                        &mut self.trail,
                        var.lit(polarity),
                        level,
                        Reason::Decision,
                    );
                }
            }
        }
    }

    fn capture_model(&mut self) {
        self.model.clear();
        self.model
            .extend(self.vars.iter().map(|record| record.value));
    }

    /// Removes about half of the learnt clauses, preferring to keep high-activity ones, and never
    /// removing a clause that is currently the reason for an assignment ("locked", `spec.md` §3).
    fn reduce_clause_db(&mut self) {
        let mut candidates: Vec<ClauseRef> = self
            .clauses
            .iter()
            .enumerate()
            .filter(|(cref, clause)| {
                clause.learnt
                    && !clause.deleted
                    && clause.len() > 2
                    && !is_locked(&self.vars, &self.clauses, *cref)
            })
            .map(|(cref, _)| cref)
            .collect();

        candidates.sort_unstable_by(|&a, &b| {
            self.clauses[a]
                .activity
                .partial_cmp(&self.clauses[b].activity)
                .unwrap()
        });

        let to_delete = candidates.len() / 2;
        for &cref in candidates.iter().take(to_delete) {
            self.clauses[cref].deleted = true;
            self.clauses[cref].lits.clear();
        }

        if to_delete > 0 {
            self.watches.rebuild(self.vars.len(), &self.clauses);
        }
    }

    /// Captures a checkpoint of the engine's current state (`spec.md` §3 "Engine checkpoint").
    ///
    /// Must be called at decision level 0 (true on entry and after every `compute` call).
    pub fn save_state(&self) -> Checkpoint {
        debug_assert_eq!(self.current_level(), 0);
        Checkpoint {
            clause_count: self.clauses.len(),
            var_count: self.vars.len(),
            root_len: self.trail.len(),
            name_count: self.names.len(),
        }
    }

    /// Restores the engine to a previously saved checkpoint, undoing every clause, variable and
    /// assignment added since.
    pub fn load_state(&mut self, checkpoint: Checkpoint) {
        self.backtrack_to(0);
        while self.trail.len() > checkpoint.root_len {
            let lit = self.trail.pop().unwrap();
            let var = lit.var();
            let rec = &mut self.vars[var.index()];
            rec.value = None;
            rec.level = -1;
            rec.reason = Reason::Decision;
        }
        self.qhead = self.trail.len();

        self.clauses.truncate(checkpoint.clause_count);
        self.vars.truncate(checkpoint.var_count);
        self.var_flags_scratch.truncate(checkpoint.var_count);
        self.names.truncate(checkpoint.name_count);
        self.vsids.truncate(checkpoint.var_count);
        self.watches.rebuild(checkpoint.var_count, &self.clauses);
        self.root_unsat = false;
        self.assumptions.clear();
    }

    pub fn value(&self, var: Var) -> Option<bool> {
        self.vars[var.index()].value
    }

    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        lit_value(&self.vars, lit)
    }

    pub fn level(&self, var: Var) -> i32 {
        self.vars[var.index()].level
    }

    pub fn reason(&self, var: Var) -> Reason {
        self.vars[var.index()].reason
    }

    pub fn watches(&self, lit: Lit) -> &[Watch] {
        self.watches.get(lit)
    }

    /// The variable's value in the model captured at the last `Sat` result, if any.
    pub fn model(&self, var: Var) -> Option<bool> {
        self.model.get(var.index()).copied().flatten()
    }

    /// Whether `lit` is rotatable in the current assignment (`spec.md` §4.3): it is currently
    /// true, was not unit propagated, and no clause currently watching it would become unit (and
    /// hence falsified) if `lit` were flipped to false.
    ///
    /// `spec.md` phrases the second condition as "no clause watching `¬L` is unit under `L`", but
    /// only clauses that watch `L` itself — not `¬L` — can lose a satisfying literal when `L` is
    /// flipped (a clause containing `¬L` only gains a satisfied literal on that flip). This
    /// implementation checks clauses watching `L`, which is the reading that keeps the heuristic
    /// sound; see `DESIGN.md`.
    pub fn is_rotatable(&self, lit: Lit) -> bool {
        if self.value(lit.var()) != Some(lit.is_positive()) {
            return false;
        }
        if !self.reason(lit.var()).is_decision() {
            return false;
        }
        !self
            .watches(lit)
            .iter()
            .any(|watch| clause_is_unit_under(&self.clauses[watch.clause], &self.vars, lit))
    }
}

/// A clause is "unit under `lit`" iff every literal other than `lit` itself is currently false —
/// i.e. flipping `lit` to false would turn this clause into a conflict.
fn clause_is_unit_under(clause: &Clause, vars: &[VarRecord], lit: Lit) -> bool {
    clause
        .lits
        .iter()
        .all(|&l| l == lit || lit_value(vars, l) == Some(false))
}

/// A clause is locked iff its first literal is currently assigned with this clause as the
/// reason (`spec.md` §3).
fn is_locked(vars: &[VarRecord], clauses: &[Clause], cref: ClauseRef) -> bool {
    let clause = &clauses[cref];
    if clause.lits.is_empty() {
        return false;
    }
    let var = clause.lits[0].var();
    vars[var.index()].value.is_some() && vars[var.index()].reason == Reason::Clause(cref)
}
