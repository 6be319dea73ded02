//! Clause storage.
//!
//! Clauses are kept in a single growable arena (`Engine::clauses`) and referenced by their index.
//! This trades the teacher's packed, unsafe `ClauseAlloc` (`varisat/src/clause/alloc.rs`) for a
//! plain `Vec<Clause>` — see `DESIGN.md` for why that simplification fits this crate's scale.

use crate::lit::Lit;

/// A reference to a clause stored in an [`Engine`](crate::engine::Engine)'s clause arena.
pub type ClauseRef = usize;

/// A clause: a disjunction of literals, plus the bookkeeping `spec.md` §3 asks for.
#[derive(Clone, Debug)]
pub struct Clause {
    /// The clause's literals. For watched (len >= 2) clauses the first two entries are always the
    /// two watched literals (`spec.md` §3 invariant).
    pub lits: Vec<Lit>,
    /// Added by conflict analysis rather than being part of the original/restriction formula.
    pub learnt: bool,
    /// Activity bumped by [`ClauseActivity::bump`] every time this clause is resolved through
    /// during conflict analysis, used to pick reduction candidates.
    pub activity: f32,
    /// Set by clause-database reduction; a deleted clause's watches have been removed and it is
    /// never revisited. Kept in place (rather than removed from the arena) so `ClauseRef`s stay
    /// stable.
    pub deleted: bool,
}

impl Clause {
    pub fn new(lits: Vec<Lit>, learnt: bool) -> Clause {
        Clause {
            lits,
            learnt,
            activity: 0.0,
            deleted: false,
        }
    }

    pub fn len(&self) -> usize {
        self.lits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }
}

/// Global state for clause activity bumping and decay, ported from
/// `varisat::clause::activity::ClauseActivity`: individual activities live on each [`Clause`],
/// this just tracks the shared bump amount and decay factor.
pub struct ClauseActivity {
    bump: f32,
    inv_decay: f32,
}

impl Default for ClauseActivity {
    fn default() -> ClauseActivity {
        ClauseActivity {
            bump: 1.0,
            inv_decay: 1.0 / 0.999,
        }
    }
}

impl ClauseActivity {
    fn rescale_limit() -> f32 {
        std::f32::MAX / 16.0
    }

    pub fn set_decay(&mut self, decay: f32) {
        assert!(decay < 1.0);
        assert!(decay > 1.0 / 16.0);
        self.inv_decay = 1.0 / decay;
    }

    /// Bumps `cref`'s activity, rescaling every clause's activity if it would overflow.
    pub fn bump(&mut self, clauses: &mut [Clause], cref: ClauseRef) {
        let activity = clauses[cref].activity + self.bump;
        clauses[cref].activity = activity;
        if activity >= Self::rescale_limit() {
            self.rescale(clauses);
        }
    }

    /// Scales up the bump amount applied by future bumps, equivalent to decaying every existing
    /// activity (the same trick `Vsids::decay` uses for variable activity).
    pub fn decay(&mut self, clauses: &mut [Clause]) {
        self.bump *= self.inv_decay;
        if self.bump >= Self::rescale_limit() {
            self.rescale(clauses);
        }
    }

    fn rescale(&mut self, clauses: &mut [Clause]) {
        let rescale_factor = 1.0 / Self::rescale_limit();
        for clause in clauses.iter_mut() {
            clause.activity *= rescale_factor;
        }
        self.bump *= rescale_factor;
    }
}
