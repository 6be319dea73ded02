//! Watch lists for two-watched-literal unit propagation.

use crate::clause::ClauseRef;
use crate::lit::Lit;

/// One entry of a literal's watch list: a clause watching that literal, paired with a "blocker"
/// literal from the same clause that, if already true, lets propagation skip the clause entirely
/// (`spec.md` §3).
#[derive(Copy, Clone, Debug)]
pub struct Watch {
    pub clause: ClauseRef,
    pub blocker: Lit,
}

/// Watch lists indexed by literal code (`spec.md` §3: "for each literal L, the set of clauses
/// watching it").
#[derive(Default)]
pub struct WatchLists {
    by_lit: Vec<Vec<Watch>>,
}

impl WatchLists {
    pub fn set_var_count(&mut self, count: usize) {
        self.by_lit.resize_with(count * 2, Vec::new);
    }

    pub fn get(&self, lit: Lit) -> &[Watch] {
        &self.by_lit[lit.code()]
    }

    pub fn add(&mut self, lit: Lit, watch: Watch) {
        self.by_lit[lit.code()].push(watch);
    }

    pub fn take(&mut self, lit: Lit) -> Vec<Watch> {
        std::mem::take(&mut self.by_lit[lit.code()])
    }

    pub fn put_back(&mut self, lit: Lit, watches: Vec<Watch>) {
        self.by_lit[lit.code()] = watches;
    }

    /// Rebuilds every watch list from scratch by scanning the clause arena.
    ///
    /// Used after a checkpoint restore (which truncates the clause arena and so invalidates any
    /// `ClauseRef`s past the truncation point) and after clause-database reduction.
    pub fn rebuild(&mut self, var_count: usize, clauses: &[crate::clause::Clause]) {
        self.by_lit.clear();
        self.by_lit.resize_with(var_count * 2, Vec::new);
        for (cref, clause) in clauses.iter().enumerate() {
            if clause.deleted || clause.len() < 2 {
                continue;
            }
            self.by_lit[clause.lits[0].code()].push(Watch {
                clause: cref,
                blocker: clause.lits[1],
            });
            self.by_lit[clause.lits[1].code()].push(Watch {
                clause: cref,
                blocker: clause.lits[0],
            });
        }
    }
}
