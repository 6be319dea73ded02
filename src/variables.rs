//! Per-variable assignment state and the name/index mapping.

use rustc_hash::FxHashMap;

use crate::clause::ClauseRef;
use crate::lit::{Lit, Var};

/// Why a variable currently has the value it has.
///
/// `Decision` covers both VSIDS decisions and assumption literals pushed onto the trail: neither
/// has a propagating clause, which is exactly the `reason = ⊥` case from `spec.md` §3 and the
/// precondition for a literal being rotatable (`spec.md` §4.3).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Reason {
    Decision,
    Clause(ClauseRef),
}

impl Reason {
    pub fn is_decision(self) -> bool {
        matches!(self, Reason::Decision)
    }
}

/// Per-variable assignment record (`spec.md` §3 "Variable record").
#[derive(Clone, Debug)]
pub struct VarRecord {
    pub value: Option<bool>,
    /// Decision level, -1 if unassigned. 0 means unit-propagated (or unconditionally asserted) at
    /// the root.
    pub level: i32,
    pub reason: Reason,
    /// Polarity used the next time this variable is picked as a decision.
    pub saved_phase: bool,
    /// Whether this variable is ever picked as a decision (VSIDS). Set by `new_var`.
    pub decision: bool,
}

impl Default for VarRecord {
    fn default() -> VarRecord {
        VarRecord {
            value: None,
            level: -1,
            reason: Reason::Decision,
            saved_phase: false,
            decision: true,
        }
    }
}

/// Bidirectional variable name ↔ index mapping, assigning a dense index to each name the first
/// time it is seen (`spec.md` §3 "Variable index").
#[derive(Default)]
pub struct VarNames {
    name_to_index: FxHashMap<Box<str>, usize>,
    index_to_name: Vec<Box<str>>,
}

impl VarNames {
    pub fn len(&self) -> usize {
        self.index_to_name.len()
    }

    /// Looks up the index for `name`, allocating a new one if this is the first time it is seen.
    /// Returns the index and whether it was newly allocated.
    pub fn intern(&mut self, name: &str) -> (usize, bool) {
        if let Some(&index) = self.name_to_index.get(name) {
            return (index, false);
        }
        let index = self.index_to_name.len();
        self.index_to_name.push(name.into());
        self.name_to_index.insert(name.into(), index);
        (index, true)
    }

    /// Looks up the index for `name` without allocating.
    pub fn get(&self, name: &str) -> Option<Var> {
        self.name_to_index.get(name).map(|&i| Var::from_index(i))
    }

    pub fn name_of(&self, var: Var) -> &str {
        &self.index_to_name[var.index()]
    }

    pub fn truncate(&mut self, count: usize) {
        for name in self.index_to_name.drain(count..) {
            self.name_to_index.remove(&*name);
        }
    }
}

/// Looks up the current value of a literal given the variable value table.
#[inline]
pub fn lit_value(vars: &[VarRecord], lit: Lit) -> Option<bool> {
    vars[lit.var().index()]
        .value
        .map(|value| value == lit.is_positive())
}
