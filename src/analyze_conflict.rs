//! Learns a new clause by analyzing a conflict (first-UIP scheme).
//!
//! Ported in spirit from `varisat::analyze_conflict`: walk the trail backward from the conflict,
//! resolving away every literal at the current decision level except one (the "unique implication
//! point"), and push literals from earlier levels straight into the learned clause. The scan stops
//! the moment a single current-level literal remains, which is exactly the first-UIP clause.

use crate::clause::{Clause, ClauseRef};
use crate::lit::{Lit, Var};
use crate::variables::{Reason, VarRecord};

/// Result of analyzing a conflict: the learned clause (with the asserting literal at index 0),
/// the level to backtrack to before asserting it, the variables whose activity should be bumped,
/// and the clauses resolved through (whose activity should be bumped too).
pub struct Analysis {
    pub clause: Vec<Lit>,
    pub backtrack_level: usize,
    pub bumped: Vec<Var>,
    pub involved: Vec<ClauseRef>,
}

/// Flags (scratch space, all `false` on entry, guaranteed `false` again on exit) that a variable
/// is present in the clause currently being built.
pub fn analyze_conflict(
    vars: &[VarRecord],
    clauses: &[Clause],
    trail: &[Lit],
    current_level: usize,
    conflict: ClauseRef,
    var_flags: &mut [bool],
) -> Analysis {
    let mut clause: Vec<Lit> = Vec::new();
    let mut current_level_count = 0usize;
    let mut bumped: Vec<Var> = Vec::new();
    let mut involved: Vec<ClauseRef> = Vec::new();

    if current_level == 0 {
        // A conflict with no decisions means the clause base is unsatisfiable outright.
        return Analysis {
            clause,
            backtrack_level: 0,
            bumped,
            involved,
        };
    }

    let mut add_literal = |lit: Lit,
                            vars: &[VarRecord],
                            var_flags: &mut [bool],
                            clause: &mut Vec<Lit>,
                            current_level_count: &mut usize,
                            bumped: &mut Vec<Var>| {
        let var = lit.var();
        if var_flags[var.index()] {
            return;
        }
        let level = vars[var.index()].level;
        if level < 0 {
            return;
        }
        var_flags[var.index()] = true;
        bumped.push(var);
        if level == 0 {
            return;
        }
        if level as usize == current_level {
            *current_level_count += 1;
        } else {
            clause.push(lit);
        }
    };

    involved.push(conflict);
    for &lit in &clauses[conflict].lits {
        add_literal(
            lit,
            vars,
            var_flags,
            &mut clause,
            &mut current_level_count,
            &mut bumped,
        );
    }

    let mut idx = trail.len();
    loop {
        idx -= 1;
        let lit = trail[idx];
        if !var_flags[lit.var().index()] {
            continue;
        }
        var_flags[lit.var().index()] = false;
        current_level_count -= 1;
        if current_level_count == 0 {
            clause.push(!lit);
            let last = clause.len() - 1;
            clause.swap(0, last);
            break;
        }
        match vars[lit.var().index()].reason {
            Reason::Decision => unreachable!("flagged current-level literal must have a reason"),
            Reason::Clause(cref) => {
                involved.push(cref);
                for &reason_lit in clauses[cref].lits.iter().skip(1) {
                    add_literal(
                        reason_lit,
                        vars,
                        var_flags,
                        &mut clause,
                        &mut current_level_count,
                        &mut bumped,
                    );
                }
            }
        }
    }

    let backtrack_level = clause[1..]
        .iter()
        .map(|lit| vars[lit.var().index()].level)
        .max()
        .unwrap_or(-1)
        .max(0) as usize;

    Analysis {
        clause,
        backtrack_level,
        bumped,
        involved,
    }
}
