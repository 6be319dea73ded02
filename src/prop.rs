//! Unit propagation and assignment.

use crate::clause::{Clause, ClauseRef};
use crate::decision::Vsids;
use crate::lit::Lit;
use crate::variables::{lit_value, Reason, VarRecord};
use crate::watch::{Watch, WatchLists};

/// Pushes `lit` onto the trail with the given level and reason, without checking for conflicts.
/// The caller must already know `lit` is unassigned (or assigning a value consistent with its
/// current one). Also removes the variable from the decision heap: an assigned variable is never
/// a valid decision candidate until a later backtrack makes it available again.
pub fn unchecked_enqueue(
    vars: &mut [VarRecord],
    vsids: &mut Vsids,
    trail: &mut Vec<Lit>,
    lit: Lit,
    level: i32,
    reason: Reason,
) {
    let var = &mut vars[lit.var().index()];
    var.value = Some(lit.is_positive());
    var.level = level;
    var.reason = reason;
    var.saved_phase = lit.is_positive();
    trail.push(lit);
    vsids.remove(lit.var());
}

/// Propagates all consequences of the assignments already on the trail from `*qhead` onward.
///
/// Standard two-watched-literal propagation: for each newly falsified literal, every clause
/// watching it is inspected and either re-watches a non-false literal, propagates its other
/// watched literal, or (if no alternative exists and the other watch is false too) reports a
/// conflict. Returns the conflicting clause, if any.
pub fn propagate(
    vars: &mut [VarRecord],
    vsids: &mut Vsids,
    clauses: &mut Vec<Clause>,
    watches: &mut WatchLists,
    trail: &mut Vec<Lit>,
    qhead: &mut usize,
) -> Option<ClauseRef> {
    while *qhead < trail.len() {
        let p = trail[*qhead];
        *qhead += 1;
        let false_lit = !p;

        let watch_list = watches.take(false_lit);
        let mut keep: Vec<Watch> = Vec::with_capacity(watch_list.len());
        let mut conflict = None;
        let mut idx = 0;

        while idx < watch_list.len() {
            let watch = watch_list[idx];
            idx += 1;

            if lit_value(vars, watch.blocker) == Some(true) {
                keep.push(watch);
                continue;
            }

            let cref = watch.clause;
            let (lit0, lit1) = {
                let clause = &mut clauses[cref];
                if clause.lits[0] == false_lit {
                    clause.lits.swap(0, 1);
                }
                (clause.lits[0], clause.lits[1])
            };
            debug_assert_eq!(lit1, false_lit);

            if lit0 != watch.blocker && lit_value(vars, lit0) == Some(true) {
                keep.push(Watch {
                    clause: cref,
                    blocker: lit0,
                });
                continue;
            }

            let mut replaced = None;
            {
                let clause = &mut clauses[cref];
                for i in 2..clause.lits.len() {
                    if lit_value(vars, clause.lits[i]) != Some(false) {
                        clause.lits.swap(1, i);
                        replaced = Some(clause.lits[1]);
                        break;
                    }
                }
            }

            if let Some(new_watched) = replaced {
                watches.add(
                    new_watched,
                    Watch {
                        clause: cref,
                        blocker: lit0,
                    },
                );
                continue;
            }

            // No replacement literal: the clause is unit on `lit0`, or conflicting if `lit0` is
            // also false.
            keep.push(Watch {
                clause: cref,
                blocker: lit0,
            });
            if lit_value(vars, lit0) == Some(false) {
                conflict = Some(cref);
                while idx < watch_list.len() {
                    keep.push(watch_list[idx]);
                    idx += 1;
                }
                break;
            } else {
                let level = trail_level(trail, vars, *qhead);
                unchecked_enqueue(vars, vsids, trail, lit0, level, Reason::Clause(cref));
            }
        }

        watches.put_back(false_lit, keep);

        if let Some(cref) = conflict {
            return Some(cref);
        }
    }
    None
}

/// The decision level propagation should assign to: the level of the literal that triggered this
/// round of propagation (propagated literals always share the triggering literal's level).
fn trail_level(trail: &[Lit], vars: &[VarRecord], qhead: usize) -> i32 {
    // `qhead` has already been advanced past the triggering literal, so look one back.
    let triggering = trail[qhead - 1];
    vars[triggering.var().index()].level
}
