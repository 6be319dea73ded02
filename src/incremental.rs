//! Incremental (assumption-based) solving.
//!
//! Ported in spirit from `varisat::incremental`: assumptions are pushed one per decision level,
//! in order, as long as they don't contradict what's already on the trail. `spec.md` §4.1 calls
//! this "each assumption is tried as a decision at increasing level".

use crate::decision::Vsids;
use crate::lit::Lit;
use crate::prop::unchecked_enqueue;
use crate::variables::{lit_value, Reason, VarRecord};

/// Outcome of trying to enqueue the next pending assumption.
pub enum EnqueueAssumption {
    /// All assumptions are already on the trail.
    Done,
    /// One more assumption was pushed as a new decision level.
    Enqueued,
    /// The next assumption is already false: the assumptions are jointly unsatisfiable with the
    /// current clause base.
    Conflict,
}

/// Tries to enqueue the next assumption that isn't already implied by the trail.
///
/// `current_level` is the number of decision levels already in use (`trail_lim.len()`).
pub fn enqueue_assumption(
    assumptions: &mut Vec<Lit>,
    vars: &mut [VarRecord],
    vsids: &mut Vsids,
    trail: &mut Vec<Lit>,
    trail_lim: &mut Vec<usize>,
) -> EnqueueAssumption {
    loop {
        let current_level = trail_lim.len();
        let next = match assumptions.get(current_level) {
            Some(&lit) => lit,
            None => return EnqueueAssumption::Done,
        };
        match lit_value(vars, next) {
            Some(false) => return EnqueueAssumption::Conflict,
            Some(true) => {
                // Already implied by earlier assumptions or the clause base; drop it and keep
                // the remaining assumptions in order.
                assumptions.remove(current_level);
            }
            None => {
                trail_lim.push(trail.len());
                let level = trail_lim.len() as i32;
                unchecked_enqueue(vars, vsids, trail, next, level, Reason::Decision);
                return EnqueueAssumption::Enqueued;
            }
        }
    }
}
