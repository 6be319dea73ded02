//! The VSIDS branching heuristic.
//!
//! Keeps an activity value per variable; conflict analysis bumps the variables it resolves
//! through, and the heuristic periodically decays all activities. Decisions pick the unassigned
//! variable with the highest activity. Ported from the teacher's `varisat::decision::vsids`
//! (itself following MiniSat): instead of decaying every activity on every conflict, the bump
//! amount is scaled up, which is equivalent up to an overall scale factor that doesn't affect
//! ordering.

use ordered_float::OrderedFloat;

use crate::lit::Var;

pub struct Vsids {
    activity: Vec<OrderedFloat<f32>>,
    heap: Vec<Var>,
    position: Vec<Option<usize>>,
    bump: f32,
    inv_decay: f32,
}

impl Default for Vsids {
    fn default() -> Vsids {
        Vsids {
            activity: vec![],
            heap: vec![],
            position: vec![],
            bump: 1.0,
            inv_decay: 1.0 / 0.95,
        }
    }
}

impl Vsids {
    /// Grows the backing tables for a new (larger) variable count. Newly added variables with
    /// `make_available = true` are inserted into the heap; others stay out until explicitly
    /// enabled (used for non-decision variables, `spec.md` §4.1 `new_var(polarity, decision)`).
    pub fn set_var_count(&mut self, count: usize, make_available: impl Fn(usize) -> bool) {
        let old_count = self.activity.len();
        if count < old_count {
            self.truncate(count);
            return;
        }
        self.activity.resize(count, OrderedFloat(0.0));
        self.position.resize(count, None);
        for i in old_count..count {
            if make_available(i) {
                self.make_available(Var::from_index(i));
            }
        }
    }

    /// Shrinks the backing tables, dropping any variable at or past `count` from the heap.
    pub fn truncate(&mut self, count: usize) {
        self.heap.retain(|v| v.index() < count);
        self.position.truncate(count);
        self.activity.truncate(count);
        self.rebuild_positions();
    }

    fn rebuild_positions(&mut self) {
        for p in self.position.iter_mut() {
            *p = None;
        }
        let heap = std::mem::take(&mut self.heap);
        for v in heap {
            let pos = self.heap.len();
            self.heap.push(v);
            self.position[v.index()] = Some(pos);
            self.sift_up(pos);
        }
    }

    fn rescale_limit() -> f32 {
        std::f32::MAX / 16.0
    }

    pub fn set_decay(&mut self, decay: f32) {
        assert!(decay < 1.0);
        assert!(decay > 1.0 / 16.0);
        self.inv_decay = 1.0 / decay;
    }

    pub fn bump(&mut self, var: Var) {
        let rescale = {
            let value = &mut self.activity[var.index()];
            value.0 += self.bump;
            value.0 >= Self::rescale_limit()
        };
        if rescale {
            self.rescale();
        }
        if let Some(pos) = self.position[var.index()] {
            self.sift_up(pos);
        }
    }

    pub fn decay(&mut self) {
        self.bump *= self.inv_decay;
        if self.bump >= Self::rescale_limit() {
            self.rescale();
        }
    }

    fn rescale(&mut self) {
        let rescale_factor = 1.0 / Self::rescale_limit();
        for activity in &mut self.activity {
            activity.0 *= rescale_factor;
        }
        self.bump *= rescale_factor;
    }

    /// Inserts a variable into the heap if it isn't already present.
    pub fn make_available(&mut self, var: Var) {
        if self.position[var.index()].is_none() {
            let position = self.heap.len();
            self.position[var.index()] = Some(position);
            self.heap.push(var);
            self.sift_up(position);
        }
    }

    /// Removes a variable from the heap if present, leaving the heap property intact.
    ///
    /// Called whenever a variable becomes assigned (by a decision, a propagation or an
    /// assumption): an assigned variable must not be returned again by `pop` until a later
    /// backtrack calls `make_available` for it.
    pub fn remove(&mut self, var: Var) {
        if let Some(pos) = self.position[var.index()].take() {
            let last = self.heap.len() - 1;
            if pos != last {
                self.heap.swap(pos, last);
                let moved = self.heap[pos];
                self.position[moved.index()] = Some(pos);
            }
            self.heap.pop();
            if pos < self.heap.len() {
                self.sift_down(pos);
                self.sift_up(pos);
            }
        }
    }

    fn sift_up(&mut self, mut pos: usize) {
        let var = self.heap[pos];
        loop {
            if pos == 0 {
                return;
            }
            let parent_pos = (pos - 1) / 2;
            let parent_var = self.heap[parent_pos];
            if self.activity[parent_var.index()] >= self.activity[var.index()] {
                return;
            }
            self.position[var.index()] = Some(parent_pos);
            self.heap[parent_pos] = var;
            self.position[parent_var.index()] = Some(pos);
            self.heap[pos] = parent_var;
            pos = parent_pos;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let var = self.heap[pos];
        loop {
            let mut largest_pos = pos;
            let mut largest_var = var;

            let left_pos = pos * 2 + 1;
            if left_pos < self.heap.len() {
                let left_var = self.heap[left_pos];
                if self.activity[largest_var.index()] < self.activity[left_var.index()] {
                    largest_pos = left_pos;
                    largest_var = left_var;
                }
            }

            let right_pos = pos * 2 + 2;
            if right_pos < self.heap.len() {
                let right_var = self.heap[right_pos];
                if self.activity[largest_var.index()] < self.activity[right_var.index()] {
                    largest_pos = right_pos;
                    largest_var = right_var;
                }
            }

            if largest_pos == pos {
                return;
            }

            self.position[var.index()] = Some(largest_pos);
            self.heap[largest_pos] = var;
            self.position[largest_var.index()] = Some(pos);
            self.heap[pos] = largest_var;
            pos = largest_pos;
        }
    }

    /// Removes and returns the highest-activity variable, if any remain in the heap.
    pub fn pop(&mut self) -> Option<Var> {
        if self.heap.is_empty() {
            None
        } else {
            let var = self.heap.swap_remove(0);
            if !self.heap.is_empty() {
                let top_var = self.heap[0];
                self.position[top_var.index()] = Some(0);
                self.sift_down(0);
            }
            self.position[var.index()] = None;
            Some(var)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_sorts() {
        let mut vsids = Vsids::default();
        vsids.set_var_count(8, |_| true);

        for i in 0..8 {
            for _ in 0..i {
                vsids.bump(Var::from_index(i));
            }
        }

        for i in (0..8).rev() {
            assert_eq!(vsids.pop(), Some(Var::from_index(i)));
        }
        assert_eq!(vsids.pop(), None);
    }

    #[test]
    fn non_decision_vars_stay_out_of_heap() {
        let mut vsids = Vsids::default();
        vsids.set_var_count(4, |i| i != 2);

        let mut popped = vec![];
        while let Some(v) = vsids.pop() {
            popped.push(v.index());
        }
        popped.sort_unstable();
        assert_eq!(popped, vec![0, 1, 3]);
    }

    #[test]
    fn truncate_drops_high_indices() {
        let mut vsids = Vsids::default();
        vsids.set_var_count(6, |_| true);
        vsids.truncate(3);

        let mut popped = vec![];
        while let Some(v) = vsids.pop() {
            popped.push(v.index());
        }
        popped.sort_unstable();
        assert_eq!(popped, vec![0, 1, 2]);
    }
}
