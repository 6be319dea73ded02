//! Restart scheduling via the reluctant-doubling Luby sequence.
//!
//! Ported from the teacher's `varisat::schedule::luby` (OEIS A182105): restarts are cheap and
//! frequent early on, then grow geometrically, which in practice out-performs any single fixed
//! interval.

/// Infinite iterator yielding the Luby sequence.
pub struct LubySequence {
    u: u64,
    v: u64,
}

impl Default for LubySequence {
    fn default() -> LubySequence {
        LubySequence { u: 1, v: 1 }
    }
}

impl LubySequence {
    /// Yields the next number of the Luby sequence.
    pub fn advance(&mut self) -> u64 {
        let result = self.v;
        // Method by Knuth 2012
        if (self.u & self.u.wrapping_neg()) == self.v {
            self.u += 1;
            self.v = 1;
        } else {
            self.v <<= 1;
        }
        result
    }
}

/// Tracks when the next restart is due, in units of conflicts, scaled by `scale`.
pub struct RestartSchedule {
    luby: LubySequence,
    scale: u64,
    conflicts_since_restart: u64,
    next_restart: u64,
}

impl RestartSchedule {
    pub fn new(scale: u64) -> RestartSchedule {
        let mut luby = LubySequence::default();
        let next_restart = luby.advance() * scale;
        RestartSchedule {
            luby,
            scale,
            conflicts_since_restart: 0,
            next_restart,
        }
    }

    /// Registers a conflict and reports whether a restart is due.
    pub fn conflict(&mut self) -> bool {
        self.conflicts_since_restart += 1;
        if self.conflicts_since_restart >= self.next_restart {
            self.conflicts_since_restart = 0;
            self.next_restart = self.luby.advance() * self.scale;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luby_sequence() {
        let mut luby = LubySequence::default();
        let initial_terms: Vec<_> = std::iter::repeat_with(|| luby.advance()).take(16).collect();
        assert_eq!(
            initial_terms,
            vec![1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, 1]
        );
    }

    #[test]
    fn restart_fires_eventually() {
        let mut schedule = RestartSchedule::new(1);
        let mut fired = 0;
        for _ in 0..100 {
            if schedule.conflict() {
                fired += 1;
            }
        }
        assert!(fired > 0);
    }
}
