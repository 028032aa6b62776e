//! The per-tick echo bus.
//!
//! Echoes queued during a tick are delivered in strict insertion order
//! before any decay runs. This ordering is what makes the reinforcement
//! contract hold: a just-arrived echo is never pre-decayed, and two
//! scenarios that enqueue the same echoes in the same order observe the
//! same support trajectories.

use etm_core::echo::Echo;
use etm_core::phase::PhaseCompareMode;
use etm_core::recruiter::RecruiterNode;

// ---------------------------------------------------------------------------
// EchoBus
// ---------------------------------------------------------------------------

/// FIFO collector of `(recruiter index, echo)` pairs for one tick.
#[derive(Debug, Default)]
pub struct EchoBus {
    queue: Vec<(usize, Echo)>,
}

impl EchoBus {
    /// An empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an echo for the recruiter at `recipient` (arena index).
    pub fn enqueue(&mut self, recipient: usize, echo: Echo) {
        self.queue.push((recipient, echo));
    }

    /// Number of queued echoes.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Deliver every queued echo in insertion order and clear the queue.
    ///
    /// Returns the number of echoes delivered. `tick_index` is the
    /// 1-indexed tick recorded in each recruiter's echo log.
    pub fn deliver(
        &mut self,
        recruiters: &mut [RecruiterNode],
        compare: PhaseCompareMode,
        tick_index: u64,
    ) -> u64 {
        let mut delivered = 0;
        for (recipient, echo) in self.queue.drain(..) {
            if let Some(recruiter) = recruiters.get_mut(recipient) {
                recruiter.receive_echo(&echo, compare, tick_index);
                delivered += 1;
            }
        }
        delivered
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
