//! Fault-injecting, leak-tracking allocation policy for tests.
//!
//! A [`Harness`] is a cheap handle: clones share the same counters, so a test
//! keeps one clone while the queue owns another, then checks
//! [`live_blocks`](Harness::live_blocks) after the queue is gone.
//!
//! ```
//! use strqueue::harness::Harness;
//! use strqueue::stdx::Queue;
//!
//! let harness = Harness::new();
//! let mut queue = Queue::try_new_in(harness.clone()).unwrap();
//! queue.insert_tail("a").unwrap();
//!
//! harness.fail_next_attempts(0);
//! assert!(queue.insert_tail("b").is_err());
//! assert_eq!(queue.size(), 1);
//!
//! drop(queue);
//! assert_eq!(harness.live_blocks(), 0);
//! ```

use core::alloc::Layout;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::alloc::AllocPolicy;
use crate::config::HarnessConfig;

#[derive(Debug, Default)]
struct HarnessState {
    config: HarnessConfig,
    /// 1-based count of `admit` calls so far.
    attempts: u64,
    /// Absolute attempt numbers that must fail.
    scheduled: BTreeSet<u64>,
    injected: u64,
    live_blocks: u64,
    live_bytes: u64,
}

impl HarnessState {
    fn should_fail(&mut self) -> bool {
        if self.scheduled.remove(&self.attempts) {
            return true;
        }
        let every = u64::from(self.config.fail_every);
        every != 0 && self.attempts.is_multiple_of(every)
    }
}

impl Drop for HarnessState {
    fn drop(&mut self) {
        if self.live_blocks != 0 {
            tracing::warn!(
                live_blocks = self.live_blocks,
                live_bytes = self.live_bytes,
                "harness dropped with live blocks"
            );
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Harness {
    state: Rc<RefCell<HarnessState>>,
}

impl Harness {
    /// A harness that never fails on its own.
    pub fn new() -> Self {
        Self::with_config(HarnessConfig::never_fail())
    }

    pub fn with_config(config: HarnessConfig) -> Self {
        let state = HarnessState {
            config,
            attempts: 0,
            scheduled: BTreeSet::new(),
            injected: 0,
            live_blocks: 0,
            live_bytes: 0,
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn from_env() -> Self {
        Self::with_config(HarnessConfig::from_env())
    }

    /// Fail the allocation attempt that comes after `skip` further attempts.
    ///
    /// `fail_next_attempts(0)` fails the very next attempt. For an insert the
    /// first attempt is the element block and the second is the value buffer.
    pub fn fail_next_attempts(&self, skip: u64) {
        let mut state = self.state.borrow_mut();
        let target = state.attempts + 1 + skip;
        state.scheduled.insert(target);
    }

    pub fn attempts(&self) -> u64 {
        self.state.borrow().attempts
    }

    pub fn injected_failures(&self) -> u64 {
        self.state.borrow().injected
    }

    pub fn live_blocks(&self) -> u64 {
        self.state.borrow().live_blocks
    }

    pub fn live_bytes(&self) -> u64 {
        self.state.borrow().live_bytes
    }
}

impl AllocPolicy for Harness {
    fn admit(&mut self, layout: Layout) -> bool {
        let mut state = self.state.borrow_mut();
        state.attempts += 1;

        if state.should_fail() {
            state.injected += 1;
            tracing::debug!(
                attempt = state.attempts,
                size = layout.size(),
                "injected allocation failure"
            );
            return false;
        }

        true
    }

    fn on_alloc(&mut self, layout: Layout) {
        let mut state = self.state.borrow_mut();
        state.live_blocks += 1;
        state.live_bytes += layout.size() as u64;
    }

    fn on_free(&mut self, layout: Layout) {
        let mut state = self.state.borrow_mut();
        assert!(state.live_blocks > 0, "free of untracked block");
        assert!(state.live_bytes >= layout.size() as u64);

        state.live_blocks -= 1;
        state.live_bytes -= layout.size() as u64;
    }
}
