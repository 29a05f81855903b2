//! Allocation policy consulted by [`Queue`](crate::stdx::Queue) before every
//! block it allocates.
//!
//! A queue allocates three kinds of block: its header (once, at creation),
//! one element block per value and one buffer per value. The policy can veto
//! any of them, which is how allocation exhaustion is simulated in tests.

use core::alloc::Layout;

pub trait AllocPolicy {
    /// Returns `false` to refuse the allocation described by `layout`.
    fn admit(&mut self, layout: Layout) -> bool;

    /// A block admitted by [`admit`](Self::admit) was obtained.
    fn on_alloc(&mut self, layout: Layout);

    /// A block previously reported to [`on_alloc`](Self::on_alloc) left the
    /// queue, either freed or handed to the caller.
    fn on_free(&mut self, layout: Layout);
}

/// Admits every allocation and tracks nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct System;

impl AllocPolicy for System {
    #[inline]
    fn admit(&mut self, _layout: Layout) -> bool {
        true
    }

    #[inline]
    fn on_alloc(&mut self, _layout: Layout) {}

    #[inline]
    fn on_free(&mut self, _layout: Layout) {}
}

const _: () = assert!(size_of::<System>() == 0);
