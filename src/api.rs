//! Free-function interface over [`Queue`] that tolerates an absent queue.
//!
//! Each function folds the `Result` of the corresponding method into the
//! plain return value callers expect: `false` on any failure, `0` for the
//! size of an absent queue, and a no-op for reverse/sort on an absent queue.

use crate::alloc::AllocPolicy;
use crate::error::Result;
use crate::stdx::Queue;

pub fn create() -> Result<Queue> {
    Queue::try_new()
}

pub fn destroy<P: AllocPolicy>(queue: Option<Queue<P>>) {
    drop(queue);
}

pub fn insert_head<P: AllocPolicy>(queue: Option<&mut Queue<P>>, value: &str) -> bool {
    queue.is_some_and(|q| q.insert_head(value).is_ok())
}

pub fn insert_tail<P: AllocPolicy>(queue: Option<&mut Queue<P>>, value: &str) -> bool {
    queue.is_some_and(|q| q.insert_tail(value).is_ok())
}

/// Removes the head. `out`, when given, receives a NUL-terminated copy
/// truncated to `out.len() - 1` bytes.
pub fn remove_head<P: AllocPolicy>(queue: Option<&mut Queue<P>>, out: Option<&mut [u8]>) -> bool {
    queue.is_some_and(|q| q.remove_head(out).is_ok())
}

pub fn size<P: AllocPolicy>(queue: Option<&Queue<P>>) -> u32 {
    queue.map_or(0, |q| q.size())
}

pub fn reverse<P: AllocPolicy>(queue: Option<&mut Queue<P>>) {
    if let Some(q) = queue {
        q.reverse();
    }
}

pub fn sort<P: AllocPolicy>(queue: Option<&mut Queue<P>>) {
    if let Some(q) = queue {
        q.sort();
    }
}
