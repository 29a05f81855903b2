use crate::alloc::AllocPolicy;
use crate::config::env_u32;
use crate::stdx::Queue;

pub fn proptest_cases(default: u32) -> u32 {
    env_u32("PROPTEST_CASES").unwrap_or(default)
}

/// Values head to tail, without disturbing the queue.
pub fn values<P: AllocPolicy>(queue: &Queue<P>) -> Vec<String> {
    queue.iter().map(str::to_owned).collect()
}
