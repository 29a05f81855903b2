pub mod alloc;
pub mod api;
pub mod config;
pub mod error;
pub mod harness;
pub mod stdx;

#[cfg(test)]
mod test_utils;

pub use error::{QueueError, Result};
pub use stdx::Queue;
