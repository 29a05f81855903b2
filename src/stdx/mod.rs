pub mod queue;

pub use queue::{Iter, Queue, copy_truncated};
