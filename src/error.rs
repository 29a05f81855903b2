//! Error taxonomy for queue operations.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueueError>;

/// Failure reported by a queue operation.
///
/// A failed operation never mutates the queue.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue is absent, or the operation's precondition does not hold
    /// (e.g. removing from an empty queue).
    #[error("invalid queue")]
    InvalidQueue,

    /// An allocation was refused by the policy or the allocator.
    #[error("allocation failure")]
    AllocationFailure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(QueueError::InvalidQueue.to_string(), "invalid queue");
        assert_eq!(
            QueueError::AllocationFailure.to_string(),
            "allocation failure"
        );
    }
}
