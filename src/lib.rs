pub mod blocking_queue;
pub use blocking_queue::BoundedBlockingQueue;

pub mod cancel;
pub use cancel::CancelToken;

pub mod countdown_latch;
pub use countdown_latch::CountdownLatch;

/// Error returned by the fallible queue operations.
///
/// The plain `enqueue`/`dequeue` calls never fail: a full or empty queue
/// makes them block instead. Errors only come from construction and from
/// the cancellable and timed variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("blocking call cancelled")]
    Cancelled,
    #[error("blocking call timed out")]
    Timeout,
}

/// A specialized `Result` type for queue operations.
///
/// This is defined as a convenience.
pub type Result<T> = std::result::Result<T, Error>;
