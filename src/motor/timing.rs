// Delay primitive used by the timed drive variants

use std::future::Future;
use std::time::Duration;

/// Suspends the calling task for roughly `duration`
pub trait Delay {
    fn pause(&mut self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Delay backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

impl Delay for TokioDelay {
    fn pause(&mut self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
