use std::future::Future;
use tokio_util::sync::CancellationToken;

/// The caller's cancellation token fired before the call finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Run `fut` unless `cancel` fires first. The future is dropped on cancel.
pub async fn guard<F>(cancel: &CancellationToken, fut: F) -> Result<F::Output, Cancelled>
where
    F: Future,
{
    tokio::select! {
        biased;

        _ = cancel.cancelled() => Err(Cancelled),
        out = fut => Ok(out),
    }
}
