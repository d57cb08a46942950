//! Bounded polling waits and the first-of-N race

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Poll `probe` every `poll` until it reports true or `budget` runs out.
///
/// A probe error counts as "not yet": pages are mid-render during most
/// waits and a failed evaluation is indistinguishable from an absent node.
pub async fn wait_for<F, Fut, E>(poll: Duration, budget: Duration, mut probe: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let deadline = Instant::now() + budget;
    loop {
        if matches!(probe().await, Ok(true)) {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        tokio::time::sleep(poll.min(deadline - now)).await;
    }
}

/// One contender in [`first_of`]
pub struct Signal<'a, T> {
    label: &'static str,
    budget: Duration,
    fut: BoxFuture<'a, Option<T>>,
}

impl<'a, T> Signal<'a, T> {
    pub fn new<F>(label: &'static str, budget: Duration, fut: F) -> Self
    where
        F: Future<Output = Option<T>> + Send + 'a,
    {
        Self {
            label,
            budget,
            fut: Box::pin(fut),
        }
    }
}

/// Race signals, each under its own timeout. Returns the label and value of
/// the first to produce `Some`; `None` when all of them gave up.
pub async fn first_of<'a, T>(signals: Vec<Signal<'a, T>>) -> Option<(&'static str, T)> {
    let mut pending: FuturesUnordered<_> = signals
        .into_iter()
        .map(|s| async move {
            let value = tokio::time::timeout(s.budget, s.fut).await.ok().flatten();
            (s.label, value)
        })
        .collect();

    while let Some((label, value)) = pending.next().await {
        if let Some(value) = value {
            return Some((label, value));
        }
    }
    None
}
