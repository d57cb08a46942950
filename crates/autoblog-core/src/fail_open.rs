//! Fail-open helper for best-effort steps
//!
//! Some steps only improve the odds of success and must never end a run on
//! their own: nudging a reactive page into re-rendering, closing a browser
//! that is already gone, bumping a view counter.
//!
//! DO NOT use fail-open for:
//! - Locating required fields (terminal for the run)
//! - Persisting a blog record (terminal for the publish call)

use std::future::Future;
use tracing::warn;

use crate::Result;

/// Run a best-effort operation.
///
/// Logs the error via `tracing::warn!` on failure and returns `None`.
///
/// ```no_run
/// use autoblog_core::fail_open::fail_open;
/// use autoblog_core::Result;
///
/// async fn nudge_composer() -> Result<()> {
///     Ok(())
/// }
///
/// async fn example() {
///     let nudged = fail_open("nudge composer", || nudge_composer()).await;
///     // nudged is None if the nudge failed, otherwise Some(())
/// }
/// ```
pub async fn fail_open<F, Fut, T>(operation_name: &str, f: F) -> Option<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match f().await {
        Ok(val) => Some(val),
        Err(e) => {
            warn!("{} failed (fail-open): {}", operation_name, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AutoblogError;

    #[tokio::test]
    async fn test_fail_open_success() {
        let result = fail_open("test_op", || async { Ok::<_, AutoblogError>(42) }).await;
        assert_eq!(result, Some(42));
    }

    #[tokio::test]
    async fn test_fail_open_failure() {
        let result = fail_open("test_op", || async {
            Err::<i32, _>(AutoblogError::Browser("page detached".to_string()))
        })
        .await;
        assert_eq!(result, None);
    }
}
