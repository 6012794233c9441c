use kbar_core::KbarError;

/// Join a collection of tasks and apply an optional batch-level deadline.
///
/// This wraps `futures::future::join_all(tasks)` with
/// `crate::core::with_request_deadline`. On timeout it returns
/// `KbarError::RequestTimeout` labeled with `what`.
///
/// # Errors
/// Returns `RequestTimeout` when the deadline elapses first.
pub async fn join_with_deadline<I, F, T>(
    tasks: I,
    deadline: Option<std::time::Duration>,
    what: &str,
) -> Result<Vec<T>, KbarError>
where
    I: IntoIterator<Item = F>,
    F: core::future::Future<Output = T>,
{
    crate::core::with_request_deadline(deadline, what, futures::future::join_all(tasks)).await
}

/// Collapse the errors of a batch in which no job succeeded.
///
/// Rules:
/// - No errors → `InvalidArg` (nothing ran).
/// - A single error → that error, unchanged.
/// - Every error a `RequestTimeout` → `RequestTimeout(what)`.
/// - Else → `AllJobsFailed(errors)`.
#[must_use]
pub fn collapse_errors(what: &str, mut errors: Vec<KbarError>) -> KbarError {
    if errors.is_empty() {
        return KbarError::InvalidArg(format!("{what}: no jobs ran"));
    }
    if errors.len() == 1 {
        return errors.remove(0);
    }
    if errors
        .iter()
        .all(|e| matches!(e, KbarError::RequestTimeout { .. }))
    {
        return KbarError::request_timeout(what);
    }
    KbarError::AllJobsFailed(errors)
}
