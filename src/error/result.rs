//! Result type alias for fomo operations.

use super::fomo_error::FomoError;

/// Type alias for Results using FomoError.
///
/// # Example
///
/// ```ignore
/// use fomo::error::FomoResult;
///
/// async fn pending(client: &ApiClient) -> FomoResult<u64> {
///     client.pending_approvals_count().await
/// }
/// ```
pub type FomoResult<T> = Result<T, FomoError>;
