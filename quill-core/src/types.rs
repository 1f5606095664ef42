//! Convenience type aliases for common handler return types.

use crate::error::{HandlerError, HttpError};
use crate::reply::Reply;

/// What every bound handler returns.
///
/// ```ignore
/// async fn api_get_blog(state: AppState, args: Args) -> ReplyResult {
///     let blog = state.blogs.find(args.require("id")?).await?;
///     Ok(Reply::json(&blog)?)
/// }
/// ```
pub type ReplyResult = Result<Reply, HandlerError>;

/// Result alias for helpers that only fail at the transport level.
pub type ApiResult<T> = Result<T, HttpError>;
