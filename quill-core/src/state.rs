/// Trait alias for types that can serve as Quill application state.
///
/// The state type is used directly as the Axum router state and is handed by
/// value to every bound handler, so it should be cheap to clone.
pub trait QuillState: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> QuillState for T {}
