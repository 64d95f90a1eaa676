/// Recoverable conditions reported by structural operations.
///
/// None of these are fatal: the operation that returns one has not mutated any state. Host
/// adapters are expected to log and drop them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OutlineError {
    #[error("item is not expandable")]
    NotExpandable,
    #[error("node is not expanded")]
    NotCollapsible,
    #[error("node is not in the outline")]
    NodeNotFound,
    #[error("no tree source configured")]
    NoSource,
}
