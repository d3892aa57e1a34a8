//! Utility functions for SQLite storage operations.
//!
//! Chunking to stay under SQLite's parameter limit.

/// Maximum number of bound parameters used for one `IN (...)` clause.
///
/// SQLite caps parameters per statement (SQLITE_MAX_VARIABLE_NUMBER, often
/// 999); 500 leaves room for the other filters in the query.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Splits `items` into slices of at most `SQLITE_MAX_PARAMS_CHUNK`.
///
/// ```ignore
/// for chunk in chunk_for_sqlite(&parent_ids) {
///     children.extend(load_children(conn, chunk)?);
/// }
/// ```
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}
