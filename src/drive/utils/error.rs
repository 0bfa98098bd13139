/// Wrap the error of a `Result<_, Error>` into an operation-level variant
/// carrying `source: Box<Error>`.
///
/// ```ignore
/// wrap_err!(op.await, DownloadFailed { item_id: id, local_path: lp })?
/// ```
#[macro_export]
macro_rules! wrap_err {
    ($expr:expr, $variant:ident { $($field:ident : $value:expr),* $(,)? }) => {{
        $expr.map_err(|e: $crate::error::Error| $crate::error::Error::$variant {
            $($field: $value,)*
            source: Box::new(e),
        })
    }};
}
