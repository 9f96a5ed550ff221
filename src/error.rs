/// Turns a failed collector result into a missing value, logging the failure.
pub trait ResultOkLogExt<T, E> {
    /// Logs the error at `error` level, prefixed with `context`.
    fn ok_log(self, context: &str) -> Option<T>;

    /// Logs the error at `warn` level, prefixed with `context`.
    ///
    /// Used for collectors that are expected to be unavailable on some hosts.
    fn ok_warn(self, context: &str) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self, context: &str) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{context}: {err}");
                None
            }
        }
    }

    fn ok_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::warn!("{context}: {err}");
                None
            }
        }
    }
}
