//! Oracle error types.

/// Failure of a single oracle round trip.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum OracleError {
    /// The oracle worker is gone or dropped the request.
    #[display("Oracle disconnected")]
    Disconnected,

    /// No reply arrived in time.
    #[display("Oracle did not reply within {}ms", after_ms)]
    TimedOut {
        /// The timeout that elapsed.
        after_ms: u64,
    },

    /// The reply code is not a known direction (protocol error).
    #[display("Protocol error: oracle replied with unknown direction code {}", _0)]
    InvalidDirection(#[error(not(source))] u8),
}

impl OracleError {
    /// Whether the failure is a transport problem rather than a protocol violation.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Disconnected | Self::TimedOut { .. })
    }
}
