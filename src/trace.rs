//! Logging shim: events compile away unless the `tracing` feature is on

/// Emits a `tracing` trace event when the `tracing` feature is enabled
macro_rules! trace {
    ($($tt:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::trace!($($tt)*)
        }
    };
}

pub(crate) use trace;
