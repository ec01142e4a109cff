//! Structured logging helpers.
//!
//! Lines emitted through these macros carry a `subsystem` field so the node's
//! own output can be separated from the core service in a log store:
//! - `subsystem`: gateway, node
//! - `request_id`: match request the line concerns, when there is one

/// Log with a subsystem field.
#[macro_export]
macro_rules! log_event {
    (info, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (error, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a match-request event with the standard fields.
#[macro_export]
macro_rules! log_match_event {
    ($level:ident, $subsystem:expr, $msg:expr, $request_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            request_id = %$request_id,
            $($($field)*,)?
            $msg
        )
    };
}
