//! Structured log macros.
//!
//! Every line carries a `subsystem` field so JSON output can be filtered per
//! component.

/// Log an event tagged with its subsystem.
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

/// Log a transaction-related event with standard fields.
#[macro_export]
macro_rules! log_tx_event {
    ($level:ident, $subsystem:expr, $msg:expr, $transaction_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            transaction_id = %$transaction_id,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a node-related event with standard fields.
#[macro_export]
macro_rules! log_node_event {
    ($level:ident, $subsystem:expr, $msg:expr, $mrn:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            mrn = %$mrn,
            $($($field)*,)?
            $msg
        )
    };
}
