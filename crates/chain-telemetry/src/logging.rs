//! Structured log macros.
//!
//! Block and transaction events carry the same field names everywhere
//! (`component`, `block_num`, `block_id`, `tx_id`) so log pipelines can
//! correlate them.

/// Log a block-related event with standard fields.
#[macro_export]
macro_rules! log_block_event {
    ($level:ident, $component:expr, $msg:expr, $block_num:expr, $block_id:expr $(, $($field:tt)*)?) => {
        $crate::tracing::$level!(
            component = $component,
            block_num = $block_num,
            block_id = %$block_id,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a transaction-related event with standard fields.
#[macro_export]
macro_rules! log_tx_event {
    ($level:ident, $component:expr, $msg:expr, $tx_id:expr $(, $($field:tt)*)?) => {
        $crate::tracing::$level!(
            component = $component,
            tx_id = %$tx_id,
            $($($field)*,)?
            $msg
        )
    };
}
