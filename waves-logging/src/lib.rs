// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! Log utilities

#![warn(missing_docs)]

pub use serde_json;
pub use tracing;

#[macro_export]
/// tracing with some context
macro_rules! waves_trace {
    ($evt:expr, $params:tt) => {
        $crate::tracing::trace!("waves:{}:{}", $evt, $crate::serde_json::json!($params));
    };
}
