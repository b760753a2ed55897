#![allow(dead_code)]

pub use tart_executor_test_utils::builders;
pub use tart_executor_test_utils::fake_executor;
pub use tart_executor_test_utils::{init_tracing, with_timeout};
