//! Background removal service implementations
//!
//! - `remove_bg`: HTTP client for remove.bg-compatible APIs
//! - `test_utils`: scripted mock for tests and offline use

pub mod remove_bg;

// Mock remover, public so integration tests can inject it
pub mod test_utils;

pub use self::remove_bg::{RemoveBgBackend, IMAGE_FIELD};
pub use self::test_utils::{MockBehavior, MockRemover};
