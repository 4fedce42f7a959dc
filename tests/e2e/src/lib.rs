//! Mukhosto End-to-End Test Support
//!
//! - `harness`: temporary SQLite-backed schedulers with a controllable clock
//! - `mocks`: content rows and seeded scenarios

pub mod harness;

pub use harness::TestStoreManager;
pub use mocks::TestDataFactory;
