//! demonstration harness for the shared/exclusive lock.
//!
//! wires together:
//! - **shex_sync**: writer-priority reader-writer lock and its guards
//! - **shex_store**: people database guarded by that lock
//! - **shex_timing**: wait-time histograms for every acquisition
//!
//! # scenarios
//!
//! ```text
//! people                                   stress
//! ┌──────────┐      ┌──────────┐           ┌───────────┐     ┌───────────┐
//! │  writer  │      │  reader  │           │ readers×N │     │ writers×M │
//! │ add × W  │      │ get × L  │           │ read × R  │     │ incr × C  │
//! └────┬─────┘      └────┬─────┘           └─────┬─────┘     └─────┬─────┘
//!      │ write guard     │ read guard            │ read guard      │ write guard
//!      ▼                 ▼                       ▼                 ▼
//! ┌─────────────────────────────┐         ┌─────────────────────────────┐
//! │     Arc<PeopleDb>           │         │  SharedExclusive<u64>       │
//! └─────────────────────────────┘         └─────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod people;
pub mod stress;

pub use config::{Config, Mode, PeopleConfig, StressConfig};
pub use error::{DemoError, Result};
pub use people::{run_people, PeopleReport};
pub use stress::{run_stress, StressReport};
