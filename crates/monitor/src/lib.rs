//! # Pricewatch Monitoring Core
//!
//! This crate contains the per-subscriber monitoring logic: the trailing
//! moving average, the change and level detector, the alert debounce state
//! machine, and the scheduler that owns one repeating task per subscriber.
//!
//! ## Architectural Principles
//!
//! - **Capabilities at the seams:** The core talks to the outside world only
//!   through the `PriceSource` and `Notifier` traits, so both can be swapped
//!   for in-memory fakes in tests.
//! - **One task per subscriber:** Every chat gets its own tokio task and its
//!   own exclusively-owned state. Reconfiguring replaces the task wholesale;
//!   nothing is ever mutated under a running cycle's feet.
//! - **Never die:** A cycle that cannot get usable data skips and waits for
//!   the next tick. Only an explicit stop terminates a task.
//!
//! ## Public API
//!
//! - `MonitorService`: the lifecycle surface (`start`, `stop`, `reconfigure`,
//!   `get_config`, `shutdown`) called by the command front end.
//! - `SubscriberConfig` / `ConfigPatch`: validated per-subscriber settings.
//! - The pure pieces (`trailing_mean`, `evaluate`, `AlertDebounce`) for
//!   anyone composing the logic differently.

// Declare all the modules that constitute this crate.
pub mod config;
pub mod debounce;
pub mod detector;
pub mod error;
pub mod moving_average;
pub mod scheduler;

// Re-export the key components to create a clean, public-facing API.
pub use config::{ConfigPatch, SubscriberConfig};
pub use debounce::AlertDebounce;
pub use detector::{Evaluation, ThresholdDecision, evaluate};
pub use error::MonitorError;
pub use moving_average::trailing_mean;
pub use scheduler::MonitorService;
