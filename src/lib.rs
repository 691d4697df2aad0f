//! # Keypanel
//!
//! On-screen keyboard (input panel) manager for a compositing display server.
//!
//! Keypanel tracks the panel surfaces an input-method client hands to the
//! compositor, shows and hides them as text input gains and loses focus, and
//! keeps the panel's layer in the right place in the compositor's layer list.
//!
//! ## Architecture
//!
//! - `panel`: the `InputPanel` manager (visibility, layer membership, placement)
//! - `registry`: panel surfaces and their roles
//! - `protocol`: client requests and protocol errors
//! - `stack`: the compositor's ordered layer list
//! - `signal`: single-threaded notification channels with RAII subscriptions
//! - `host`: services the compositor provides to the panel manager
//! - `headless`: in-memory compositor host
//! - `scenario`: TOML event scripts replayed against the headless host
//! - `config`: configuration parsing and management
//!
//! ## Usage
//!
//! ```rust
//! use keypanel::{CompositorSignals, HeadlessHost, InputPanel, InputPanelConfig};
//!
//! let signals = CompositorSignals::new();
//! let panel = InputPanel::create(HeadlessHost::new(), &InputPanelConfig::default(), &signals);
//! assert_eq!(panel.borrow().subscription_count(), 4);
//! ```

pub mod config;
pub mod geometry;
pub mod headless;
pub mod host;
pub mod panel;
pub mod protocol;
pub mod registry;
pub mod scenario;
pub mod signal;
pub mod stack;

// Re-export main types for easy access
pub use config::InputPanelConfig;
pub use headless::HeadlessHost;
pub use host::{PanelHost, RoleConfigure};
pub use panel::{InputPanel, PanelState};
pub use protocol::ProtocolError;
pub use scenario::{ReplayReport, Scenario};
pub use signal::CompositorSignals;

/// Version information for Keypanel
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
