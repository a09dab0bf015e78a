//! # System Interaction Layer
//!
//! Everything that touches the host environment lives here: spawning
//! processes, probing connectivity, and raising OS notifications. The core
//! talks to this layer only through narrow, data-in/data-out contracts so it
//! can be exercised in tests without a real shell.

pub mod executor;
pub mod notifier;
pub mod probes;
