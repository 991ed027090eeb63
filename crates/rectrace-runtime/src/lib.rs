//! `rectrace-runtime` – the tick driver.
//!
//! Hosts the fixed-rate loop that advances the motion controller and wires
//! it to the event bus.
//!
//! # Modules
//!
//! - [`control_loop`] – [`ControlLoop`][control_loop::ControlLoop]: drains
//!   pose feedback non-blocking before each tick, advances the
//!   [`TraceController`][rectrace_controller::TraceController], and publishes
//!   the emitted command.
//! - [`feed_monitor`] – [`FeedMonitor`][feed_monitor::FeedMonitor]: detects
//!   a silent pose feed so the operator learns about a dead transport.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: initialises
//!   the global `tracing` subscriber with an optional OTLP span exporter.

pub mod control_loop;
pub mod feed_monitor;
pub mod telemetry;

pub use control_loop::{ControlLoop, ControlLoopConfig};
pub use feed_monitor::FeedMonitor;
