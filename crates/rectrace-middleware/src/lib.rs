//! `rectrace-middleware` – the channel layer.
//!
//! Routes asynchronous data between the motion controller and whatever is
//! producing pose feedback / consuming drive commands, without caring about
//! the data's meaning.
//!
//! # Modules
//!
//! - [`bus`] – headless, typed, topic-based publish/subscribe event bus built
//!   on Tokio broadcast channels.
//! - [`sim`] – headless kinematic turtle simulator that closes the control
//!   loop for CI runs and demos when no real agent transport is attached.

pub mod bus;
pub mod sim;

pub use bus::{EventBus, Topic, TopicReceiver};
pub use sim::{SimFeed, TurtleSim};
