//! # Game Client Library
//!
//! Client side of a multiplayer rocket arena. The server owns nothing but
//! the roster of connected players: every client simulates its own rocket,
//! broadcasts its position when it changes, and mirrors the other players
//! from the frames the server relays.
//!
//! ## Architecture Overview
//!
//! Two kinds of callbacks drive the game, and both run to completion on a
//! single owner so they never interleave:
//!
//! - **Transport events** (open, message, close) are handed to the
//!   [`game::GameController`], which routes messages through the
//!   [`dispatcher`] into the local player or the [`roster::Roster`].
//! - **Scheduled steps** come from the [`scheduler::FrameScheduler`], a
//!   re-arming single-shot timer with a 30ms nominal interval. Each step
//!   simulates, renders, and broadcasts the local state if it changed.
//!
//! Remote players outside the screen are drawn as markers on the screen
//! border, computed by the [`indicator`] module.
//!
//! ## Module Organization
//!
//! ### Dispatcher Module (`dispatcher`)
//! Decodes inbound frames and applies them. Malformed frames are dropped,
//! unknown kinds are ignored and updates for unknown players are no-ops.
//!
//! ### Roster Module (`roster`)
//! Remote players in insertion order with constant-time lookup by id.
//! Duplicate joins replace the existing entry.
//!
//! ### Scheduler Module (`scheduler`)
//! Fixed-cadence stepping where a slow step lengthens the period instead of
//! queueing more steps.
//!
//! ### Indicator Module (`indicator`)
//! Line/edge intersection for off-screen players, with parallel lines
//! detected and skipped.
//!
//! ### Network Module (`network`)
//! WebSocket transport running on tokio, exposed to the game as a stream of
//! events plus a `send` method.
//!
//! ### Rendering Module (`rendering`)
//! The `Surface` drawing seam with a macroquad implementation and a
//! recording implementation for headless runs.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::game::{GameConfig, GameController};
//! use client::network::TransportEvent;
//! use client::rendering::RecordingSurface;
//! use tokio::time::Instant;
//!
//! let mut outbound: Vec<String> = Vec::new();
//! let mut surface = RecordingSurface::default();
//! let mut game = GameController::new(GameConfig::default());
//!
//! game.handle_event(TransportEvent::Open, &mut outbound);
//! game.handle_event(
//!     TransportEvent::Message(r#"{"type":"newPlayer","id":7,"x":10,"y":20,"angle":0}"#.into()),
//!     &mut outbound,
//! );
//! game.tick(Instant::now(), &mut outbound, &mut surface);
//! ```

pub mod dispatcher;
pub mod game;
pub mod indicator;
pub mod input;
pub mod network;
pub mod player;
pub mod rendering;
pub mod roster;
pub mod scheduler;
pub mod stars;
pub mod viewport;
