//! Strictly 2048 Autoplay - the asynchronous side of the game.
//!
//! This crate wires a [`strictly_2048::GameEngine`] to a move oracle and a
//! presentation layer:
//!
//! - **Oracle seam**: an async request/response [`Oracle`] trait, a
//!   channel-backed worker ([`ChannelOracle`]) running a synchronous
//!   [`MoveEvaluator`], and a built-in [`GreedyEvaluator`].
//! - **Controller**: [`AiController`] maps strength tiers to requests and
//!   bounds each call with a timeout.
//! - **Session**: [`GameSession`] is the single owner of the game. It runs
//!   a loop over [`GameCommand`]s and at most one in-flight oracle call,
//!   presenting a [`Snapshot`] to a [`PresentationSink`] after each change.
//! - **Storage**: [`SqliteStore`] persists saved games with diesel.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_2048::MemoryStore;
//! use strictly_autoplay::{
//!     AutoplayConfig, ChannelOracle, GameCommand, GameSession, GreedyEvaluator, LogSink,
//! };
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = AutoplayConfig::default();
//! let oracle = Arc::new(ChannelOracle::spawn(GreedyEvaluator));
//! let mut session = GameSession::from_config(&config, MemoryStore::new(), oracle, LogSink);
//!
//! let (commands, rx) = tokio::sync::mpsc::unbounded_channel();
//! commands.send(GameCommand::ToggleAutoplay)?;
//! session.run(rx).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod controller;
mod error;
mod events;
mod greedy;
mod oracle;
mod session;
mod sink;
mod store;

// Crate-level exports - Oracle seam
pub use error::OracleError;
pub use greedy::GreedyEvaluator;
pub use oracle::{
    ChannelOracle, MoveEvaluator, NO_MOVE_CODE, Oracle, OracleReply, OracleRequest,
};

// Crate-level exports - Control
pub use controller::{AiController, OracleCall};
pub use events::{GameCommand, Snapshot};
pub use session::GameSession;
pub use sink::{ChannelSink, Frame, LogSink, PresentationSink};

// Crate-level exports - Storage
pub use store::{KvEntry, MIGRATIONS, NewKvEntry, SqliteStore, open_backend};

// Crate-level exports - Configuration
pub use config::AutoplayConfig;
