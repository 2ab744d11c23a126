//! Presentation sinks.
//!
//! A session awaits [`PresentationSink::present`] after every state change;
//! the await completing is the acknowledgement, so rendering never falls
//! more than one frame behind.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument};

use crate::Snapshot;

/// Receives snapshots from a session.
#[async_trait::async_trait]
pub trait PresentationSink: Send {
    /// Shows a snapshot and returns once it has been handled.
    async fn present(&mut self, snapshot: Snapshot) -> anyhow::Result<()>;
}

/// A snapshot in transit with its acknowledgement slot.
#[derive(Debug)]
pub struct Frame {
    /// The state to render.
    pub snapshot: Snapshot,
    /// Signal back once rendered.
    pub ack: oneshot::Sender<()>,
}

impl Frame {
    /// Acknowledges the frame and hands back its snapshot.
    pub fn acknowledge(self) -> Snapshot {
        // A session that already went away has nothing left to wait for.
        let _ = self.ack.send(());
        self.snapshot
    }
}

/// Forwards frames to a renderer over a channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    frames: mpsc::UnboundedSender<Frame>,
}

impl ChannelSink {
    /// Creates a sink and the receiver a renderer reads frames from.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Frame>) {
        let (frames, rx) = mpsc::unbounded_channel();
        (Self { frames }, rx)
    }
}

#[async_trait::async_trait]
impl PresentationSink for ChannelSink {
    #[instrument(skip(self, snapshot), fields(score = snapshot.score()))]
    async fn present(&mut self, snapshot: Snapshot) -> anyhow::Result<()> {
        let (ack, acked) = oneshot::channel();
        self.frames
            .send(Frame { snapshot, ack })
            .map_err(|_| anyhow::anyhow!("Renderer is gone"))?;
        acked
            .await
            .map_err(|_| anyhow::anyhow!("Renderer dropped a frame without acknowledging it"))?;
        debug!("Frame acknowledged");
        Ok(())
    }
}

/// Logs snapshots through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait::async_trait]
impl PresentationSink for LogSink {
    async fn present(&mut self, snapshot: Snapshot) -> anyhow::Result<()> {
        info!(
            score = snapshot.score(),
            best_score = snapshot.best_score(),
            phase = %snapshot.phase(),
            strength = snapshot.strength().level(),
            autoplay = snapshot.autoplay_enabled(),
            "Game state"
        );
        debug!(grid = %snapshot.grid(), "Board");
        Ok(())
    }
}
