//! The move-evaluation oracle seam.
//!
//! The oracle is a black box reached through an asynchronous
//! request/response channel: it receives a flattened board plus two tuning
//! parameters and answers with a direction code.

use std::sync::Arc;

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use strictly_2048::{Direction, StrengthTier};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument};

use crate::OracleError;

/// Wire code the oracle uses to say no move is possible.
pub const NO_MOVE_CODE: u8 = 4;

/// One oracle request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct OracleRequest {
    /// Row-major tile values, `0` for empty cells.
    grid: Vec<u32>,
    /// Search branches below this probability are pruned.
    min_probability: f32,
    /// Maximum search depth.
    max_depth: u8,
}

impl OracleRequest {
    /// Builds a request for `grid` tuned by `tier`.
    pub fn for_tier(grid: Vec<u32>, tier: StrengthTier) -> Self {
        Self::new(grid, tier.min_probability, tier.max_depth)
    }
}

/// A decoded oracle reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleReply {
    /// Play this direction.
    Move(Direction),
    /// The oracle found no legal move.
    NoMove,
}

impl OracleReply {
    /// Decodes a wire code, failing fast on anything unknown.
    #[instrument]
    pub fn decode(code: u8) -> Result<Self, OracleError> {
        if code == NO_MOVE_CODE {
            return Ok(Self::NoMove);
        }
        Direction::from_code(code).map(Self::Move).ok_or_else(|| {
            error!(code, "Oracle replied with an unknown direction code");
            OracleError::InvalidDirection(code)
        })
    }
}

/// Asynchronous move oracle.
#[async_trait::async_trait]
pub trait Oracle: Send + Sync {
    /// Evaluates a board and returns the raw direction code.
    async fn evaluate(&self, request: OracleRequest) -> Result<u8, OracleError>;
}

/// A synchronous, CPU-bound move search run behind a [`ChannelOracle`].
pub trait MoveEvaluator: Send + Sync {
    /// Returns the direction code for the request.
    fn evaluate(&self, request: &OracleRequest) -> u8;
}

impl<F> MoveEvaluator for F
where
    F: Fn(&OracleRequest) -> u8 + Send + Sync,
{
    fn evaluate(&self, request: &OracleRequest) -> u8 {
        self(request)
    }
}

/// A queued request with its reply slot.
#[derive(Debug)]
struct OracleJob {
    request: OracleRequest,
    reply: oneshot::Sender<u8>,
}

/// Oracle backed by a worker task.
///
/// Requests travel over an `mpsc` channel; each carries a `oneshot` sender
/// for its reply. The worker answers jobs one at a time on the blocking
/// pool and stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct ChannelOracle {
    jobs: mpsc::UnboundedSender<OracleJob>,
}

impl ChannelOracle {
    /// Spawns the worker on the current tokio runtime.
    #[instrument(skip(evaluator))]
    pub fn spawn<E: MoveEvaluator + 'static>(evaluator: E) -> Self {
        let (jobs, mut queue) = mpsc::unbounded_channel::<OracleJob>();
        let evaluator = Arc::new(evaluator);

        tokio::spawn(async move {
            info!("Oracle worker started");
            while let Some(OracleJob { request, reply }) = queue.recv().await {
                let evaluator = Arc::clone(&evaluator);
                match tokio::task::spawn_blocking(move || evaluator.evaluate(&request)).await {
                    Ok(code) => {
                        if reply.send(code).is_err() {
                            debug!(code, "Requester stopped waiting; reply dropped");
                        }
                    }
                    Err(e) => {
                        // Dropping `reply` surfaces as Disconnected to the caller.
                        error!(error = %e, "Move evaluator failed");
                    }
                }
            }
            info!("Oracle worker stopped");
        });

        Self { jobs }
    }
}

#[async_trait::async_trait]
impl Oracle for ChannelOracle {
    #[instrument(skip(self, request), fields(max_depth = request.max_depth()))]
    async fn evaluate(&self, request: OracleRequest) -> Result<u8, OracleError> {
        let (reply, answer) = oneshot::channel();
        self.jobs
            .send(OracleJob { request, reply })
            .map_err(|_| OracleError::Disconnected)?;
        answer.await.map_err(|_| OracleError::Disconnected)
    }
}
