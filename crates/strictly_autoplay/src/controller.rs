//! Strength-tiered access to the oracle.

use std::sync::Arc;
use std::time::Duration;

use strictly_2048::{Strength, StrengthTier};
use tracing::{debug, info, instrument, warn};

use crate::{Oracle, OracleError, OracleReply, OracleRequest};

/// Holds the oracle strength and turns boards into oracle requests.
///
/// The controller does not rate-limit; pacing belongs to the session.
#[derive(Clone)]
pub struct AiController {
    strength: Strength,
    oracle: Arc<dyn Oracle>,
    timeout: Duration,
}

impl std::fmt::Debug for AiController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiController")
            .field("strength", &self.strength)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AiController {
    /// Creates a controller over `oracle`.
    pub fn new(oracle: Arc<dyn Oracle>, strength: Strength, timeout: Duration) -> Self {
        Self {
            strength,
            oracle,
            timeout,
        }
    }

    /// Current strength.
    pub fn strength(&self) -> Strength {
        self.strength
    }

    /// Tuning parameters for the current strength.
    pub fn tier(&self) -> StrengthTier {
        self.strength.tier()
    }

    /// Per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Raises the strength one level, saturating at the top tier.
    #[instrument(skip(self), fields(from = self.strength.level()))]
    pub fn increase(&mut self) -> Strength {
        self.strength = self.strength.increased();
        info!(strength = self.strength.level(), "Oracle strength raised");
        self.strength
    }

    /// Lowers the strength one level, saturating at the bottom tier.
    #[instrument(skip(self), fields(from = self.strength.level()))]
    pub fn decrease(&mut self) -> Strength {
        self.strength = self.strength.decreased();
        info!(strength = self.strength.level(), "Oracle strength lowered");
        self.strength
    }

    /// Assigns a clamped strength directly.
    #[instrument(skip(self))]
    pub fn set_strength(&mut self, level: u8) -> Strength {
        self.strength = Strength::clamped(level);
        self.strength
    }

    /// Prepares one oracle call for `board` at the current tier.
    ///
    /// The returned call owns everything it needs, so it can be awaited
    /// while the controller is mutated.
    pub fn request(&self, board: Vec<u32>) -> OracleCall {
        OracleCall {
            oracle: Arc::clone(&self.oracle),
            request: OracleRequest::for_tier(board, self.tier()),
            timeout: self.timeout,
        }
    }

    /// Asks the oracle for a direction and waits for the decoded reply.
    #[instrument(skip(self, board), fields(strength = self.strength.level()))]
    pub async fn choose_direction(&self, board: Vec<u32>) -> Result<OracleReply, OracleError> {
        self.request(board).send().await
    }
}

/// A single in-flight oracle request.
pub struct OracleCall {
    oracle: Arc<dyn Oracle>,
    request: OracleRequest,
    timeout: Duration,
}

impl std::fmt::Debug for OracleCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleCall")
            .field("request", &self.request)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OracleCall {
    /// The request that will be sent.
    pub fn request(&self) -> &OracleRequest {
        &self.request
    }

    /// Sends the request and decodes the reply, bounded by the timeout.
    pub async fn send(self) -> Result<OracleReply, OracleError> {
        debug!(
            min_probability = self.request.min_probability(),
            max_depth = self.request.max_depth(),
            "Sending oracle request"
        );
        match tokio::time::timeout(self.timeout, self.oracle.evaluate(self.request)).await {
            Ok(Ok(code)) => OracleReply::decode(code),
            Ok(Err(e)) => {
                warn!(error = %e, "Oracle call failed");
                Err(e)
            }
            Err(_) => {
                let after_ms = self.timeout.as_millis() as u64;
                warn!(after_ms, "Oracle call timed out");
                Err(OracleError::TimedOut { after_ms })
            }
        }
    }
}
