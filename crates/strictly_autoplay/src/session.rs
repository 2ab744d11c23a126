//! The session loop: one owner of the game, driven by commands and oracle replies.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use strictly_2048::{Direction, GameEngine, GamePhase, KeyValueStore, MoveOutcome, Strength};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    AiController, AutoplayConfig, GameCommand, Oracle, OracleError, OracleReply,
    PresentationSink, Snapshot,
};

/// An oracle request in flight, tagged with the board generation it was
/// issued for.
#[derive(Debug)]
struct PendingMove {
    generation: u64,
    handle: JoinHandle<Result<OracleReply, OracleError>>,
}

/// Composes the engine, the oracle controller, and a presentation sink.
///
/// Every mutation happens on the task that drives the session, one event
/// at a time. Persistence happens inside the engine before the snapshot is
/// presented, and the next autoplay request is only issued once the sink
/// has acknowledged.
pub struct GameSession<S, P> {
    engine: GameEngine<S>,
    controller: AiController,
    sink: P,
    cadence: Duration,
    autoplay: bool,
    generation: u64,
    rng: StdRng,
}

impl<S, P> GameSession<S, P>
where
    S: KeyValueStore,
    P: PresentationSink,
{
    /// Creates a session. Nothing is loaded until [`GameSession::start`].
    pub fn new(engine: GameEngine<S>, controller: AiController, sink: P, cadence: Duration) -> Self {
        Self {
            engine,
            controller,
            sink,
            cadence,
            autoplay: false,
            generation: 0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Builds a session from configuration.
    #[instrument(skip_all, fields(strength = config.initial_strength()))]
    pub fn from_config(
        config: &AutoplayConfig,
        backend: S,
        oracle: Arc<dyn Oracle>,
        sink: P,
    ) -> Self {
        let engine = GameEngine::new(config.game().clone(), backend);
        let controller = AiController::new(
            oracle,
            Strength::clamped(*config.initial_strength()),
            config.oracle_timeout(),
        );
        Self::new(engine, controller, sink, config.move_cadence())
    }

    /// The game.
    pub fn engine(&self) -> &GameEngine<S> {
        &self.engine
    }

    /// The oracle controller.
    pub fn controller(&self) -> &AiController {
        &self.controller
    }

    /// The presentation sink.
    pub fn sink(&self) -> &P {
        &self.sink
    }

    /// Whether the oracle is driving.
    pub fn autoplay_enabled(&self) -> bool {
        self.autoplay
    }

    /// Presentation payload for the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_engine(&self.engine, self.controller.strength(), self.autoplay)
    }

    /// Resumes or starts the game and shows the first frame.
    ///
    /// A resumed game brings its saved strength with it; a fresh game
    /// records the controller's strength instead.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> anyhow::Result<()> {
        match self.engine.setup() {
            Some(strength) => {
                self.controller.set_strength(strength.level());
                info!(strength = strength.level(), "Adopted saved oracle strength");
            }
            None => self.engine.set_ai_strength(self.controller.strength()),
        }
        self.emit().await
    }

    /// Applies one command. `Quit` is left to [`GameSession::run`].
    #[instrument(skip(self, command), fields(command = %command))]
    pub async fn handle(&mut self, command: GameCommand) -> anyhow::Result<()> {
        match command {
            GameCommand::Move(direction) => {
                self.move_tiles(direction).await?;
            }
            GameCommand::Restart => self.restart().await?,
            GameCommand::KeepPlaying => self.keep_playing().await?,
            GameCommand::StrengthUp => {
                self.plus().await?;
            }
            GameCommand::StrengthDown => {
                self.minus().await?;
            }
            GameCommand::ToggleAutoplay => {
                self.toggle_autoplay().await?;
            }
            GameCommand::Quit => debug!("Quit is handled by the session loop"),
        }
        Ok(())
    }

    /// Slides tiles and shows the result if anything moved.
    #[instrument(skip(self))]
    pub async fn move_tiles(&mut self, direction: Direction) -> anyhow::Result<MoveOutcome> {
        let outcome = self.engine.move_tiles(direction);
        if outcome.moved() {
            self.generation += 1;
            self.emit().await?;
        }
        Ok(outcome)
    }

    /// Starts a new game. Autoplay stays as it was.
    #[instrument(skip(self))]
    pub async fn restart(&mut self) -> anyhow::Result<()> {
        self.engine.restart();
        self.generation += 1;
        self.emit().await
    }

    /// Continues after a win.
    #[instrument(skip(self))]
    pub async fn keep_playing(&mut self) -> anyhow::Result<()> {
        self.engine.keep_playing();
        self.emit().await
    }

    /// Raises oracle strength and saves it with the game.
    #[instrument(skip(self))]
    pub async fn plus(&mut self) -> anyhow::Result<Strength> {
        let strength = self.controller.increase();
        self.engine.set_ai_strength(strength);
        self.emit().await?;
        Ok(strength)
    }

    /// Lowers oracle strength and saves it with the game.
    #[instrument(skip(self))]
    pub async fn minus(&mut self) -> anyhow::Result<Strength> {
        let strength = self.controller.decrease();
        self.engine.set_ai_strength(strength);
        self.emit().await?;
        Ok(strength)
    }

    /// Flips autoplay and returns the new setting.
    #[instrument(skip(self), fields(was = self.autoplay))]
    pub async fn toggle_autoplay(&mut self) -> anyhow::Result<bool> {
        self.autoplay = !self.autoplay;
        info!(enabled = self.autoplay, "Autoplay toggled");
        self.emit().await?;
        Ok(self.autoplay)
    }

    /// Runs until `Quit` arrives or the command channel closes.
    ///
    /// While autoplay is on and the game is live, exactly one oracle
    /// request is in flight. Its reply is applied no sooner than the move
    /// cadence after it was issued, and only if autoplay is still on and
    /// the board has not changed in the meantime.
    #[instrument(skip_all)]
    pub async fn run(
        &mut self,
        mut commands: mpsc::UnboundedReceiver<GameCommand>,
    ) -> anyhow::Result<()> {
        if self.engine.phase() == GamePhase::Setup {
            self.start().await?;
        }
        info!("Session loop started");

        let mut pending: Option<PendingMove> = None;
        loop {
            if pending.is_none() && self.wants_oracle() {
                pending = Some(self.request_move());
            }

            // Commands first: a queued toggle-off must land before a ready reply.
            tokio::select! {
                biased;

                command = commands.recv() => {
                    let command = match command {
                        Some(GameCommand::Quit) | None => break,
                        Some(command) => command,
                    };
                    self.handle(command).await?;

                    let stale = pending
                        .as_ref()
                        .is_some_and(|p| !self.autoplay || p.generation != self.generation);
                    if stale {
                        debug!("Abandoning in-flight oracle request");
                        pending = None;
                    }
                }
                joined = async {
                    match pending.as_mut() {
                        Some(p) => (&mut p.handle).await,
                        None => std::future::pending().await,
                    }
                } => {
                    let generation = pending.take().map_or(0, |p| p.generation);
                    let reply = joined.unwrap_or_else(|e| {
                        warn!(error = %e, "Oracle task ended without a reply");
                        Err(OracleError::Disconnected)
                    });
                    self.resolve_reply(generation, reply).await?;
                }
            }
        }

        info!(score = self.engine.score(), "Session loop stopped");
        Ok(())
    }

    fn wants_oracle(&self) -> bool {
        self.autoplay && !self.engine.is_terminated()
    }

    /// Issues a request for the current board. The task resolves no
    /// earlier than the cadence.
    fn request_move(&self) -> PendingMove {
        let call = self.controller.request(self.engine.grid().for_oracle());
        let cadence = self.cadence;
        debug!(generation = self.generation, "Requesting oracle move");
        let handle = tokio::spawn(async move {
            let (reply, ()) = tokio::join!(call.send(), tokio::time::sleep(cadence));
            reply
        });
        PendingMove {
            generation: self.generation,
            handle,
        }
    }

    /// Applies an oracle reply, unless it no longer applies.
    #[instrument(skip(self, reply))]
    async fn resolve_reply(
        &mut self,
        generation: u64,
        reply: Result<OracleReply, OracleError>,
    ) -> anyhow::Result<()> {
        // Last check before applying. `run` normally abandons such calls
        // as soon as the command that made them stale is handled.
        if !self.autoplay {
            info!("Autoplay is off; discarding oracle reply");
            return Ok(());
        }
        if generation != self.generation {
            warn!(
                issued = generation,
                current = self.generation,
                "Board changed while the oracle was thinking; discarding reply"
            );
            return Ok(());
        }

        match reply {
            Ok(OracleReply::Move(direction)) => {
                if self.move_tiles(direction).await? == MoveOutcome::Blocked {
                    warn!(%direction, "Oracle chose a blocked direction");
                    self.fallback_move().await?;
                }
            }
            Ok(OracleReply::NoMove) => {
                info!("Oracle found no move; autoplay off");
                self.autoplay = false;
                self.emit().await?;
            }
            Err(e) if e.is_transient() => {
                warn!(error = %e, "Playing a random legal move instead");
                self.fallback_move().await?;
            }
            Err(e) => {
                error!(error = %e, "Autoplay disabled");
                self.autoplay = false;
                self.emit().await?;
            }
        }
        Ok(())
    }

    /// Plays a uniformly random legal direction.
    async fn fallback_move(&mut self) -> anyhow::Result<()> {
        let legal = self.engine.legal_directions();
        match legal.choose(&mut self.rng).copied() {
            Some(direction) => {
                debug!(%direction, "Fallback move");
                self.move_tiles(direction).await?;
            }
            None => {
                info!("No legal move for fallback; autoplay off");
                self.autoplay = false;
                self.emit().await?;
            }
        }
        Ok(())
    }

    async fn emit(&mut self) -> anyhow::Result<()> {
        let snapshot = self.snapshot();
        self.sink.present(snapshot).await
    }
}
