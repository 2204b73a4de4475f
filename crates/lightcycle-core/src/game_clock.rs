use std::time::Duration;

use crate::game_trait::{ArenaGame, GameEvent};
use crate::time::{Clock, SystemClock};

/// Fixed-timestep accumulator between a host's render frames and the
/// simulation.
///
/// The step threshold is re-read from [`ArenaGame::tick_rate`] every frame, so
/// a game whose tick rate follows its fastest player speeds up as a whole.
/// At most one simulation tick runs per frame; leftover time carries over.
pub struct GameClock<C: Clock = SystemClock> {
    clock: C,
    accumulated: f64,
    ticks: u64,
}

impl GameClock<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for GameClock<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> GameClock<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            accumulated: 0.0,
            ticks: 0,
        }
    }

    /// Time banked toward the next tick.
    pub fn accumulated(&self) -> Duration {
        Duration::from_secs_f64(self.accumulated.max(0.0))
    }

    /// Total simulation ticks run by this clock.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Drop any banked time, e.g. after the host was suspended.
    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }

    /// Seconds between ticks at the game's current rate.
    pub fn step_threshold(game: &dyn ArenaGame) -> Option<f64> {
        let rate = f64::from(game.tick_rate());
        (rate.is_finite() && rate > 0.0).then(|| 1.0 / rate)
    }

    /// Feed one frame's elapsed wall time. Runs one simulation tick when the
    /// banked time exceeds the current threshold and returns its events.
    pub fn advance(
        &mut self,
        game: &mut dyn ArenaGame,
        elapsed: Duration,
    ) -> Option<Vec<GameEvent>> {
        if game.is_paused() {
            return None;
        }
        self.accumulated += elapsed.as_secs_f64();

        let Some(threshold) = Self::step_threshold(game) else {
            tracing::warn!(tick_rate = game.tick_rate(), "Ignoring frame: invalid tick rate");
            return None;
        };
        if self.accumulated <= threshold {
            return None;
        }

        self.accumulated -= threshold;
        self.ticks += 1;
        tracing::trace!(tick = self.ticks, threshold, "Simulation tick");
        Some(game.update(self.clock.now()))
    }
}
