pub mod arena;
pub mod collision;
pub mod config;
pub mod effects;
pub mod input;
pub mod motion;
pub mod round;
pub mod tokens;
pub mod trail;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use lightcycle_core::arena_game_boilerplate;
use lightcycle_core::effect::EffectSet;
use lightcycle_core::game_trait::{ArenaGame, GameConfig, GameEvent, GameMetadata, PlayerScore};
use lightcycle_core::player::{PlayerColor, PlayerSlot};
use lightcycle_core::time::Millis;

use arena::SpawnPoint;
use config::{ConfigError, DuelConfig};
use effects::{DuelEffect, NORMAL_SIZE};
use input::SteerInput;
use motion::SpeedMultiplier;
use round::{RoundOutcome, RoundPhase};
use tokens::TokenField;
use trail::Trail;

/// Cardinal direction on the screen grid. North is toward y = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Unit step in screen coordinates.
    pub fn unit(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Same axis, either way.
    pub fn is_parallel(self, other: Direction) -> bool {
        let (ax, _) = self.unit();
        let (bx, _) = other.unit();
        (ax == 0) == (bx == 0)
    }
}

/// State of a single cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleState {
    pub slot: PlayerSlot,
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
    /// 1 normally, 3 while big.
    pub size: u8,
    pub speed: SpeedMultiplier,
    pub trail: Trail,
    pub effects: EffectSet<DuelEffect>,
    /// Round wins in the current match.
    pub score: u32,
    pub color: PlayerColor,
}

impl CycleState {
    pub fn spawn(slot: PlayerSlot, spawn: &SpawnPoint) -> Self {
        Self {
            slot,
            x: spawn.x,
            y: spawn.y,
            direction: spawn.direction,
            size: NORMAL_SIZE,
            speed: SpeedMultiplier::ONE,
            trail: Trail::default(),
            effects: EffectSet::default(),
            score: 0,
            color: slot.default_color(),
        }
    }

    /// Back to the spawn with round state cleared. Score and color survive.
    pub fn reset_to(&mut self, spawn: &SpawnPoint) {
        *self = Self {
            score: self.score,
            color: self.color,
            ..Self::spawn(self.slot, spawn)
        };
    }

    /// Pixel displacement per tick at the current heading and speed.
    pub fn velocity(&self, cell_size: i32) -> (i32, i32) {
        let (dx, dy) = self.direction.unit();
        let step = self.speed.scale(cell_size);
        (dx * step, dy * step)
    }
}

/// Serializable game state, read by renderers and score displays. Canvas
/// geometry is not part of it; read it from [`LightCycleDuel::config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelState {
    /// Indexed by [`PlayerSlot::index`].
    pub cycles: [CycleState; 2],
    pub tokens: TokenField,
    pub phase: RoundPhase,
    pub round_number: u32,
    pub match_number: u32,
    /// Simulation ticks since the game was created.
    pub tick: u64,
    pub last_outcome: Option<RoundOutcome>,
    pub last_match_winner: Option<PlayerSlot>,
}

impl DuelState {
    pub fn new(config: &DuelConfig, rng: &mut impl Rng) -> Self {
        let extent = config.extent();
        Self {
            cycles: PlayerSlot::ALL
                .map(|slot| CycleState::spawn(slot, &config.spawn_points[slot.index()])),
            tokens: TokenField::scatter(extent, config.cell_size, rng),
            phase: RoundPhase::Active,
            round_number: 1,
            match_number: 1,
            tick: 0,
            last_outcome: None,
            last_match_winner: None,
        }
    }

    pub fn cycle(&self, slot: PlayerSlot) -> &CycleState {
        &self.cycles[slot.index()]
    }

    pub fn cycle_mut(&mut self, slot: PlayerSlot) -> &mut CycleState {
        &mut self.cycles[slot.index()]
    }

    /// Fastest speed factor on the field.
    pub fn max_speed_factor(&self) -> f32 {
        self.cycles
            .iter()
            .map(|c| c.speed.factor())
            .fold(f32::MIN, f32::max)
    }
}

/// Split the pair into `(slot's cycle, opponent's cycle)`.
fn pair_mut(cycles: &mut [CycleState; 2], slot: PlayerSlot) -> (&mut CycleState, &mut CycleState) {
    let [one, two] = cycles;
    match slot {
        PlayerSlot::One => (one, two),
        PlayerSlot::Two => (two, one),
    }
}

/// The two-player light-cycle duel.
pub struct LightCycleDuel {
    state: DuelState,
    paused: bool,
    rng: StdRng,
    game_config: DuelConfig,
}

impl LightCycleDuel {
    /// Build from [`DuelConfig::load`].
    pub fn new() -> Self {
        Self::with_valid_config(DuelConfig::load())
    }

    pub fn try_with_config(config: DuelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    /// Loaded config with per-session overrides merged on top.
    pub fn with_game_config(game_config: &GameConfig) -> Result<Self, ConfigError> {
        Self::try_with_config(DuelConfig::load().with_overrides(game_config)?)
    }

    fn with_valid_config(config: DuelConfig) -> Self {
        let mut rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let state = DuelState::new(&config, &mut rng);
        let extent = config.extent();
        tracing::debug!(
            width = extent.width,
            height = extent.height,
            cell_size = config.cell_size,
            "Duel created"
        );
        Self {
            state,
            paused: false,
            rng,
            game_config: config,
        }
    }

    pub fn state(&self) -> &DuelState {
        &self.state
    }

    /// Owned copy of the state for a renderer on another thread.
    pub fn snapshot(&self) -> DuelState {
        self.state.clone()
    }

    pub fn config(&self) -> &DuelConfig {
        &self.game_config
    }

    /// Request a heading change. Returns whether it was accepted.
    pub fn steer(&mut self, slot: PlayerSlot, direction: Direction) -> bool {
        let accepted = motion::steer(self.state.cycle_mut(slot), direction);
        if !accepted {
            tracing::trace!(%slot, ?direction, "Ignored parallel steer");
        }
        accepted
    }

    /// Route a key press through the configured bindings. Unbound keys and
    /// rejected turns return `false`.
    pub fn handle_key(&mut self, key: &str) -> bool {
        match input::resolve_key(&self.game_config.key_bindings, key) {
            Some(binding) => self.steer(binding.slot, binding.direction),
            None => false,
        }
    }

    /// Place a token by hand, e.g. for scripted scenarios.
    pub fn place_token(&mut self, kind: DuelEffect, x: i32, y: i32) {
        self.state.tokens.place(kind, x, y);
    }

    /// One simulation tick: move, collide, collect, expire.
    fn step(&mut self, now: Millis) -> Vec<GameEvent> {
        self.state.tick += 1;
        let extent = self.game_config.extent();
        let cell_size = self.game_config.cell_size;

        for cycle in &mut self.state.cycles {
            motion::move_cycle(cycle, extent, cell_size);
        }

        if let Some(crash) = collision::deciding_crash(&self.state.cycles) {
            return round::conclude_round(&mut self.state, crash, &self.game_config);
        }

        let DuelState { cycles, tokens, .. } = &mut self.state;
        for slot in PlayerSlot::ALL {
            let (collector, opponent) = pair_mut(cycles, slot);
            tokens.collect(collector, opponent, &self.game_config, now, &mut self.rng);
        }

        for cycle in &mut self.state.cycles {
            effects::expire_effects(cycle, now);
        }
        Vec::new()
    }
}

impl Default for LightCycleDuel {
    fn default() -> Self {
        Self::with_valid_config(DuelConfig::default())
    }
}

impl ArenaGame for LightCycleDuel {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Light Cycle Duel".to_string(),
            description: "Steer your trail, grab tokens, make the other cycle crash.".to_string(),
            player_count: 2,
        }
    }

    /// Base rate scaled by the faster cycle, so one player's speed boost
    /// speeds up the whole simulation.
    fn tick_rate(&self) -> f32 {
        self.game_config.base_speed * self.state.max_speed_factor()
    }

    fn update(&mut self, now: Millis) -> Vec<GameEvent> {
        if self.paused {
            return Vec::new();
        }
        self.step(now)
    }

    arena_game_boilerplate!(state_type: DuelState);

    fn apply_input(&mut self, slot: PlayerSlot, input: &[u8]) {
        match rmp_serde::from_slice::<SteerInput>(input) {
            Err(e) => {
                tracing::debug!(%slot, error = %e, "Dropped malformed steer input");
            },
            Ok(steer) => {
                self.steer(slot, steer.direction);
            },
        }
    }

    fn scores(&self) -> Vec<PlayerScore> {
        PlayerSlot::ALL
            .iter()
            .map(|&slot| PlayerScore {
                slot,
                score: self.state.cycle(slot).score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightcycle_core::test_helpers::{TEST_EPOCH, run_game_ticks};

    fn seeded() -> LightCycleDuel {
        let mut game = LightCycleDuel::try_with_config(DuelConfig {
            rng_seed: Some(11),
            ..DuelConfig::default()
        })
        .unwrap();
        // Keep tokens out of the default lanes.
        for kind in DuelEffect::ALL {
            game.place_token(kind, 700, 500);
        }
        game
    }

    fn steer_bytes(direction: Direction) -> Vec<u8> {
        rmp_serde::to_vec(&SteerInput { direction }).unwrap()
    }

    #[test]
    fn first_tick_moves_both_cycles_one_cell() {
        let mut game = seeded();
        let events = game.update(TEST_EPOCH);
        assert!(events.is_empty());
        let p1 = game.state.cycle(PlayerSlot::One);
        let p2 = game.state.cycle(PlayerSlot::Two);
        assert_eq!((p1.x, p1.y), (110, 100));
        assert_eq!((p2.x, p2.y), (290, 300));
        assert_eq!(game.state.tick, 1);
    }

    #[test]
    fn trails_grow_one_cell_per_tick() {
        let mut game = seeded();
        for n in 1..=10 {
            game.update(TEST_EPOCH);
            for slot in PlayerSlot::ALL {
                assert_eq!(game.state.cycle(slot).trail.len(), n);
            }
        }
    }

    #[test]
    fn u_turn_into_own_trail_loses_round() {
        let mut game = seeded();
        run_game_ticks(&mut game, 2, TEST_EPOCH);
        assert!(game.steer(PlayerSlot::One, Direction::South));
        game.update(TEST_EPOCH);
        assert!(game.steer(PlayerSlot::One, Direction::West));
        game.update(TEST_EPOCH);
        assert!(game.steer(PlayerSlot::One, Direction::North));

        let events = game.update(TEST_EPOCH);
        assert!(events.contains(&GameEvent::RoundComplete {
            winner: PlayerSlot::Two,
        }));
        assert_eq!(game.state.cycle(PlayerSlot::Two).score, 1);
        assert_eq!(
            game.state.last_outcome.map(|o| o.crash.kind),
            Some(collision::CrashKind::OwnTrail)
        );
        for slot in PlayerSlot::ALL {
            assert!(game.state.cycle(slot).trail.is_empty());
        }
    }

    #[test]
    fn reversal_request_is_ignored() {
        let mut game = seeded();
        assert!(!game.steer(PlayerSlot::One, Direction::West));
        assert_eq!(game.state.cycle(PlayerSlot::One).direction, Direction::East);
        assert_eq!(game.state.cycle(PlayerSlot::One).velocity(10), (10, 0));
    }

    #[test]
    fn key_bindings_steer_the_right_cycle() {
        let mut game = seeded();
        assert!(game.handle_key("ArrowUp"));
        assert!(game.handle_key("s"));
        assert!(!game.handle_key("ArrowDown"), "Reversal is ignored");
        assert!(!game.handle_key("q"));
        assert_eq!(game.state.cycle(PlayerSlot::One).direction, Direction::North);
        assert_eq!(game.state.cycle(PlayerSlot::Two).direction, Direction::South);
    }

    #[test]
    fn tick_rate_follows_fastest_cycle() {
        let mut game = seeded();
        assert_eq!(game.tick_rate(), 8.0);
        game.state.cycle_mut(PlayerSlot::Two).speed.double();
        assert_eq!(game.tick_rate(), 16.0);
        game.state.cycle_mut(PlayerSlot::Two).speed.halve();
        game.state.cycle_mut(PlayerSlot::Two).speed.halve();
        assert_eq!(game.tick_rate(), 8.0, "Slowed player does not slow the clock");
    }

    #[test]
    fn pickup_then_expiry_in_update_loop() {
        let mut game = seeded();
        game.place_token(DuelEffect::Fast, 110, 100);
        game.update(TEST_EPOCH);
        assert_eq!(game.state.cycle(PlayerSlot::One).speed.factor(), 2.0);
        assert_eq!(game.tick_rate(), 16.0);

        // The respawned token must not land on the next head position.
        game.place_token(DuelEffect::Fast, 700, 500);
        game.update(Millis(TEST_EPOCH.0 + 5_000));
        assert_eq!(game.state.cycle(PlayerSlot::One).x, 130);
        assert_eq!(game.state.cycle(PlayerSlot::One).speed, SpeedMultiplier::ONE);
    }

    #[test]
    fn round_end_skips_pickups_for_reset_cycles() {
        let mut game = seeded();
        // A token on player 1's spawn would be collected right after a reset
        // if the round-ending tick kept going.
        game.place_token(DuelEffect::Big, 100, 100);
        game.state.cycle_mut(PlayerSlot::Two).trail.push(trail::TrailCell {
            x: 110,
            y: 100,
            size: 1,
        });
        let events = game.update(TEST_EPOCH);
        assert!(events.contains(&GameEvent::RoundComplete {
            winner: PlayerSlot::Two,
        }));
        assert_eq!(game.state.cycle(PlayerSlot::One).size, 1);
        assert!(game.state.cycle(PlayerSlot::One).effects.is_empty());
    }

    #[test]
    fn try_with_config_rejects_invalid() {
        let bad = DuelConfig {
            cell_size: 3,
            ..DuelConfig::default()
        };
        assert!(matches!(
            LightCycleDuel::try_with_config(bad),
            Err(ConfigError::InvalidCellSize(3))
        ));
    }

    #[test]
    fn game_config_overrides_apply() {
        let mut custom = std::collections::HashMap::new();
        custom.insert("score_to_win".to_string(), serde_json::json!(2));
        custom.insert("rng_seed".to_string(), serde_json::json!(9));
        let game = LightCycleDuel::with_game_config(&GameConfig { custom }).unwrap();
        assert_eq!(game.config().score_to_win, 2);
        assert_eq!(game.config().rng_seed, Some(9));

        let mut custom = std::collections::HashMap::new();
        custom.insert("lives".to_string(), serde_json::json!(3));
        assert!(matches!(
            LightCycleDuel::with_game_config(&GameConfig { custom }),
            Err(ConfigError::UnknownOverride(_))
        ));
    }

    #[test]
    fn applied_state_moves_with_own_cell_size() {
        let mut game = seeded();
        let coarse = LightCycleDuel::try_with_config(DuelConfig {
            cell_size: 20,
            rng_seed: Some(11),
            ..DuelConfig::default()
        })
        .unwrap();
        game.apply_state(&coarse.serialize_state());
        for kind in DuelEffect::ALL {
            game.place_token(kind, 700, 500);
        }

        game.update(TEST_EPOCH);
        let p1 = game.state.cycle(PlayerSlot::One);
        assert_eq!((p1.x, p1.y), (110, 100));
    }

    #[test]
    fn duel_supports_pause() {
        assert!(seeded().supports_pause());
    }

    #[test]
    fn snapshot_is_detached() {
        let mut game = seeded();
        let snap = game.snapshot();
        game.update(TEST_EPOCH);
        assert_eq!(snap.tick, 0);
        assert_ne!(snap, *game.state());
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================

    #[test]
    fn contract_state_is_serializable() {
        let game = seeded();
        lightcycle_core::test_helpers::contract_state_is_serializable(&game);
    }

    #[test]
    fn contract_apply_input_changes_state() {
        let mut game = seeded();
        lightcycle_core::test_helpers::contract_apply_input_changes_state(
            &mut game,
            &steer_bytes(Direction::South),
            PlayerSlot::One,
        );
        assert_eq!(game.state.cycle(PlayerSlot::One).direction, Direction::South);
    }

    #[test]
    fn contract_update_advances_state() {
        let mut game = seeded();
        lightcycle_core::test_helpers::contract_update_advances_state(&mut game);
    }

    #[test]
    fn contract_round_eventually_completes() {
        let mut game = seeded();
        lightcycle_core::test_helpers::contract_round_eventually_completes(&mut game, 500);
    }

    #[test]
    fn contract_state_roundtrip_preserves() {
        let mut game = seeded();
        run_game_ticks(&mut game, 5, TEST_EPOCH);
        lightcycle_core::test_helpers::contract_state_roundtrip_preserves(&mut game);
    }

    #[test]
    fn contract_malformed_state_ignored() {
        let mut game = seeded();
        lightcycle_core::test_helpers::contract_malformed_state_ignored(&mut game);
    }

    #[test]
    fn contract_pause_stops_updates() {
        let mut game = seeded();
        lightcycle_core::test_helpers::contract_pause_stops_updates(&mut game);
    }

    #[test]
    fn contract_scores_cover_both_slots() {
        let game = seeded();
        lightcycle_core::test_helpers::contract_scores_cover_both_slots(&game);
    }

    // ================================================================
    // Input edge cases
    // ================================================================

    #[test]
    fn apply_input_garbage_no_panic() {
        let mut game = seeded();
        game.apply_input(PlayerSlot::One, &[0xFF, 0xFE, 0x00, 0x01, 0xAB, 0xCD]);
        game.update(TEST_EPOCH);
        assert_eq!(game.state.cycle(PlayerSlot::One).direction, Direction::East);
    }

    #[test]
    fn apply_input_reversal_ignored() {
        let mut game = seeded();
        game.apply_input(PlayerSlot::Two, &steer_bytes(Direction::East));
        assert_eq!(game.state.cycle(PlayerSlot::Two).direction, Direction::West);
    }

    #[test]
    fn update_while_paused_is_noop() {
        let mut game = seeded();
        game.pause();
        let events = game.update(TEST_EPOCH);
        assert!(events.is_empty());
        assert_eq!(game.state.tick, 0);
        game.resume();
        game.update(TEST_EPOCH);
        assert_eq!(game.state.tick, 1);
    }
}
