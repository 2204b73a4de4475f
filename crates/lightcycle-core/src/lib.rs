pub mod effect;
pub mod game_clock;
pub mod game_trait;
pub mod player;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::time::Duration;

    use crate::game_clock::GameClock;
    use crate::game_trait::{ArenaGame, GameEvent};
    use crate::player::PlayerSlot;
    use crate::time::{ManualClock, Millis};

    /// Fixed start time for manual clocks in tests.
    pub const TEST_EPOCH: Millis = Millis(1_700_000_000_000);

    /// A manual clock parked at [`TEST_EPOCH`].
    pub fn test_clock() -> ManualClock {
        ManualClock::starting_at(TEST_EPOCH)
    }

    /// Run N simulation ticks at a fixed wall time, returning all events.
    pub fn run_game_ticks(game: &mut dyn ArenaGame, n: usize, now: Millis) -> Vec<GameEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update(now));
        }
        all_events
    }

    /// Drive `frames` host frames of `frame` length through a [`GameClock`],
    /// advancing the wall clock alongside. Returns all events.
    pub fn run_frames(
        game: &mut dyn ArenaGame,
        clock: &mut GameClock<ManualClock>,
        wall: &ManualClock,
        frames: usize,
        frame: Duration,
    ) -> Vec<GameEvent> {
        let mut all_events = Vec::new();
        for _ in 0..frames {
            wall.advance(frame);
            if let Some(events) = clock.advance(game, frame) {
                all_events.extend(events);
            }
        }
        all_events
    }

    /// Assert that the game's serialized state differs from `before`.
    pub fn assert_game_state_changed(game: &dyn ArenaGame, before: &[u8]) {
        let after = game.serialize_state();
        assert_ne!(
            before,
            &after[..],
            "Game state should have changed after operation"
        );
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Every ArenaGame implementation must pass these. Game crates call them
    // from their own #[cfg(test)] modules with a concrete game instance.

    /// A fresh game must produce a non-empty state snapshot.
    pub fn contract_state_is_serializable(game: &dyn ArenaGame) {
        assert!(
            !game.serialize_state().is_empty(),
            "serialize_state() must return non-empty bytes"
        );
    }

    /// apply_input() with valid data followed by update() must change state.
    pub fn contract_apply_input_changes_state(
        game: &mut dyn ArenaGame,
        valid_input: &[u8],
        slot: PlayerSlot,
    ) {
        let before = game.serialize_state();
        game.apply_input(slot, valid_input);
        game.update(TEST_EPOCH);
        assert_game_state_changed(game, &before);
    }

    /// update() must advance the simulation.
    pub fn contract_update_advances_state(game: &mut dyn ArenaGame) {
        let before = game.serialize_state();
        game.update(TEST_EPOCH);
        assert_game_state_changed(game, &before);
    }

    /// Running update() long enough must eventually end a round.
    pub fn contract_round_eventually_completes(game: &mut dyn ArenaGame, max_ticks: usize) {
        for _ in 0..max_ticks {
            let events = game.update(TEST_EPOCH);
            if events
                .iter()
                .any(|e| matches!(e, GameEvent::RoundComplete { .. }))
            {
                return;
            }
        }
        panic!("Game must complete a round within {max_ticks} ticks");
    }

    /// serialize_state → apply_state must be stable.
    pub fn contract_state_roundtrip_preserves(game: &mut dyn ArenaGame) {
        let state_a = game.serialize_state();
        game.apply_state(&state_a);
        let state_b = game.serialize_state();
        assert_eq!(
            state_a, state_b,
            "State must be unchanged after serialize→apply→serialize roundtrip"
        );
    }

    /// Truncated or garbage snapshots must be ignored.
    pub fn contract_malformed_state_ignored(game: &mut dyn ArenaGame) {
        let before = game.serialize_state();
        game.apply_state(&before[..before.len() / 2]);
        game.apply_state(&[0xFF, 0xFE, 0x00, 0x01]);
        assert_eq!(before, game.serialize_state(), "Malformed state must be ignored");
    }

    /// pause() must freeze the clock-driven simulation, resume() unfreezes it.
    pub fn contract_pause_stops_updates(game: &mut dyn ArenaGame) {
        let wall = test_clock();
        let mut clock = GameClock::with_clock(wall.clone());
        game.pause();
        let before = game.serialize_state();
        run_frames(game, &mut clock, &wall, 10, Duration::from_millis(100));
        assert_eq!(before, game.serialize_state(), "State must not change while paused");

        game.resume();
        run_frames(game, &mut clock, &wall, 10, Duration::from_millis(100));
        assert_game_state_changed(game, &before);
    }

    /// scores() must have one entry per slot.
    pub fn contract_scores_cover_both_slots(game: &dyn ArenaGame) {
        let scores = game.scores();
        assert_eq!(scores.len(), 2, "scores() must cover both slots");
        for slot in PlayerSlot::ALL {
            assert!(
                scores.iter().any(|s| s.slot == slot),
                "scores() missing {slot}"
            );
        }
    }
}
