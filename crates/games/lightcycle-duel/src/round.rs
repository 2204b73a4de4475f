use serde::{Deserialize, Serialize};

use lightcycle_core::game_trait::GameEvent;
use lightcycle_core::player::PlayerSlot;

use super::DuelState;
use crate::collision::Crash;
use crate::config::DuelConfig;

/// Round/match phase. `RoundEnded` and `MatchOver` are passed through inside
/// [`conclude_round`]; between ticks the phase is always `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    Active,
    RoundEnded,
    MatchOver,
}

/// How the last round ended, kept for the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round: u32,
    pub winner: PlayerSlot,
    pub crash: Crash,
}

/// Score `crash`, then run the phase machine until play is active again.
pub fn conclude_round(state: &mut DuelState, crash: Crash, config: &DuelConfig) -> Vec<GameEvent> {
    let winner = crash.winner();
    let cycle = state.cycle_mut(winner);
    cycle.score += 1;
    let score = cycle.score;

    state.phase = RoundPhase::RoundEnded;
    state.last_outcome = Some(RoundOutcome {
        round: state.round_number,
        winner,
        crash,
    });
    tracing::info!(
        round = state.round_number,
        %winner,
        crashed = %crash.crashed,
        kind = ?crash.kind,
        score,
        "Round over"
    );

    let mut events = vec![
        GameEvent::ScoreUpdate {
            slot: winner,
            score,
        },
        GameEvent::RoundComplete { winner },
    ];

    while state.phase != RoundPhase::Active {
        state.phase = match state.phase {
            RoundPhase::RoundEnded if score >= config.score_to_win => {
                state.last_match_winner = Some(winner);
                tracing::info!(
                    match_number = state.match_number,
                    %winner,
                    "{} player wins the game!",
                    state.cycle(winner).color.name()
                );
                events.push(GameEvent::MatchComplete { winner });
                RoundPhase::MatchOver
            },
            RoundPhase::RoundEnded => {
                reset_round(state, config);
                RoundPhase::Active
            },
            RoundPhase::MatchOver => {
                reset_match(state, config);
                events.extend(PlayerSlot::ALL.map(|slot| GameEvent::ScoreUpdate { slot, score: 0 }));
                RoundPhase::Active
            },
            RoundPhase::Active => RoundPhase::Active,
        };
    }
    events
}

/// Put both cycles back on their spawns with empty trails and no effects.
/// Scores and tokens are kept.
pub fn reset_round(state: &mut DuelState, config: &DuelConfig) {
    for slot in PlayerSlot::ALL {
        state
            .cycle_mut(slot)
            .reset_to(&config.spawn_points[slot.index()]);
    }
    state.round_number += 1;
}

/// Zero both scores and start round one of a new match.
pub fn reset_match(state: &mut DuelState, config: &DuelConfig) {
    for slot in PlayerSlot::ALL {
        state.cycle_mut(slot).score = 0;
    }
    reset_round(state, config);
    state.round_number = 1;
    state.match_number += 1;
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::collision::CrashKind;
    use crate::effects::DuelEffect;
    use crate::motion::SpeedMultiplier;
    use lightcycle_core::time::Millis;

    fn state(config: &DuelConfig) -> DuelState {
        DuelState::new(config, &mut StdRng::seed_from_u64(3))
    }

    fn crash_into(crashed: PlayerSlot) -> Crash {
        Crash {
            crashed,
            kind: CrashKind::OpponentTrail,
        }
    }

    #[test]
    fn round_end_scores_winner_and_resets_cycles() {
        let config = DuelConfig::default();
        let mut state = state(&config);
        {
            let p1 = state.cycle_mut(PlayerSlot::One);
            p1.x = 400;
            p1.size = 3;
            p1.speed.double();
            p1.effects
                .activate(DuelEffect::Fast, Millis(0), config.effect_duration());
            for _ in 0..4 {
                crate::motion::move_cycle(p1, config.extent(), config.cell_size);
            }
        }

        let events = conclude_round(&mut state, crash_into(PlayerSlot::One), &config);

        assert_eq!(
            events,
            vec![
                GameEvent::ScoreUpdate {
                    slot: PlayerSlot::Two,
                    score: 1,
                },
                GameEvent::RoundComplete {
                    winner: PlayerSlot::Two,
                },
            ]
        );
        assert_eq!(state.phase, RoundPhase::Active);
        assert_eq!(state.round_number, 2);
        assert_eq!(state.cycle(PlayerSlot::Two).score, 1);
        assert_eq!(state.cycle(PlayerSlot::One).score, 0);

        let p1 = state.cycle(PlayerSlot::One);
        assert_eq!((p1.x, p1.y), (100, 100));
        assert!(p1.trail.is_empty());
        assert!(p1.effects.is_empty());
        assert_eq!(p1.size, 1);
        assert_eq!(p1.speed, SpeedMultiplier::ONE);
    }

    #[test]
    fn outcome_recorded() {
        let config = DuelConfig::default();
        let mut state = state(&config);
        let crash = Crash {
            crashed: PlayerSlot::Two,
            kind: CrashKind::OwnTrail,
        };
        conclude_round(&mut state, crash, &config);
        assert_eq!(
            state.last_outcome,
            Some(RoundOutcome {
                round: 1,
                winner: PlayerSlot::One,
                crash,
            })
        );
        assert_eq!(state.last_match_winner, None);
    }

    #[test]
    fn fifth_win_ends_match_and_zeroes_scores() {
        let config = DuelConfig::default();
        let mut state = state(&config);
        state.cycle_mut(PlayerSlot::One).score = 2;
        for _ in 0..4 {
            let events = conclude_round(&mut state, crash_into(PlayerSlot::One), &config);
            assert!(
                !events
                    .iter()
                    .any(|e| matches!(e, GameEvent::MatchComplete { .. }))
            );
        }
        assert_eq!(state.cycle(PlayerSlot::Two).score, 4);

        let events = conclude_round(&mut state, crash_into(PlayerSlot::One), &config);
        assert!(events.contains(&GameEvent::MatchComplete {
            winner: PlayerSlot::Two,
        }));
        assert_eq!(state.last_match_winner, Some(PlayerSlot::Two));
        assert_eq!(state.cycle(PlayerSlot::One).score, 0);
        assert_eq!(state.cycle(PlayerSlot::Two).score, 0);
        assert_eq!(state.round_number, 1);
        assert_eq!(state.match_number, 2);
        assert_eq!(state.phase, RoundPhase::Active);
    }

    #[test]
    fn lower_threshold_ends_match_sooner() {
        let config = DuelConfig {
            score_to_win: 1,
            ..DuelConfig::default()
        };
        let mut state = state(&config);
        let events = conclude_round(&mut state, crash_into(PlayerSlot::Two), &config);
        assert!(events.contains(&GameEvent::MatchComplete {
            winner: PlayerSlot::One,
        }));
    }
}
