use std::time::Duration;

use serde::{Deserialize, Serialize};

use lightcycle_core::effect::{self, Activation};
use lightcycle_core::time::Millis;

use super::CycleState;
use crate::config::ReacquirePolicy;
use crate::motion::{MAX_SPEED_EXPONENT, MIN_SPEED_EXPONENT};

/// Size multiplier while the big effect is active.
pub const BIG_SIZE: u8 = 3;
/// Size multiplier otherwise.
pub const NORMAL_SIZE: u8 = 1;

/// Duel effect kinds. Declaration order is the expiry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DuelEffect {
    /// Doubles the collector's speed.
    Fast,
    /// Triples the collector's size.
    Big,
    /// Halves the opponent's speed.
    Slow,
}

impl effect::EffectKind for DuelEffect {
    fn label(&self) -> &'static str {
        match self {
            DuelEffect::Fast => "fast",
            DuelEffect::Big => "big",
            DuelEffect::Slow => "slow",
        }
    }
}

/// Who an effect lands on when its token is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectTarget {
    Collector,
    Opponent,
}

impl DuelEffect {
    pub const ALL: [DuelEffect; 3] = [DuelEffect::Fast, DuelEffect::Big, DuelEffect::Slow];

    pub fn target(self) -> EffectTarget {
        match self {
            DuelEffect::Fast | DuelEffect::Big => EffectTarget::Collector,
            DuelEffect::Slow => EffectTarget::Opponent,
        }
    }

    pub fn apply(self, cycle: &mut CycleState) {
        match self {
            DuelEffect::Fast => cycle.speed.double(),
            DuelEffect::Big => cycle.size = BIG_SIZE,
            DuelEffect::Slow => cycle.speed.halve(),
        }
    }

    /// Whether a repeat pickup may apply this effect again under
    /// [`ReacquirePolicy::Compound`]. Speed stacking stops at the supported
    /// range so every application keeps a matching revert.
    pub fn can_stack(self, cycle: &CycleState) -> bool {
        match self {
            DuelEffect::Fast => cycle.speed.exponent() < MAX_SPEED_EXPONENT,
            DuelEffect::Big => true,
            DuelEffect::Slow => cycle.speed.exponent() > MIN_SPEED_EXPONENT,
        }
    }

    pub fn revert(self, cycle: &mut CycleState) {
        match self {
            DuelEffect::Fast => cycle.speed.halve(),
            DuelEffect::Big => cycle.size = NORMAL_SIZE,
            DuelEffect::Slow => cycle.speed.double(),
        }
    }
}

/// Grant `kind` from a token pickup. The mutation runs on a fresh start, or
/// on repeat pickups under [`ReacquirePolicy::Compound`] while
/// [`DuelEffect::can_stack`] allows it.
pub fn grant(
    kind: DuelEffect,
    collector: &mut CycleState,
    opponent: &mut CycleState,
    now: Millis,
    duration: Duration,
    policy: ReacquirePolicy,
) -> Activation {
    let target = match kind.target() {
        EffectTarget::Collector => collector,
        EffectTarget::Opponent => opponent,
    };
    let activation = target.effects.activate(kind, now, duration);
    let restack = policy == ReacquirePolicy::Compound && kind.can_stack(target);
    if activation == Activation::Started || restack {
        kind.apply(target);
    }
    tracing::debug!(
        target_slot = %target.slot,
        effect = effect::EffectKind::label(&kind),
        ?activation,
        expires_at = (now + duration).as_u64(),
        "Effect granted"
    );
    activation
}

/// Revert and drop every effect on `cycle` that has expired at `now`.
pub fn expire_effects(cycle: &mut CycleState, now: Millis) -> Vec<DuelEffect> {
    let expired = cycle.effects.take_expired(now);
    for &kind in &expired {
        kind.revert(cycle);
        tracing::debug!(
            slot = %cycle.slot,
            effect = effect::EffectKind::label(&kind),
            "Effect expired"
        );
    }
    expired
}
