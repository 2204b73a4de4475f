use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::time::Millis;

/// Trait for game-specific effect kind enums.
///
/// `Ord` fixes the order in which simultaneous expiries are reported.
pub trait EffectKind: Clone + Copy + Ord + std::fmt::Debug + Serialize + DeserializeOwned {
    /// Short name used in logs.
    fn label(&self) -> &'static str;
}

/// A timed effect on a player, expiring at an absolute wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ActiveEffect<K: EffectKind> {
    pub kind: K,
    pub expires_at: Millis,
}

impl<K: EffectKind> ActiveEffect<K> {
    pub fn new(kind: K, now: Millis, duration: Duration) -> Self {
        Self {
            kind,
            expires_at: now + duration,
        }
    }

    pub fn is_expired(&self, now: Millis) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self, now: Millis) -> Duration {
        self.expires_at - now
    }
}

/// Whether activating an effect started it or extended one already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Started,
    Refreshed,
}

/// The active effects of one player, at most one per kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct EffectSet<K: EffectKind> {
    active: BTreeMap<K, ActiveEffect<K>>,
}

impl<K: EffectKind> Default for EffectSet<K> {
    fn default() -> Self {
        Self {
            active: BTreeMap::new(),
        }
    }
}

impl<K: EffectKind> EffectSet<K> {
    /// Start `kind`, or push its expiry out if it is already running.
    pub fn activate(&mut self, kind: K, now: Millis, duration: Duration) -> Activation {
        match self.active.get_mut(&kind) {
            Some(existing) => {
                existing.expires_at = now + duration;
                Activation::Refreshed
            },
            None => {
                self.active
                    .insert(kind, ActiveEffect::new(kind, now, duration));
                Activation::Started
            },
        }
    }

    pub fn get(&self, kind: K) -> Option<&ActiveEffect<K>> {
        self.active.get(&kind)
    }

    pub fn contains(&self, kind: K) -> bool {
        self.active.contains_key(&kind)
    }

    /// Remove every effect that has expired at `now`, returning their kinds
    /// in `Ord` order.
    pub fn take_expired(&mut self, now: Millis) -> Vec<K> {
        let expired: Vec<K> = self
            .active
            .values()
            .filter(|e| e.is_expired(now))
            .map(|e| e.kind)
            .collect();
        for kind in &expired {
            self.active.remove(kind);
        }
        expired
    }

    /// Active effects in kind order, e.g. for a status display.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect<K>> {
        self.active.values()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
