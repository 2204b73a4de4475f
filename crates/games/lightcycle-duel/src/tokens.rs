use rand::Rng;
use serde::{Deserialize, Serialize};

use lightcycle_core::time::Millis;

use super::CycleState;
use crate::arena::Extent;
use crate::config::DuelConfig;
use crate::effects::{self, DuelEffect};

/// A collectible token, one per effect kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: DuelEffect,
    pub x: i32,
    pub y: i32,
}

impl Token {
    /// Whether `(x, y)` falls in this token's `scale`-sized pickup box.
    pub fn covers(&self, x: i32, y: i32, scale: i32) -> bool {
        (self.x..self.x.saturating_add(scale)).contains(&x)
            && (self.y..self.y.saturating_add(scale)).contains(&y)
    }
}

/// The set of tokens on the canvas. Tokens are never destroyed; a collected
/// token immediately reappears elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenField {
    tokens: Vec<Token>,
}

/// Uniformly random grid-aligned cell inside `extent`.
pub fn random_cell(extent: Extent, cell_size: i32, rng: &mut impl Rng) -> (i32, i32) {
    let col = rng.random_range(0..extent.columns(cell_size).max(1));
    let row = rng.random_range(0..extent.rows(cell_size).max(1));
    (col * cell_size, row * cell_size)
}

impl TokenField {
    /// One token of each kind at random cells.
    pub fn scatter(extent: Extent, cell_size: i32, rng: &mut impl Rng) -> Self {
        let tokens = DuelEffect::ALL
            .iter()
            .map(|&kind| {
                let (x, y) = random_cell(extent, cell_size, rng);
                Token { kind, x, y }
            })
            .collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn get(&self, kind: DuelEffect) -> Option<&Token> {
        self.tokens.iter().find(|t| t.kind == kind)
    }

    /// Move the token of `kind` to `(x, y)`.
    pub fn place(&mut self, kind: DuelEffect, x: i32, y: i32) {
        if let Some(token) = self.tokens.iter_mut().find(|t| t.kind == kind) {
            token.x = x;
            token.y = y;
        }
    }

    /// Apply every token under `collector`'s head and respawn each one.
    /// Returns the kinds collected, in token order.
    pub fn collect(
        &mut self,
        collector: &mut CycleState,
        opponent: &mut CycleState,
        config: &DuelConfig,
        now: Millis,
        rng: &mut impl Rng,
    ) -> Vec<DuelEffect> {
        let extent = config.extent();
        let mut collected = Vec::new();
        for token in &mut self.tokens {
            if !token.covers(collector.x, collector.y, config.token_scale) {
                continue;
            }
            effects::grant(
                token.kind,
                collector,
                opponent,
                now,
                config.effect_duration(),
                config.reacquire,
            );
            let (x, y) = random_cell(extent, config.cell_size, rng);
            tracing::debug!(
                slot = %collector.slot,
                kind = ?token.kind,
                from_x = token.x,
                from_y = token.y,
                to_x = x,
                to_y = y,
                "Token collected"
            );
            token.x = x;
            token.y = y;
            collected.push(token.kind);
        }
        collected
    }
}
