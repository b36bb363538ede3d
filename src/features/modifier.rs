//! Modifiers - numeric transforms with a stacking priority
//!
//! Stacked modifiers are applied in a total order so results do not depend
//! on container iteration order:
//! 1. ascending priority
//! 2. within a priority: ADD, MULTIPLY, PERCENTAGE, SET
//! 3. ties keep registration order

use derive_more::Deref;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::error::RulesError;
use crate::core::types::{Id, Turn};
use crate::features::feature::FeatureInfo;
use crate::features::scope::Scope;

/// Conventional priorities for modifier sources
pub mod priority {
    pub const TERRAIN: i32 = 10;
    pub const BUILDING: i32 = 20;
    pub const UNIT: i32 = 30;
    pub const EQUIPMENT: i32 = 40;
    pub const FOUNDING_FATHER: i32 = 50;
    pub const DISASTER: i32 = 60;
}

/// How a modifier combines with the running value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierOp {
    Add,
    Multiply,
    Percentage,
    Set,
}

impl ModifierOp {
    /// Position within a priority tier
    pub fn rank(&self) -> u8 {
        match self {
            ModifierOp::Add => 0,
            ModifierOp::Multiply => 1,
            ModifierOp::Percentage => 2,
            ModifierOp::Set => 3,
        }
    }
}

impl FromStr for ModifierOp {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" | "additive" => Ok(ModifierOp::Add),
            "multiply" | "multiplicative" => Ok(ModifierOp::Multiply),
            "percentage" => Ok(ModifierOp::Percentage),
            "set" => Ok(ModifierOp::Set),
            _ => Err(RulesError::UnknownModifierOp(s.to_string())),
        }
    }
}

/// Per-turn growth of a modifier's value, counted from its first turn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Increment {
    /// value + amount * turns
    Add(f32),
    /// value + value * amount * turns / 100
    Percentage(f32),
}

/// Numeric adjustment attached to a game object
#[derive(Debug, Clone, PartialEq, Deref, Serialize, Deserialize)]
pub struct Modifier {
    #[deref]
    info: FeatureInfo,
    op: ModifierOp,
    value: f32,
    priority: i32,
    increment: Option<Increment>,
}

impl Modifier {
    pub fn new(id: impl Into<Id>, op: ModifierOp, value: f32, priority: i32) -> Self {
        Self::from_info(FeatureInfo::new(id), op, value, priority)
    }

    pub fn from_info(info: FeatureInfo, op: ModifierOp, value: f32, priority: i32) -> Self {
        Self {
            info,
            op,
            value,
            priority,
            increment: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<Id>) -> Self {
        self.info = self.info.with_source(source);
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.info = self.info.with_scope(scope);
        self
    }

    pub fn with_increment(mut self, increment: Increment) -> Self {
        self.increment = Some(increment);
        self
    }

    pub fn info(&self) -> &FeatureInfo {
        &self.info
    }

    pub fn op(&self) -> ModifierOp {
        self.op
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn increment(&self) -> Option<Increment> {
        self.increment
    }

    /// Value at `turn`, including any increment accrued since the first turn
    pub fn value_at(&self, turn: Turn) -> f32 {
        let (Some(increment), Some(first)) = (self.increment, self.first_turn()) else {
            return self.value;
        };
        let turns = turn.since(first) as f32;
        match increment {
            Increment::Add(amount) => self.value + amount * turns,
            Increment::Percentage(amount) => self.value + self.value * amount * turns / 100.0,
        }
    }

    /// Apply this modifier alone to `base`
    pub fn apply(&self, base: f32, turn: Turn) -> f32 {
        let value = self.value_at(turn);
        match self.op {
            ModifierOp::Add => base + value,
            ModifierOp::Multiply => base * value,
            ModifierOp::Percentage => base + base * value / 100.0,
            ModifierOp::Set => value,
        }
    }

    fn order_key(&self) -> (i32, u8) {
        (self.priority, self.op.rank())
    }
}

/// Apply modifiers to `base` in the total stacking order
///
/// The iterator order is taken as registration order. Modifiers outside
/// their turn window are skipped; scope filtering is the caller's job.
pub fn apply_modifiers<'a, I>(base: f32, turn: Turn, modifiers: I) -> f32
where
    I: IntoIterator<Item = &'a Modifier>,
{
    let mut ordered: Vec<&Modifier> = modifiers
        .into_iter()
        .filter(|m| m.is_active(turn))
        .collect();
    // Stable sort keeps registration order within equal keys
    ordered.sort_by_key(|m| m.order_key());
    ordered.iter().fold(base, |value, m| m.apply(value, turn))
}
