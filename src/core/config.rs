//! Game options and monarch tuning with documented constants
//!
//! All magic numbers used by the rule consumers are collected here with
//! explanations of their purpose and how they interact with each other.
//! Both structs deserialize from the rules TOML; missing keys keep defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::{Result, RulesError};
use crate::core::types::{AbstractUnit, Id};

/// Highest difficulty tier (tiers run 0..=MAX_DIFFICULTY)
pub const MAX_DIFFICULTY: u8 = 4;

/// Difficulty tier of a player, 0 (easiest) to 4 (hardest)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub fn new(tier: u8) -> Result<Self> {
        if tier > MAX_DIFFICULTY {
            return Err(RulesError::InvalidDifficulty(tier));
        }
        Ok(Self(tier))
    }

    pub fn tier(&self) -> u8 {
        self.0
    }

    /// Meddling factor used by the monarch weights: 1 (easiest) to 5 (hardest)
    pub fn meddling(&self) -> u32 {
        1 + self.0 as u32
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = RulesError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value.0
    }
}

/// Game-wide options read by the rule consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    /// Whether production beyond a build requirement is kept for the next item
    ///
    /// When false, non-storable goods (hammers, bells) are consumed in full
    /// because they cannot be banked.
    pub save_production_overflow: bool,

    /// Highest tax rate (percent) the monarch may impose
    pub maximum_tax: u32,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            save_production_overflow: false,
            maximum_tax: 70,
        }
    }
}

impl GameOptions {
    pub fn validate(&self) -> Result<()> {
        if self.maximum_tax > 100 {
            return Err(RulesError::InvalidConfig(format!(
                "maximum_tax ({}) must be <= 100",
                self.maximum_tax
            )));
        }
        Ok(())
    }
}

/// Tuning for the monarch action selector
///
/// Weights are relative; only their ratio to the NO_ACTION weight matters.
/// `meddling` below is `1 + difficulty tier` (1..=5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonarchConfig {
    // === GATING ===
    /// Grace period is `(grace_base - meddling) * grace_step` turns
    ///
    /// With the defaults (6, 10) the grace runs from 50 turns on the easiest
    /// tier down to 10 on the hardest.
    pub grace_base: u32,
    pub grace_step: u32,

    // === WEIGHTS ===
    /// NO_ACTION starts at this weight on turn 0 and loses one per turn
    pub no_action_ceiling: u32,

    /// NO_ACTION never drops below this weight
    ///
    /// Must be positive so that doing nothing always remains possible.
    pub no_action_floor: u32,

    /// RAISE_TAX weight is `raise_tax_weight + meddling`
    pub raise_tax_weight: u32,

    /// ADD_TO_REF weight is `add_to_ref_weight + meddling`
    pub add_to_ref_weight: u32,

    /// DECLARE_WAR weight is `declare_war_weight + meddling`
    pub declare_war_weight: u32,

    /// SUPPORT_SEA, SUPPORT_LAND and OFFER_MERCENARIES weigh
    /// `support_weight - meddling` (saturating at zero)
    pub support_weight: u32,

    // === TAX ===
    /// A raise is `1 + rand(tax_raise_base + turn / divisor)` where
    /// `divisor = (grace_base - meddling) * grace_step`
    pub tax_raise_base: u32,

    // === MERCENARIES ===
    /// Number of random draws from the mercenary pool per offer
    pub mercenary_draws: u32,

    /// Each draw offers 1..=mercenary_max_count units
    pub mercenary_max_count: u32,

    /// Gold the player needs before mercenaries are offered
    pub minimum_mercenary_price: u32,

    /// Unit types the monarch may offer as mercenaries
    pub mercenary_pool: Vec<Id>,

    /// Purchase price per unit type
    pub unit_prices: BTreeMap<Id, u32>,

    // === ROYAL EXPEDITIONARY FORCE ===
    /// Initial REF as (infantry, dragoons, artillery, men of war)
    pub initial_ref: [u32; 4],

    /// A single REF addition adds 1..=ref_addition_max units of one class
    pub ref_addition_max: u32,

    // === SUPPORT ===
    /// Units granted by SUPPORT_LAND
    pub support_land: Vec<AbstractUnit>,

    /// Units granted by SUPPORT_SEA (once per game)
    pub support_sea: Vec<AbstractUnit>,
}

impl Default for MonarchConfig {
    fn default() -> Self {
        let mut unit_prices = BTreeMap::new();
        unit_prices.insert(Id::new("model.unit.veteranSoldier"), 2000);
        unit_prices.insert(Id::new("model.unit.artillery"), 500);
        unit_prices.insert(Id::new("model.unit.frigate"), 5000);

        Self {
            grace_base: 6,
            grace_step: 10,

            no_action_ceiling: 200,
            no_action_floor: 100,
            raise_tax_weight: 10,
            add_to_ref_weight: 10,
            declare_war_weight: 5,
            support_weight: 6,

            tax_raise_base: 5,

            mercenary_draws: 3,
            mercenary_max_count: 3,
            minimum_mercenary_price: 200,
            mercenary_pool: vec![
                Id::new("model.unit.veteranSoldier"),
                Id::new("model.unit.artillery"),
            ],
            unit_prices,

            initial_ref: [31, 15, 14, 2],
            ref_addition_max: 3,

            support_land: vec![
                AbstractUnit::new("model.unit.veteranSoldier", 2),
                AbstractUnit::new("model.unit.artillery", 1),
            ],
            support_sea: vec![AbstractUnit::new("model.unit.frigate", 1)],
        }
    }
}

impl MonarchConfig {
    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.no_action_floor == 0 {
            return Err(RulesError::InvalidConfig(
                "no_action_floor must be positive".into(),
            ));
        }

        if self.no_action_floor > self.no_action_ceiling {
            return Err(RulesError::InvalidConfig(format!(
                "no_action_floor ({}) should be <= no_action_ceiling ({})",
                self.no_action_floor, self.no_action_ceiling
            )));
        }

        // The tax divisor must stay positive on the hardest tier
        if self.grace_step == 0 || self.grace_base <= 1 + MAX_DIFFICULTY as u32 {
            return Err(RulesError::InvalidConfig(format!(
                "grace_base ({}) must exceed {} and grace_step must be positive",
                self.grace_base,
                1 + MAX_DIFFICULTY as u32
            )));
        }

        if self.ref_addition_max == 0 || self.mercenary_max_count == 0 {
            return Err(RulesError::InvalidConfig(
                "ref_addition_max and mercenary_max_count must be positive".into(),
            ));
        }

        for unit_type in &self.mercenary_pool {
            if !self.unit_prices.contains_key(unit_type) {
                return Err(RulesError::InvalidConfig(format!(
                    "mercenary unit {} has no price",
                    unit_type
                )));
            }
        }

        Ok(())
    }

    /// Grace period in turns for a difficulty tier
    pub fn grace_period(&self, difficulty: Difficulty) -> u32 {
        self.grace_base.saturating_sub(difficulty.meddling()) * self.grace_step
    }
}
