//! Monarch action selection
//!
//! Selection is re-derived every turn from the player's state: nothing but
//! the REF and the support-sea flag persists between calls. Choosing an
//! action never mutates anything; [`Monarch::apply_action`] is the separate
//! step that carries it out.
//!
//! Weights (meddling = 1 + difficulty tier):
//! - NO_ACTION: `max(ceiling - turn, floor)`, always present
//! - RAISE_TAX, ADD_TO_REF, DECLARE_WAR: `base + meddling`
//! - SUPPORT_SEA, SUPPORT_LAND, OFFER_MERCENARIES: `support_weight - meddling`

use serde::{Deserialize, Serialize};

use crate::core::config::MonarchConfig;
use crate::core::rng::{weighted_choice, RandomChoice, RandomSource};
use crate::core::types::{AbstractUnit, PlayerId, Turn};
use crate::monarch::action::MonarchAction;
use crate::monarch::force::{RefAddition, RefForce, RefUnit};
use crate::monarch::player::{MonarchContext, PlayerState, Stance};
use crate::rules::ruleset::RuleSet;

/// Mercenaries the crown offers and what they cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MercenaryOffer {
    pub units: Vec<AbstractUnit>,
    pub price: u32,
}

/// What applying an action did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonarchOutcome {
    Nothing,
    TaxRaised { old: u32, new: u32 },
    TaxWaived { tax: u32 },
    RefReinforced(RefAddition),
    WarDeclared { enemy: PlayerId },
    SupportLand(Vec<AbstractUnit>),
    SupportSea(Vec<AbstractUnit>),
    MercenariesOffered(MercenaryOffer),
}

/// Per-player crown state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monarch {
    player: PlayerId,
    expeditionary_force: RefForce,
    support_sea_granted: bool,
}

impl Monarch {
    pub fn new(player: PlayerId, config: &MonarchConfig) -> Self {
        Self {
            player,
            expeditionary_force: RefForce::new(config.initial_ref),
            support_sea_granted: false,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn expeditionary_force(&self) -> &RefForce {
        &self.expeditionary_force
    }

    pub fn support_sea_granted(&self) -> bool {
        self.support_sea_granted
    }

    /// Past the grace period, colonial, and holding at least one settlement
    fn meddling_allowed(&self, ctx: &MonarchContext<'_>) -> bool {
        let config = ctx.rules.monarch_config();
        ctx.turn.number() >= config.grace_period(ctx.player.difficulty)
            && ctx.player.is_colonial()
            && ctx.player.settlements > 0
    }

    pub fn action_is_valid(&self, action: MonarchAction, ctx: &MonarchContext<'_>) -> bool {
        let config = ctx.rules.monarch_config();
        let player = ctx.player;
        match action {
            MonarchAction::NoAction => true,
            MonarchAction::WaiveTax => player.is_colonial(),
            MonarchAction::AddUnits => !player.is_colonial(),
            _ if !self.meddling_allowed(ctx) => false,
            MonarchAction::RaiseTax => player.tax < ctx.rules.options().maximum_tax,
            MonarchAction::AddToRef => true,
            MonarchAction::DeclareWar => player.war_targets().next().is_some(),
            MonarchAction::SupportSea => {
                !self.support_sea_granted && player.is_at_war() && !config.support_sea.is_empty()
            }
            MonarchAction::SupportLand => player.is_at_war() && !config.support_land.is_empty(),
            MonarchAction::OfferMercenaries => {
                player.is_at_war()
                    && player.gold >= config.minimum_mercenary_price
                    && !config.mercenary_pool.is_empty()
            }
        }
    }

    pub fn no_action_weight(config: &MonarchConfig, turn: Turn) -> u32 {
        config
            .no_action_ceiling
            .saturating_sub(turn.number())
            .max(config.no_action_floor)
    }

    /// The weight table `get_action` draws from
    pub fn weighted_actions(&self, ctx: &MonarchContext<'_>) -> Vec<RandomChoice<MonarchAction>> {
        let config = ctx.rules.monarch_config();
        let mut choices = vec![RandomChoice::new(
            MonarchAction::NoAction,
            Self::no_action_weight(config, ctx.turn),
        )];
        if !self.meddling_allowed(ctx) {
            return choices;
        }

        let meddling = ctx.player.difficulty.meddling();
        let support = config.support_weight.saturating_sub(meddling);
        for action in MonarchAction::SELECTABLE {
            let weight = match action {
                MonarchAction::RaiseTax => config.raise_tax_weight + meddling,
                MonarchAction::AddToRef => config.add_to_ref_weight + meddling,
                MonarchAction::DeclareWar => config.declare_war_weight + meddling,
                MonarchAction::SupportSea
                | MonarchAction::SupportLand
                | MonarchAction::OfferMercenaries => support,
                _ => continue,
            };
            if weight > 0 && self.action_is_valid(action, ctx) {
                choices.push(RandomChoice::new(action, weight));
            }
        }
        choices
    }

    /// Pick this turn's action with a single draw
    ///
    /// Before the grace period ends (or for a non-colonial player) the
    /// answer is NO_ACTION and no random number is consumed.
    pub fn get_action<R: RandomSource + ?Sized>(
        &self,
        ctx: &MonarchContext<'_>,
        rng: &mut R,
    ) -> MonarchAction {
        if !self.meddling_allowed(ctx) {
            return MonarchAction::NoAction;
        }
        let choices = self.weighted_actions(ctx);
        let action = weighted_choice(rng, &choices)
            .copied()
            .unwrap_or(MonarchAction::NoAction);
        tracing::debug!(
            "Monarch of player {} chose {} from {} candidates at turn {}",
            self.player,
            action,
            choices.len(),
            ctx.turn
        );
        action
    }

    /// Tax after a raise: `1 + rand(base + turn / divisor)` more, capped
    pub fn get_new_tax<R: RandomSource + ?Sized>(
        &self,
        ctx: &MonarchContext<'_>,
        rng: &mut R,
    ) -> u32 {
        let config = ctx.rules.monarch_config();
        let divisor = config.grace_period(ctx.player.difficulty).max(1);
        let raise = 1 + rng.next_int(config.tax_raise_base + ctx.turn.number() / divisor);
        (ctx.player.tax + raise).min(ctx.rules.options().maximum_tax)
    }

    /// A random class gets 1..=ref_addition_max units
    pub fn get_ref_addition<R: RandomSource + ?Sized>(
        &self,
        ctx: &MonarchContext<'_>,
        rng: &mut R,
    ) -> RefAddition {
        let config = ctx.rules.monarch_config();
        let unit = RefUnit::ALL[rng.next_int(RefUnit::ALL.len() as u32) as usize];
        let number = 1 + rng.next_int(config.ref_addition_max);
        RefAddition { unit, number }
    }

    pub fn add_to_ref(&mut self, addition: RefAddition) {
        self.expeditionary_force.add(addition);
    }

    pub fn clear_ref(&mut self) {
        self.expeditionary_force.clear();
    }

    /// Total price of some units
    ///
    /// `None` when any type has no price, the total is zero, or (with
    /// `check_gold`) the player cannot afford it.
    pub fn get_price(
        &self,
        units: &[AbstractUnit],
        check_gold: bool,
        ctx: &MonarchContext<'_>,
    ) -> Option<u32> {
        let prices = &ctx.rules.monarch_config().unit_prices;
        let mut price = 0u32;
        for unit in units {
            let Some(&each) = prices.get(&unit.unit_type) else {
                tracing::warn!("No price for unit type {}", unit.unit_type);
                return None;
            };
            price = price.saturating_add(each.saturating_mul(unit.number));
        }
        if price == 0 || (check_gold && price > ctx.player.gold) {
            return None;
        }
        Some(price)
    }

    /// Draw mercenaries from the pool, shrinking the offer until affordable
    pub fn get_mercenaries<R: RandomSource + ?Sized>(
        &self,
        ctx: &MonarchContext<'_>,
        rng: &mut R,
    ) -> Option<MercenaryOffer> {
        let config = ctx.rules.monarch_config();
        let pool = &config.mercenary_pool;
        if pool.is_empty() {
            return None;
        }

        let mut units: Vec<AbstractUnit> = Vec::new();
        for _ in 0..config.mercenary_draws {
            let unit_type = &pool[rng.next_int(pool.len() as u32) as usize];
            let number = 1 + rng.next_int(config.mercenary_max_count);
            match units.iter_mut().find(|u| &u.unit_type == unit_type) {
                Some(existing) => existing.number += number,
                None => units.push(AbstractUnit::new(unit_type.clone(), number)),
            }
        }

        while !units.is_empty() {
            let price = self.get_price(&units, false, ctx)?;
            if price <= ctx.player.gold {
                return Some(MercenaryOffer { units, price });
            }
            if let Some(last) = units.last_mut() {
                last.number -= 1;
                if last.number == 0 {
                    units.pop();
                }
            }
        }
        None
    }

    /// Declare war on a random peaceful European rival
    pub fn declare_war<R: RandomSource + ?Sized>(
        &self,
        player: &mut PlayerState,
        rng: &mut R,
    ) -> Option<PlayerId> {
        let targets: Vec<PlayerId> = player.war_targets().map(|c| c.player).collect();
        if targets.is_empty() {
            return None;
        }
        let enemy = targets[rng.next_int(targets.len() as u32) as usize];
        player.set_stance(enemy, Stance::War);
        tracing::info!("Crown declares war on player {} for player {}", enemy, player.id);
        Some(enemy)
    }

    pub fn support_land(&self, rules: &RuleSet) -> Vec<AbstractUnit> {
        rules.monarch_config().support_land.clone()
    }

    /// Naval support is granted once per game
    pub fn support_sea(&mut self, rules: &RuleSet) -> Vec<AbstractUnit> {
        self.support_sea_granted = true;
        rules.monarch_config().support_sea.clone()
    }

    /// Carry out an action chosen by [`get_action`](Self::get_action)
    pub fn apply_action<R: RandomSource + ?Sized>(
        &mut self,
        action: MonarchAction,
        turn: Turn,
        player: &mut PlayerState,
        rules: &RuleSet,
        rng: &mut R,
    ) -> MonarchOutcome {
        let outcome = match action {
            MonarchAction::NoAction => MonarchOutcome::Nothing,
            MonarchAction::RaiseTax => {
                let new = self.get_new_tax(&MonarchContext::new(turn, player, rules), rng);
                let old = player.tax;
                player.tax = new;
                MonarchOutcome::TaxRaised { old, new }
            }
            MonarchAction::WaiveTax => MonarchOutcome::TaxWaived { tax: player.tax },
            MonarchAction::AddToRef | MonarchAction::AddUnits => {
                let addition =
                    self.get_ref_addition(&MonarchContext::new(turn, player, rules), rng);
                self.add_to_ref(addition);
                MonarchOutcome::RefReinforced(addition)
            }
            MonarchAction::DeclareWar => match self.declare_war(player, rng) {
                Some(enemy) => MonarchOutcome::WarDeclared { enemy },
                None => MonarchOutcome::Nothing,
            },
            MonarchAction::SupportSea => MonarchOutcome::SupportSea(self.support_sea(rules)),
            MonarchAction::SupportLand => MonarchOutcome::SupportLand(self.support_land(rules)),
            MonarchAction::OfferMercenaries => {
                match self.get_mercenaries(&MonarchContext::new(turn, player, rules), rng) {
                    Some(offer) => MonarchOutcome::MercenariesOffered(offer),
                    None => MonarchOutcome::Nothing,
                }
            }
        };
        tracing::info!("Turn {}: {} for player {} -> {:?}", turn, action, player.id, outcome);
        outcome
    }
}
