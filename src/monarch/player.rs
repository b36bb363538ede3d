//! The slice of player state the monarch reads

use serde::{Deserialize, Serialize};

use crate::core::config::Difficulty;
use crate::core::types::{Id, PlayerId, Turn};
use crate::features::ability;
use crate::features::container::FeatureContainer;
use crate::rules::ruleset::RuleSet;

/// Constitutional status of a player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerStatus {
    #[default]
    Colonial,
    Rebel,
    Independent,
}

/// Diplomatic stance towards another player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stance {
    #[default]
    Peace,
    CeaseFire,
    War,
    Alliance,
}

/// Another player this one has met
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub player: PlayerId,
    pub european: bool,
    /// Royal expeditionary forces are never war targets for the crown
    pub royal: bool,
    pub stance: Stance,
}

impl Contact {
    pub fn european(player: PlayerId, stance: Stance) -> Self {
        Self {
            player,
            european: true,
            royal: false,
            stance,
        }
    }

    pub fn native(player: PlayerId, stance: Stance) -> Self {
        Self {
            player,
            european: false,
            royal: false,
            stance,
        }
    }

    /// A European rival at peace or cease-fire
    pub fn is_war_target(&self) -> bool {
        self.european && !self.royal && matches!(self.stance, Stance::Peace | Stance::CeaseFire)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub status: PlayerStatus,
    /// Tax rate in percent
    pub tax: u32,
    pub gold: u32,
    pub difficulty: Difficulty,
    pub settlements: u32,
    pub contacts: Vec<Contact>,
    pub features: FeatureContainer,
}

impl PlayerState {
    pub fn new(id: PlayerId, difficulty: Difficulty) -> Self {
        Self {
            id,
            status: PlayerStatus::Colonial,
            tax: 0,
            gold: 0,
            difficulty,
            settlements: 0,
            contacts: Vec::new(),
            features: FeatureContainer::new(),
        }
    }

    /// Colonial status, unless independence has been declared
    pub fn is_colonial(&self) -> bool {
        self.status == PlayerStatus::Colonial
            && !self
                .features
                .has_ability(&Id::new(ability::INDEPENDENCE_DECLARED))
    }

    pub fn is_at_war(&self) -> bool {
        self.contacts.iter().any(|c| c.stance == Stance::War)
    }

    pub fn war_targets(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter().filter(|c| c.is_war_target())
    }

    pub fn contact(&self, player: PlayerId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.player == player)
    }

    /// Returns false if the players have not met
    pub fn set_stance(&mut self, player: PlayerId, stance: Stance) -> bool {
        match self.contacts.iter_mut().find(|c| c.player == player) {
            Some(contact) => {
                contact.stance = stance;
                true
            }
            None => false,
        }
    }
}

/// Read-only input to monarch selection
#[derive(Debug, Clone, Copy)]
pub struct MonarchContext<'a> {
    pub turn: Turn,
    pub player: &'a PlayerState,
    pub rules: &'a RuleSet,
}

impl<'a> MonarchContext<'a> {
    pub fn new(turn: Turn, player: &'a PlayerState, rules: &'a RuleSet) -> Self {
        Self { turn, player, rules }
    }
}
