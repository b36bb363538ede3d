//! Royal Expeditionary Force composition

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Unit class tracked in the REF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum RefUnit {
    #[display(fmt = "infantry")]
    Infantry,
    #[display(fmt = "dragoons")]
    Dragoons,
    #[display(fmt = "artillery")]
    Artillery,
    #[display(fmt = "men of war")]
    MenOfWar,
}

impl RefUnit {
    pub const ALL: [RefUnit; 4] = [
        RefUnit::Infantry,
        RefUnit::Dragoons,
        RefUnit::Artillery,
        RefUnit::MenOfWar,
    ];

    pub fn index(&self) -> usize {
        match self {
            RefUnit::Infantry => 0,
            RefUnit::Dragoons => 1,
            RefUnit::Artillery => 2,
            RefUnit::MenOfWar => 3,
        }
    }

    pub fn is_naval(&self) -> bool {
        matches!(self, RefUnit::MenOfWar)
    }
}

/// Units of one class being added to the REF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefAddition {
    pub unit: RefUnit,
    pub number: u32,
}

/// Counts per class; only grows until cleared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefForce {
    counts: [u32; 4],
}

impl RefForce {
    pub fn new(counts: [u32; 4]) -> Self {
        Self { counts }
    }

    pub fn count(&self, unit: RefUnit) -> u32 {
        self.counts[unit.index()]
    }

    pub fn counts(&self) -> [u32; 4] {
        self.counts
    }

    pub fn land_units(&self) -> u32 {
        RefUnit::ALL
            .iter()
            .filter(|u| !u.is_naval())
            .map(|&u| self.count(u))
            .sum()
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn add(&mut self, addition: RefAddition) {
        let slot = &mut self.counts[addition.unit.index()];
        *slot = slot.saturating_add(addition.number);
    }

    pub fn clear(&mut self) {
        self.counts = [0; 4];
    }
}
