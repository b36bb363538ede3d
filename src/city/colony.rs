//! Colony - the settlement that owns a build queue
//!
//! Only the parts of a colony the build rules look at are modelled here:
//! its population, completed buildings, own features and the queue.

use serde::{Deserialize, Serialize};

use crate::city::build_queue::BuildQueue;
use crate::city::buildable::BuildableType;
use crate::core::types::{Id, PlayerId, Turn};
use crate::features::ability;
use crate::features::container::{FeatureContainer, FeatureStack};
use crate::rules::ruleset::RuleSet;

/// Why a colony cannot build something
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoBuildReason {
    /// Buildable
    None,
    /// Has no goods requirements, so it is never built in a colony
    NotBuildable,
    PopulationTooSmall,
    /// A required ability is missing or has the wrong value
    MissingAbility,
    /// The colony lacks the build ability for this unit type
    MissingBuildAbility,
    /// The level this building upgrades from is not built
    WrongUpgrade,
    AlreadyBuilt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Colony {
    name: String,
    owner: PlayerId,
    population: u32,
    features: FeatureContainer,
    buildings: Vec<Id>,
    build_queue: BuildQueue,
}

impl Colony {
    pub fn new(name: impl Into<String>, owner: PlayerId, population: u32) -> Self {
        Self {
            name: name.into(),
            owner,
            population,
            features: FeatureContainer::new(),
            buildings: Vec::new(),
            build_queue: BuildQueue::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    pub fn population(&self) -> u32 {
        self.population
    }

    pub fn set_population(&mut self, population: u32) {
        self.population = population;
    }

    pub fn features(&self) -> &FeatureContainer {
        &self.features
    }

    pub fn features_mut(&mut self) -> &mut FeatureContainer {
        &mut self.features
    }

    pub fn buildings(&self) -> &[Id] {
        &self.buildings
    }

    pub fn has_building(&self, id: &Id) -> bool {
        self.buildings.contains(id)
    }

    /// Record a finished building, replacing the level it upgrades
    pub fn add_building(&mut self, building: &BuildableType) {
        if let Some(previous) = building.upgrades_from() {
            self.buildings.retain(|b| b != previous);
        }
        if !self.has_building(building.id()) {
            self.buildings.push(building.id().clone());
        }
    }

    pub fn build_queue(&self) -> &BuildQueue {
        &self.build_queue
    }

    pub fn build_queue_mut(&mut self) -> &mut BuildQueue {
        &mut self.build_queue
    }

    /// Check a buildable against this colony's state
    ///
    /// Abilities resolve over the owner's features with the colony's own
    /// features layered on top, at `turn`.
    pub fn no_build_reason(
        &self,
        buildable: &BuildableType,
        owner_features: &FeatureContainer,
        turn: Turn,
    ) -> NoBuildReason {
        if !buildable.needs_goods_to_build() {
            return NoBuildReason::NotBuildable;
        }
        if buildable.required_population() > self.population {
            return NoBuildReason::PopulationTooSmall;
        }

        let stack = FeatureStack::new().with(owner_features).with(&self.features);
        let missing = buildable.required_abilities().iter().any(|(id, &value)| {
            stack.has_ability_for(id, Some(buildable), Some(turn)) != value
        });
        if missing {
            return NoBuildReason::MissingAbility;
        }

        if buildable.is_building() {
            if self.has_building(buildable.id()) {
                return NoBuildReason::AlreadyBuilt;
            }
            if let Some(previous) = buildable.upgrades_from() {
                if !self.has_building(previous) {
                    return NoBuildReason::WrongUpgrade;
                }
            }
        } else if !stack.has_ability_for(&Id::new(ability::BUILD), Some(buildable), Some(turn)) {
            return NoBuildReason::MissingBuildAbility;
        }

        NoBuildReason::None
    }

    pub fn can_build(
        &self,
        buildable: &BuildableType,
        owner_features: &FeatureContainer,
        turn: Turn,
    ) -> bool {
        self.no_build_reason(buildable, owner_features, turn) == NoBuildReason::None
    }

    /// Every registered type this colony could start now
    pub fn buildable_types<'r>(
        &self,
        rules: &'r RuleSet,
        owner_features: &FeatureContainer,
        turn: Turn,
    ) -> Vec<&'r BuildableType> {
        rules
            .buildables()
            .iter()
            .filter(|b| self.can_build(b, owner_features, turn))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::buildable::BuildableKind;
    use crate::core::config::{GameOptions, MonarchConfig};
    use crate::features::feature::{Ability, FeatureInfo};
    use crate::features::scope::Scope;

    fn stockade() -> BuildableType {
        BuildableType::building("model.building.stockade", 0)
            .with_required_goods("model.goods.hammers", 64)
            .with_required_population(3)
    }

    fn fort() -> BuildableType {
        BuildableType::new(
            "model.building.fort",
            1,
            BuildableKind::Building {
                upgrades_from: Some(Id::new("model.building.stockade")),
            },
        )
        .with_required_goods("model.goods.hammers", 120)
        .with_required_goods("model.goods.tools", 100)
        .with_required_population(4)
    }

    fn artillery() -> BuildableType {
        BuildableType::unit("model.unit.artillery", 2)
            .with_required_goods("model.goods.hammers", 192)
            .with_required_goods("model.goods.tools", 40)
    }

    fn owner() -> FeatureContainer {
        FeatureContainer::new()
    }

    #[test]
    fn test_population_gate() {
        let colony = Colony::new("Jamestown", PlayerId(1), 2);
        assert_eq!(
            colony.no_build_reason(&stockade(), &owner(), Turn(1)),
            NoBuildReason::PopulationTooSmall
        );
        let bigger = Colony::new("Jamestown", PlayerId(1), 3);
        assert!(bigger.can_build(&stockade(), &owner(), Turn(1)));
    }

    #[test]
    fn test_types_without_goods_not_buildable() {
        let colony = Colony::new("Jamestown", PlayerId(1), 5);
        let townhall = BuildableType::building("model.building.townHall", 3);
        assert_eq!(
            colony.no_build_reason(&townhall, &owner(), Turn(1)),
            NoBuildReason::NotBuildable
        );
    }

    #[test]
    fn test_upgrade_chain() {
        let mut colony = Colony::new("Jamestown", PlayerId(1), 6);
        assert_eq!(colony.no_build_reason(&fort(), &owner(), Turn(1)), NoBuildReason::WrongUpgrade);

        colony.add_building(&stockade());
        assert_eq!(
            colony.no_build_reason(&stockade(), &owner(), Turn(1)),
            NoBuildReason::AlreadyBuilt
        );
        assert!(colony.can_build(&fort(), &owner(), Turn(1)));

        colony.add_building(&fort());
        assert_eq!(colony.buildings(), &[Id::new("model.building.fort")]);
    }

    #[test]
    fn test_required_abilities_all_hold() {
        let colony = Colony::new("Jamestown", PlayerId(1), 8);
        let press = BuildableType::building("model.building.printingPress", 4)
            .with_required_goods("model.goods.hammers", 52)
            .with_required_ability("model.ability.printing", true)
            .with_required_ability("model.ability.banned", false);

        let mut features = owner();
        assert_eq!(
            colony.no_build_reason(&press, &features, Turn(1)),
            NoBuildReason::MissingAbility
        );
        features.add_ability(Ability::new("model.ability.printing", true));
        assert!(colony.can_build(&press, &features, Turn(1)));
        features.add_ability(Ability::new("model.ability.banned", true));
        assert_eq!(
            colony.no_build_reason(&press, &features, Turn(1)),
            NoBuildReason::MissingAbility
        );
    }

    #[test]
    fn test_units_need_scoped_build_ability() {
        let mut colony = Colony::new("Jamestown", PlayerId(1), 8);
        assert_eq!(
            colony.no_build_reason(&artillery(), &owner(), Turn(1)),
            NoBuildReason::MissingBuildAbility
        );

        let info = FeatureInfo::new(ability::BUILD)
            .with_source("model.building.armory")
            .with_scope(Scope::any().with_type("model.unit.artillery"));
        colony.features_mut().add_ability(Ability::from_info(info, true));
        assert!(colony.can_build(&artillery(), &owner(), Turn(1)));

        let wagon = BuildableType::unit("model.unit.wagonTrain", 5)
            .with_required_goods("model.goods.hammers", 40);
        assert_eq!(
            colony.no_build_reason(&wagon, &owner(), Turn(1)),
            NoBuildReason::MissingBuildAbility
        );
    }

    #[test]
    fn test_colony_features_override_owner() {
        let colony_press = BuildableType::building("model.building.newspaper", 6)
            .with_required_goods("model.goods.hammers", 120)
            .with_required_ability("model.ability.printing", true);
        let mut owner_features = owner();
        owner_features.add_ability(Ability::new("model.ability.printing", true));

        let mut colony = Colony::new("Roanoke", PlayerId(2), 4);
        colony
            .features_mut()
            .add_ability(Ability::new("model.ability.printing", false));
        assert_eq!(
            colony.no_build_reason(&colony_press, &owner_features, Turn(1)),
            NoBuildReason::MissingAbility
        );
    }

    #[test]
    fn test_buildable_types_filters_registry() {
        let mut rules = RuleSet::new(GameOptions::default(), MonarchConfig::default()).unwrap();
        rules.add_buildable(stockade()).unwrap();
        rules.add_buildable(fort()).unwrap();
        rules.add_buildable(artillery()).unwrap();

        let colony = Colony::new("Jamestown", PlayerId(1), 3);
        let ids: Vec<&str> = colony
            .buildable_types(&rules, &owner(), Turn(1))
            .iter()
            .map(|b| b.id().as_str())
            .collect();
        assert_eq!(ids, vec!["model.building.stockade"]);
    }
}
