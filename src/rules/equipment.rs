//! Equipment types - goods a unit can carry that grant features
//!
//! Equipment features are stamped with the equipment id as their source, so
//! unequipping removes exactly what was granted. Layered over a unit type in
//! a [`FeatureStack`], equipment abilities override the unit's defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::city::goods::AbstractGoods;
use crate::core::types::Id;
use crate::features::ability;
use crate::features::container::{FeatureContainer, FeatureStack};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentType {
    id: Id,
    index: usize,
    max_count: u32,
    required_goods: Vec<AbstractGoods>,
    required_unit_abilities: BTreeMap<Id, bool>,
    compatible_equipment: Vec<Id>,
    features: FeatureContainer,
}

impl EquipmentType {
    pub fn new(id: impl Into<Id>, index: usize) -> Self {
        Self {
            id: id.into(),
            index,
            max_count: 1,
            required_goods: Vec::new(),
            required_unit_abilities: BTreeMap::new(),
            compatible_equipment: Vec::new(),
            features: FeatureContainer::new(),
        }
    }

    pub fn with_max_count(mut self, max_count: u32) -> Self {
        self.max_count = max_count;
        self
    }

    pub fn with_required_goods(mut self, goods_type: impl Into<Id>, amount: u32) -> Self {
        self.required_goods.push(AbstractGoods::new(goods_type, amount));
        self
    }

    pub fn with_required_unit_ability(mut self, id: impl Into<Id>, value: bool) -> Self {
        self.required_unit_abilities.insert(id.into(), value);
        self
    }

    pub fn with_compatible_equipment(mut self, other: impl Into<Id>) -> Self {
        self.compatible_equipment.push(other.into());
        self
    }

    /// Features are re-sourced to this equipment
    pub fn with_features(mut self, features: FeatureContainer) -> Self {
        let mut stamped = FeatureContainer::new();
        for granted in features.abilities() {
            stamped.add_ability(granted.clone().with_source(self.id.clone()));
        }
        for granted in features.modifiers() {
            stamped.add_modifier(granted.clone().with_source(self.id.clone()));
        }
        self.features = stamped;
        self
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    pub fn required_goods(&self) -> &[AbstractGoods] {
        &self.required_goods
    }

    pub fn required_unit_abilities(&self) -> &BTreeMap<Id, bool> {
        &self.required_unit_abilities
    }

    pub fn compatible_equipment(&self) -> &[Id] {
        &self.compatible_equipment
    }

    pub fn features(&self) -> &FeatureContainer {
        &self.features
    }

    /// Unit must be equippable and satisfy every required ability
    pub fn can_be_equipped(&self, unit: &FeatureStack<'_>) -> bool {
        unit.has_ability(&Id::new(ability::CAN_BE_EQUIPPED))
            && self
                .required_unit_abilities
                .iter()
                .all(|(id, value)| unit.has_ability(id) == *value)
    }

    /// Either side may declare the pairing
    pub fn is_compatible_with(&self, other: &EquipmentType) -> bool {
        self.compatible_equipment.contains(&other.id)
            || other.compatible_equipment.contains(&self.id)
    }

    /// Copy this equipment's features into a unit's own container
    pub fn grant_to(&self, container: &mut FeatureContainer) {
        container.add_container(&self.features);
    }

    /// Remove what [`grant_to`](Self::grant_to) added
    pub fn revoke_from(&self, container: &mut FeatureContainer) -> usize {
        container.remove_features_from_source(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Turn;
    use crate::features::feature::Ability;
    use crate::features::modifier::{Modifier, ModifierOp};
    use crate::features::scope::ScopeTarget;

    fn muskets() -> EquipmentType {
        let mut features = FeatureContainer::new();
        features.add_ability(Ability::new("model.ability.armed", true));
        features.add_modifier(Modifier::new("model.modifier.offence", ModifierOp::Add, 2.0, 40));
        EquipmentType::new("model.equipment.muskets", 0)
            .with_required_goods("model.goods.muskets", 50)
            .with_required_unit_ability("model.ability.native", false)
            .with_compatible_equipment("model.equipment.horses")
            .with_features(features)
    }

    fn colonist() -> FeatureContainer {
        let mut features = FeatureContainer::new();
        features.add_ability(Ability::new(ability::CAN_BE_EQUIPPED, true));
        features.add_ability(Ability::new("model.ability.armed", false));
        features
    }

    #[test]
    fn test_features_sourced_to_equipment() {
        let muskets = muskets();
        let armed = muskets.features().get_ability(&Id::new("model.ability.armed")).unwrap();
        assert_eq!(armed.source(), Some(muskets.id()));
        let offence = muskets.features().get_modifier(&Id::new("model.modifier.offence")).unwrap();
        assert_eq!(offence.source(), Some(muskets.id()));
    }

    #[test]
    fn test_equipment_overrides_default_ability() {
        let unit = colonist();
        let muskets = muskets();
        let armed = Id::new("model.ability.armed");

        let bare = FeatureStack::new().with(&unit);
        assert!(!bare.has_ability(&armed));

        let equipped = FeatureStack::new().with(&unit).with(muskets.features());
        assert!(equipped.has_ability(&armed));
        let offence = equipped.apply_modifier::<dyn ScopeTarget>(
            0.0,
            &Id::new("model.modifier.offence"),
            None,
            Turn(0),
        );
        assert!((offence - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_can_be_equipped_requirements() {
        let unit = colonist();
        let muskets = muskets();
        assert!(muskets.can_be_equipped(&FeatureStack::new().with(&unit)));

        let mut native = colonist();
        native.add_ability(Ability::new("model.ability.native", true));
        assert!(!muskets.can_be_equipped(&FeatureStack::new().with(&native)));

        let cargo = FeatureContainer::new();
        assert!(!muskets.can_be_equipped(&FeatureStack::new().with(&cargo)));
    }

    #[test]
    fn test_grant_and_revoke() {
        let muskets = muskets();
        let mut unit = colonist();
        muskets.grant_to(&mut unit);
        assert!(unit.has_ability(&Id::new("model.ability.armed")));
        assert_eq!(muskets.revoke_from(&mut unit), 2);
        // The granted ability replaced the default one, so nothing is left for that id
        assert!(!unit.has_ability(&Id::new("model.ability.armed")));
        assert!(unit.has_ability(&Id::new(ability::CAN_BE_EQUIPPED)));
    }

    #[test]
    fn test_compatibility_is_symmetric() {
        let muskets = muskets();
        let horses = EquipmentType::new("model.equipment.horses", 1);
        let tools = EquipmentType::new("model.equipment.tools", 2);
        assert!(muskets.is_compatible_with(&horses));
        assert!(horses.is_compatible_with(&muskets));
        assert!(!tools.is_compatible_with(&muskets));
    }
}
