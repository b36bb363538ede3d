//! RuleSet - registry of every loaded type definition
//!
//! The registry assigns each type its index in declaration order. Types are
//! looked up by id; all cross references are checked once by
//! [`RuleSet::validate_references`] so queries never re-validate.

use ahash::AHashMap;

use crate::city::buildable::BuildableType;
use crate::city::goods::GoodsType;
use crate::core::config::{GameOptions, MonarchConfig};
use crate::core::error::{Result, RulesError};
use crate::core::types::Id;
use crate::features::effect::Disaster;
use crate::rules::equipment::EquipmentType;

/// Ordered list of types with an id index
#[derive(Debug, Clone)]
struct Registry<T> {
    items: Vec<T>,
    by_id: AHashMap<Id, usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            by_id: AHashMap::new(),
        }
    }
}

impl<T> Registry<T> {
    fn insert(&mut self, id: &Id, item: T) -> Result<usize> {
        if self.by_id.contains_key(id) {
            return Err(RulesError::DuplicateId(id.clone()));
        }
        let index = self.items.len();
        self.by_id.insert(id.clone(), index);
        self.items.push(item);
        Ok(index)
    }

    fn get(&self, id: &Id) -> Option<&T> {
        self.by_id.get(id).map(|&i| &self.items[i])
    }

    fn check_index(&self, id: &Id, index: usize) -> Result<()> {
        if index != self.items.len() {
            return Err(RulesError::InvalidConfig(format!(
                "{} declared with index {} but the next index is {}",
                id,
                index,
                self.items.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    options: GameOptions,
    monarch: MonarchConfig,
    goods: Registry<GoodsType>,
    buildables: Registry<BuildableType>,
    equipment: Registry<EquipmentType>,
    disasters: Registry<Disaster>,
}

impl RuleSet {
    pub fn new(options: GameOptions, monarch: MonarchConfig) -> Result<Self> {
        options.validate()?;
        monarch.validate()?;
        Ok(Self {
            options,
            monarch,
            ..Self::default()
        })
    }

    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    pub fn monarch_config(&self) -> &MonarchConfig {
        &self.monarch
    }

    pub fn next_goods_index(&self) -> usize {
        self.goods.items.len()
    }

    pub fn next_buildable_index(&self) -> usize {
        self.buildables.items.len()
    }

    pub fn next_equipment_index(&self) -> usize {
        self.equipment.items.len()
    }

    pub fn add_goods_type(&mut self, goods: GoodsType) -> Result<usize> {
        self.goods.check_index(goods.id(), goods.index())?;
        let id = goods.id().clone();
        self.goods.insert(&id, goods)
    }

    pub fn add_buildable(&mut self, buildable: BuildableType) -> Result<usize> {
        self.buildables.check_index(buildable.id(), buildable.index())?;
        let id = buildable.id().clone();
        self.buildables.insert(&id, buildable)
    }

    pub fn add_equipment(&mut self, equipment: EquipmentType) -> Result<usize> {
        self.equipment.check_index(equipment.id(), equipment.index())?;
        let id = equipment.id().clone();
        self.equipment.insert(&id, equipment)
    }

    pub fn add_disaster(&mut self, disaster: Disaster) -> Result<usize> {
        let id = disaster.id().clone();
        self.disasters.insert(&id, disaster)
    }

    pub fn goods_type(&self, id: &Id) -> Option<&GoodsType> {
        self.goods.get(id)
    }

    pub fn goods_types(&self) -> &[GoodsType] {
        &self.goods.items
    }

    /// Unknown goods count as non-storable
    pub fn is_storable(&self, id: &Id) -> bool {
        self.goods_type(id).is_some_and(GoodsType::is_storable)
    }

    pub fn buildable(&self, id: &Id) -> Option<&BuildableType> {
        self.buildables.get(id)
    }

    pub fn buildables(&self) -> &[BuildableType] {
        &self.buildables.items
    }

    pub fn equipment(&self, id: &Id) -> Option<&EquipmentType> {
        self.equipment.get(id)
    }

    pub fn equipment_types(&self) -> &[EquipmentType] {
        &self.equipment.items
    }

    pub fn disaster(&self, id: &Id) -> Option<&Disaster> {
        self.disasters.get(id)
    }

    pub fn disasters(&self) -> &[Disaster] {
        &self.disasters.items
    }

    /// Unit types carrying an ability (e.g. every mercenary unit)
    pub fn unit_types_with_ability(&self, ability: &Id) -> Vec<&BuildableType> {
        self.buildables
            .items
            .iter()
            .filter(|b| !b.is_building() && b.features().has_ability(ability))
            .collect()
    }

    /// Check every identifier reference between loaded types
    pub fn validate_references(&self) -> Result<()> {
        for buildable in self.buildables() {
            for goods in buildable.required_goods() {
                if self.goods_type(&goods.goods_type).is_none() {
                    return Err(RulesError::UnknownGoodsType(goods.goods_type.clone()));
                }
            }
            if let Some(previous) = buildable.upgrades_from() {
                if self.buildable(previous).is_none() {
                    return Err(RulesError::UnknownBuildableType(previous.clone()));
                }
            }
        }

        for equipment in self.equipment_types() {
            for goods in equipment.required_goods() {
                if self.goods_type(&goods.goods_type).is_none() {
                    return Err(RulesError::UnknownGoodsType(goods.goods_type.clone()));
                }
            }
            for other in equipment.compatible_equipment() {
                if self.equipment(other).is_none() {
                    return Err(RulesError::UnknownEquipmentType(other.clone()));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::feature::Ability;
    use crate::features::FeatureContainer;

    fn rules() -> RuleSet {
        RuleSet::new(GameOptions::default(), MonarchConfig::default()).unwrap()
    }

    #[test]
    fn test_indices_follow_declaration_order() {
        let mut rules = rules();
        let hammers = GoodsType::new("model.goods.hammers", 0, false);
        assert_eq!(rules.add_goods_type(hammers).unwrap(), 0);
        assert_eq!(rules.add_goods_type(GoodsType::new("model.goods.tools", 1, true)).unwrap(), 1);
        assert_eq!(rules.next_goods_index(), 2);
        assert_eq!(rules.goods_type(&Id::new("model.goods.tools")).unwrap().index(), 1);
    }

    #[test]
    fn test_wrong_index_rejected() {
        let mut rules = rules();
        let result = rules.add_goods_type(GoodsType::new("model.goods.tools", 5, true));
        assert!(matches!(result, Err(RulesError::InvalidConfig(_))));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut rules = rules();
        rules.add_goods_type(GoodsType::new("model.goods.tools", 0, true)).unwrap();
        let result = rules.add_goods_type(GoodsType::new("model.goods.tools", 1, true));
        assert!(matches!(result, Err(RulesError::DuplicateId(_))));
    }

    #[test]
    fn test_storable_lookup() {
        let mut rules = rules();
        rules.add_goods_type(GoodsType::new("model.goods.hammers", 0, false)).unwrap();
        rules.add_goods_type(GoodsType::new("model.goods.tools", 1, true)).unwrap();
        assert!(!rules.is_storable(&Id::new("model.goods.hammers")));
        assert!(rules.is_storable(&Id::new("model.goods.tools")));
        assert!(!rules.is_storable(&Id::new("model.goods.unknown")));
    }

    #[test]
    fn test_unresolved_goods_reference() {
        let mut rules = rules();
        rules
            .add_buildable(
                BuildableType::building("model.building.docks", 0)
                    .with_required_goods("model.goods.hammers", 52),
            )
            .unwrap();
        assert!(matches!(
            rules.validate_references(),
            Err(RulesError::UnknownGoodsType(id)) if id.as_str() == "model.goods.hammers"
        ));
    }

    #[test]
    fn test_unit_types_with_ability() {
        let mut rules = rules();
        let mut features = FeatureContainer::new();
        features.add_ability(Ability::new("model.ability.mercenaryUnit", true));
        rules
            .add_buildable(
                BuildableType::unit("model.unit.veteranSoldier", 0).with_features(features),
            )
            .unwrap();
        rules.add_buildable(BuildableType::unit("model.unit.freeColonist", 1)).unwrap();
        let mercs = rules.unit_types_with_ability(&Id::new("model.ability.mercenaryUnit"));
        assert_eq!(mercs.len(), 1);
        assert_eq!(mercs[0].id().as_str(), "model.unit.veteranSoldier");
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = GameOptions {
            maximum_tax: 150,
            ..GameOptions::default()
        };
        assert!(RuleSet::new(options, MonarchConfig::default()).is_err());
    }
}
