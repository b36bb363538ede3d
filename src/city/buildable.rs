//! Buildable types - anything a colony can construct
//!
//! A buildable carries its requirement set: goods to consume, abilities the
//! builder must hold (all at once), and a minimum colony population.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::city::goods::AbstractGoods;
use crate::core::types::Id;
use crate::features::container::FeatureContainer;
use crate::features::scope::{Property, PropertyValue, ScopeTarget};

/// Building level or unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildableKind {
    Building {
        /// Building level this one replaces
        upgrades_from: Option<Id>,
    },
    Unit {
        /// Purchase price in Europe, if the unit can be bought
        price: Option<u32>,
        naval: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildableType {
    id: Id,
    index: usize,
    kind: BuildableKind,
    required_goods: Vec<AbstractGoods>,
    required_abilities: BTreeMap<Id, bool>,
    required_population: u32,
    features: FeatureContainer,
}

impl BuildableType {
    /// `index` is assigned by the rule registry in declaration order
    pub fn new(id: impl Into<Id>, index: usize, kind: BuildableKind) -> Self {
        Self {
            id: id.into(),
            index,
            kind,
            required_goods: Vec::new(),
            required_abilities: BTreeMap::new(),
            required_population: 1,
            features: FeatureContainer::new(),
        }
    }

    pub fn building(id: impl Into<Id>, index: usize) -> Self {
        Self::new(id, index, BuildableKind::Building { upgrades_from: None })
    }

    pub fn unit(id: impl Into<Id>, index: usize) -> Self {
        Self::new(
            id,
            index,
            BuildableKind::Unit {
                price: None,
                naval: false,
            },
        )
    }

    /// Requirements are matched against input in the order they are added
    pub fn with_required_goods(mut self, goods_type: impl Into<Id>, amount: u32) -> Self {
        self.required_goods.push(AbstractGoods::new(goods_type, amount));
        self
    }

    pub fn with_required_ability(mut self, id: impl Into<Id>, value: bool) -> Self {
        self.required_abilities.insert(id.into(), value);
        self
    }

    pub fn with_required_population(mut self, population: u32) -> Self {
        self.required_population = population;
        self
    }

    pub fn with_features(mut self, features: FeatureContainer) -> Self {
        self.features = features;
        self
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> &BuildableKind {
        &self.kind
    }

    pub fn is_building(&self) -> bool {
        matches!(self.kind, BuildableKind::Building { .. })
    }

    pub fn is_naval(&self) -> bool {
        matches!(self.kind, BuildableKind::Unit { naval: true, .. })
    }

    pub fn upgrades_from(&self) -> Option<&Id> {
        match &self.kind {
            BuildableKind::Building { upgrades_from } => upgrades_from.as_ref(),
            BuildableKind::Unit { .. } => None,
        }
    }

    pub fn price(&self) -> Option<u32> {
        match self.kind {
            BuildableKind::Unit { price, .. } => price,
            BuildableKind::Building { .. } => None,
        }
    }

    pub fn required_goods(&self) -> &[AbstractGoods] {
        &self.required_goods
    }

    pub fn required_abilities(&self) -> &BTreeMap<Id, bool> {
        &self.required_abilities
    }

    pub fn required_population(&self) -> u32 {
        self.required_population
    }

    pub fn features(&self) -> &FeatureContainer {
        &self.features
    }

    pub fn features_mut(&mut self) -> &mut FeatureContainer {
        &mut self.features
    }

    /// Types without goods requirements cannot be built in a colony
    pub fn needs_goods_to_build(&self) -> bool {
        !self.required_goods.is_empty()
    }

    pub fn required_amount_of(&self, goods_type: &Id) -> u32 {
        self.required_goods
            .iter()
            .filter(|g| &g.goods_type == goods_type)
            .map(|g| g.amount)
            .sum()
    }
}

impl ScopeTarget for BuildableType {
    fn type_id(&self) -> &Id {
        &self.id
    }

    fn has_ability(&self, id: &Id) -> bool {
        self.features.has_ability(id)
    }

    fn property(&self, property: Property) -> Option<PropertyValue> {
        match property {
            Property::Building => Some(PropertyValue::Bool(self.is_building())),
            Property::Naval => Some(PropertyValue::Bool(self.is_naval())),
            Property::RequiredPopulation => {
                Some(PropertyValue::Int(self.required_population as i64))
            }
            Property::Price => self.price().map(|p| PropertyValue::Int(p as i64)),
            _ => None,
        }
    }
}
