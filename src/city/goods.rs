//! Goods types and goods amounts

use serde::{Deserialize, Serialize};

use crate::core::types::Id;
use crate::features::container::FeatureContainer;
use crate::features::scope::{Property, PropertyValue, ScopeTarget};

/// A kind of goods (hammers, tools, furs, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodsType {
    id: Id,
    index: usize,
    /// Storable goods can be banked in the warehouse; hammers and bells cannot
    storable: bool,
    food_type: bool,
    features: FeatureContainer,
}

impl GoodsType {
    /// `index` is assigned by the rule registry in declaration order
    pub fn new(id: impl Into<Id>, index: usize, storable: bool) -> Self {
        Self {
            id: id.into(),
            index,
            storable,
            food_type: false,
            features: FeatureContainer::new(),
        }
    }

    pub fn with_food_type(mut self, food_type: bool) -> Self {
        self.food_type = food_type;
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

    pub fn is_storable(&self) -> bool {
        self.storable
    }

    pub fn is_food_type(&self) -> bool {
        self.food_type
    }

    pub fn features(&self) -> &FeatureContainer {
        &self.features
    }
}

impl ScopeTarget for GoodsType {
    fn type_id(&self) -> &Id {
        &self.id
    }

    fn has_ability(&self, id: &Id) -> bool {
        self.features.has_ability(id)
    }

    fn property(&self, property: Property) -> Option<PropertyValue> {
        match property {
            Property::Storable => Some(PropertyValue::Bool(self.storable)),
            Property::FoodType => Some(PropertyValue::Bool(self.food_type)),
            _ => None,
        }
    }
}

/// An amount of one goods type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbstractGoods {
    pub goods_type: Id,
    pub amount: u32,
}

impl AbstractGoods {
    pub fn new(goods_type: impl Into<Id>, amount: u32) -> Self {
        Self {
            goods_type: goods_type.into(),
            amount,
        }
    }
}
