//! Scope - a predicate limiting which game objects a feature applies to
//!
//! A scope combines up to three optional predicates (type identity, required
//! ability, typed property). Unset predicates are ignored, so an empty scope
//! matches everything.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::error::RulesError;
use crate::core::types::Id;

/// Properties a scope may query on its target
///
/// Property names are resolved when rules are loaded, so a misspelt name is a
/// load error rather than a predicate that silently never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    #[display(fmt = "storable")]
    Storable,
    #[display(fmt = "foodType")]
    FoodType,
    #[display(fmt = "building")]
    Building,
    #[display(fmt = "naval")]
    Naval,
    #[display(fmt = "requiredPopulation")]
    RequiredPopulation,
    #[display(fmt = "price")]
    Price,
}

impl FromStr for Property {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "storable" => Ok(Property::Storable),
            "foodType" => Ok(Property::FoodType),
            "building" => Ok(Property::Building),
            "naval" => Ok(Property::Naval),
            "requiredPopulation" => Ok(Property::RequiredPopulation),
            "price" => Ok(Property::Price),
            _ => Err(RulesError::UnknownProperty(s.to_string())),
        }
    }
}

/// Typed answer to a property query
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Text(Id),
}

/// A typed game object that scopes can be evaluated against
pub trait ScopeTarget {
    /// Identifier of the object's type
    fn type_id(&self) -> &Id;

    /// Whether the object holds the ability (absent means false)
    fn has_ability(&self, id: &Id) -> bool;

    /// Answer a property query, or `None` if this target family has no such property
    fn property(&self, property: Property) -> Option<PropertyValue> {
        let _ = property;
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct AbilityMatch {
    id: Id,
    value: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PropertyMatch {
    property: Property,
    expected: String,
}

/// Applicability predicate over a [`ScopeTarget`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    target_type: Option<Id>,
    ability: Option<AbilityMatch>,
    property: Option<PropertyMatch>,
    match_negated: bool,
    matches_null: bool,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            target_type: None,
            ability: None,
            property: None,
            match_negated: false,
            matches_null: true,
        }
    }
}

impl Scope {
    /// A scope with no predicates; matches every target
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, type_id: impl Into<Id>) -> Self {
        self.target_type = Some(type_id.into());
        self
    }

    pub fn with_ability(mut self, id: impl Into<Id>, value: bool) -> Self {
        self.ability = Some(AbilityMatch { id: id.into(), value });
        self
    }

    pub fn with_property(mut self, property: Property, expected: impl Into<String>) -> Self {
        self.property = Some(PropertyMatch {
            property,
            expected: expected.into(),
        });
        self
    }

    /// Invert the outcome for non-null targets
    pub fn negated(mut self, negated: bool) -> Self {
        self.match_negated = negated;
        self
    }

    /// Result returned when there is no target at all
    pub fn with_matches_null(mut self, matches_null: bool) -> Self {
        self.matches_null = matches_null;
        self
    }

    pub fn target_type(&self) -> Option<&Id> {
        self.target_type.as_ref()
    }

    pub fn ability(&self) -> Option<(&Id, bool)> {
        self.ability.as_ref().map(|a| (&a.id, a.value))
    }

    pub fn property(&self) -> Option<(Property, &str)> {
        self.property
            .as_ref()
            .map(|p| (p.property, p.expected.as_str()))
    }

    pub fn is_negated(&self) -> bool {
        self.match_negated
    }

    pub fn matches_null(&self) -> bool {
        self.matches_null
    }

    /// Conjunction of every set predicate
    pub fn applies_to<T: ScopeTarget + ?Sized>(&self, target: Option<&T>) -> bool {
        let Some(target) = target else {
            return self.matches_null;
        };

        if let Some(type_id) = &self.target_type {
            if type_id != target.type_id() {
                return self.match_negated;
            }
        }

        if let Some(ability) = &self.ability {
            if target.has_ability(&ability.id) != ability.value {
                return self.match_negated;
            }
        }

        if let Some(wanted) = &self.property {
            // Unanswerable properties fail closed, even when negated
            match target.property(wanted.property) {
                Some(value) => {
                    if value.to_string() != wanted.expected {
                        return self.match_negated;
                    }
                }
                None => return false,
            }
        }

        !self.match_negated
    }
}
