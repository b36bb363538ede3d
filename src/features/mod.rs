//! Feature engine - abilities, modifiers, scopes and effects

pub mod container;
pub mod effect;
pub mod feature;
pub mod modifier;
pub mod scope;

pub use container::{FeatureContainer, FeatureStack};
pub use effect::{Disaster, Effect, EffectsPolicy};
pub use feature::{Ability, Feature, FeatureInfo};
pub use modifier::{apply_modifiers, Increment, Modifier, ModifierOp};
pub use scope::{Property, PropertyValue, Scope, ScopeTarget};

/// Well-known ability identifiers
pub mod ability {
    pub const CONSUME_ALL_OR_NOTHING: &str = "model.ability.consumeAllOrNothing";
    pub const BUILD: &str = "model.ability.build";
    pub const INDEPENDENCE_DECLARED: &str = "model.ability.independenceDeclared";
    pub const MERCENARY_UNIT: &str = "model.ability.mercenaryUnit";
    pub const CAN_BE_EQUIPPED: &str = "model.ability.canBeEquipped";
}
