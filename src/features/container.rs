//! FeatureContainer - the per-entity store of abilities and modifiers
//!
//! Abilities are keyed by id with last-write-wins. Modifiers accumulate: every
//! source contributes and registration order is kept for stacking.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Id, Turn};
use crate::features::feature::{Ability, Feature};
use crate::features::modifier::{apply_modifiers, Modifier};
use crate::features::scope::ScopeTarget;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureContainer {
    abilities: AHashMap<Id, Ability>,
    modifiers: AHashMap<Id, Vec<Modifier>>,
}

impl FeatureContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty() && self.modifiers.is_empty()
    }

    pub fn add_feature(&mut self, feature: impl Into<Feature>) {
        match feature.into() {
            Feature::Ability(ability) => self.add_ability(ability),
            Feature::Modifier(modifier) => self.add_modifier(modifier),
        }
    }

    /// Replace any ability with the same id
    pub fn add_ability(&mut self, ability: Ability) {
        self.abilities.insert(ability.id().clone(), ability);
    }

    /// Append to the modifier list for this id
    pub fn add_modifier(&mut self, modifier: Modifier) {
        self.modifiers
            .entry(modifier.id().clone())
            .or_default()
            .push(modifier);
    }

    /// Merge another container; its abilities override ours
    pub fn add_container(&mut self, other: &FeatureContainer) {
        for ability in other.abilities.values() {
            self.add_ability(ability.clone());
        }
        for modifier in other.modifiers.values().flatten() {
            self.add_modifier(modifier.clone());
        }
    }

    pub fn get_ability(&self, id: &Id) -> Option<&Ability> {
        self.abilities.get(id)
    }

    /// Stored value, false if absent
    pub fn has_ability(&self, id: &Id) -> bool {
        self.abilities.get(id).is_some_and(|a| a.value())
    }

    /// Stored value, additionally requiring the ability to apply to the
    /// target and, when a turn is given, to be inside its window
    pub fn has_ability_for<T: ScopeTarget + ?Sized>(
        &self,
        id: &Id,
        target: Option<&T>,
        turn: Option<Turn>,
    ) -> bool {
        self.abilities.get(id).is_some_and(|ability| {
            ability.value()
                && turn.map_or(true, |turn| ability.is_active(turn))
                && ability.applies_to(target)
        })
    }

    pub fn ability_ids(&self) -> impl Iterator<Item = &Id> {
        self.abilities.keys()
    }

    pub fn abilities(&self) -> impl Iterator<Item = &Ability> {
        self.abilities.values()
    }

    /// All modifiers; order is only meaningful within one id
    pub fn modifiers(&self) -> impl Iterator<Item = &Modifier> {
        self.modifiers.values().flatten()
    }

    /// First registered modifier with this id
    pub fn get_modifier(&self, id: &Id) -> Option<&Modifier> {
        self.modifiers.get(id).and_then(|set| set.first())
    }

    /// Every modifier with this id, in registration order
    pub fn get_modifier_set(&self, id: &Id) -> &[Modifier] {
        self.modifiers.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_modifier_key(&self, id: &Id) -> bool {
        self.modifiers.get(id).is_some_and(|set| !set.is_empty())
    }

    /// Owned snapshot of the modifiers that apply to `target` at `turn`
    pub fn applicable_modifiers<T: ScopeTarget + ?Sized>(
        &self,
        id: &Id,
        target: Option<&T>,
        turn: Turn,
    ) -> Vec<Modifier> {
        self.get_modifier_set(id)
            .iter()
            .filter(|m| m.applies_to_at(target, turn))
            .cloned()
            .collect()
    }

    /// Run `base` through every applicable modifier with this id
    pub fn apply_modifier<T: ScopeTarget + ?Sized>(
        &self,
        base: f32,
        id: &Id,
        target: Option<&T>,
        turn: Turn,
    ) -> f32 {
        let applicable = self
            .get_modifier_set(id)
            .iter()
            .filter(|m| m.applies_to(target));
        apply_modifiers(base, turn, applicable)
    }

    /// Drop everything a source granted; returns how many features went
    pub fn remove_features_from_source(&mut self, source: &Id) -> usize {
        let before = self.feature_count();
        self.abilities
            .retain(|_, ability| ability.source() != Some(source));
        for set in self.modifiers.values_mut() {
            set.retain(|modifier| modifier.source() != Some(source));
        }
        self.modifiers.retain(|_, set| !set.is_empty());
        let removed = before - self.feature_count();
        if removed > 0 {
            tracing::debug!("Removed {} features granted by {}", removed, source);
        }
        removed
    }

    /// Drop features whose last turn has passed
    pub fn expire(&mut self, turn: Turn) -> usize {
        let before = self.feature_count();
        self.abilities.retain(|_, ability| !ability.is_out_of_date(turn));
        for set in self.modifiers.values_mut() {
            set.retain(|modifier| !modifier.is_out_of_date(turn));
        }
        self.modifiers.retain(|_, set| !set.is_empty());
        let expired = before - self.feature_count();
        if expired > 0 {
            tracing::debug!("Expired {} features at turn {}", expired, turn);
        }
        expired
    }

    pub fn feature_count(&self) -> usize {
        self.abilities.len() + self.modifiers.values().map(Vec::len).sum::<usize>()
    }
}

/// Ordered view over several containers (unit type, equipment, owner, ...)
///
/// Abilities resolve from the last layer that registers the id, so a later
/// layer overrides an earlier one. Modifier sets concatenate in layer order.
#[derive(Debug, Clone, Default)]
pub struct FeatureStack<'a> {
    layers: Vec<&'a FeatureContainer>,
}

impl<'a> FeatureStack<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, layer: &'a FeatureContainer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn push(&mut self, layer: &'a FeatureContainer) {
        self.layers.push(layer);
    }

    pub fn get_ability(&self, id: &Id) -> Option<&'a Ability> {
        self.layers.iter().rev().find_map(|&layer| layer.get_ability(id))
    }

    pub fn has_ability(&self, id: &Id) -> bool {
        self.get_ability(id).is_some_and(|a| a.value())
    }

    pub fn has_ability_for<T: ScopeTarget + ?Sized>(
        &self,
        id: &Id,
        target: Option<&T>,
        turn: Option<Turn>,
    ) -> bool {
        self.layers
            .iter()
            .rev()
            .find(|layer| layer.get_ability(id).is_some())
            .is_some_and(|layer| layer.has_ability_for(id, target, turn))
    }

    pub fn get_modifier_set(&self, id: &Id) -> Vec<&'a Modifier> {
        self.layers
            .iter()
            .flat_map(|&layer| layer.get_modifier_set(id))
            .collect()
    }

    pub fn contains_modifier_key(&self, id: &Id) -> bool {
        self.layers.iter().any(|layer| layer.contains_modifier_key(id))
    }

    pub fn apply_modifier<T: ScopeTarget + ?Sized>(
        &self,
        base: f32,
        id: &Id,
        target: Option<&T>,
        turn: Turn,
    ) -> f32 {
        let applicable = self
            .get_modifier_set(id)
            .into_iter()
            .filter(|m| m.applies_to(target));
        apply_modifiers(base, turn, applicable)
    }
}
