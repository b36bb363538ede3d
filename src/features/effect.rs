//! Effects and the disasters that own them
//!
//! A disaster picks which of its effects fire using one of three policies.
//! The meaning of an effect's probability depends on that policy:
//! - ALL: ignored, every matching effect fires
//! - ONE: relative weight in a single weighted draw
//! - SEVERAL: independent percentage roll per effect

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::error::{Result, RulesError};
use crate::core::rng::{weighted_choice, RandomChoice, RandomSource};
use crate::core::types::Id;
use crate::features::container::FeatureContainer;
use crate::features::scope::{Scope, ScopeTarget};

/// Probabilistic outcome of a disaster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    id: Id,
    probability: u32,
    scopes: Vec<Scope>,
    features: FeatureContainer,
}

impl Effect {
    /// Rejects negative probabilities
    pub fn new(id: impl Into<Id>, probability: i64, scopes: Vec<Scope>) -> Result<Self> {
        let id = id.into();
        let probability = u32::try_from(probability)
            .map_err(|_| RulesError::InvalidProbability { id: id.clone(), probability })?;
        Ok(Self {
            id,
            probability,
            scopes,
            features: FeatureContainer::new(),
        })
    }

    pub fn with_features(mut self, features: FeatureContainer) -> Self {
        self.features = features;
        self
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn probability(&self) -> u32 {
        self.probability
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Numeric and boolean consequences of this effect
    pub fn features(&self) -> &FeatureContainer {
        &self.features
    }

    pub fn applies_to<T: ScopeTarget + ?Sized>(&self, target: Option<&T>) -> bool {
        self.scopes.is_empty() || self.scopes.iter().any(|scope| scope.applies_to(target))
    }
}

/// How a disaster chooses among its effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectsPolicy {
    All,
    One,
    Several,
}

impl FromStr for EffectsPolicy {
    type Err = RulesError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(EffectsPolicy::All),
            "one" => Ok(EffectsPolicy::One),
            "several" => Ok(EffectsPolicy::Several),
            _ => Err(RulesError::UnknownEffectsPolicy(s.to_string())),
        }
    }
}

/// A scripted event with a set of possible effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disaster {
    id: Id,
    policy: EffectsPolicy,
    effects: Vec<Effect>,
}

impl Disaster {
    /// Under SEVERAL every probability must be a percentage; under ONE the
    /// weights must sum within `u32`
    pub fn new(id: impl Into<Id>, policy: EffectsPolicy, effects: Vec<Effect>) -> Result<Self> {
        let id = id.into();
        match policy {
            EffectsPolicy::Several => {
                if let Some(bad) = effects.iter().find(|e| e.probability > 100) {
                    return Err(RulesError::InvalidProbability {
                        id: bad.id.clone(),
                        probability: bad.probability as i64,
                    });
                }
            }
            EffectsPolicy::One => {
                let total: u64 = effects.iter().map(|e| u64::from(e.probability)).sum();
                if total > u64::from(u32::MAX) {
                    return Err(RulesError::InvalidConfig(format!(
                        "effect weights of {} sum to {}, above {}",
                        id,
                        total,
                        u32::MAX
                    )));
                }
            }
            EffectsPolicy::All => {}
        }
        Ok(Self {
            id,
            policy,
            effects,
        })
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn policy(&self) -> EffectsPolicy {
        self.policy
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Effects that fire against `target`
    ///
    /// ALL consumes no randomness. ONE consumes one draw when any matching
    /// effect has positive weight. SEVERAL consumes one roll per matching effect.
    pub fn choose_effects<T, R>(&self, target: Option<&T>, rng: &mut R) -> Vec<&Effect>
    where
        T: ScopeTarget + ?Sized,
        R: RandomSource + ?Sized,
    {
        let matching = self.effects.iter().filter(|e| e.applies_to(target));

        let chosen: Vec<&Effect> = match self.policy {
            EffectsPolicy::All => matching.collect(),
            EffectsPolicy::One => {
                let choices: Vec<RandomChoice<&Effect>> = matching
                    .map(|e| RandomChoice::new(e, e.probability))
                    .collect();
                weighted_choice(rng, &choices).copied().into_iter().collect()
            }
            EffectsPolicy::Several => matching
                .filter(|e| rng.next_int(100) < e.probability)
                .collect(),
        };

        tracing::debug!(
            "Disaster {} ({:?}) chose {} effects",
            self.id,
            self.policy,
            chosen.len()
        );
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::testing::ScriptedRandom;
    use crate::core::rng::GameRng;
    use crate::features::scope::testing::TestTarget;

    fn effect(id: &str, probability: i64) -> Effect {
        Effect::new(id, probability, Vec::new()).unwrap()
    }

    fn ids(effects: &[&Effect]) -> Vec<String> {
        effects.iter().map(|e| e.id().to_string()).collect()
    }

    #[test]
    fn test_negative_probability_rejected() {
        assert!(matches!(
            Effect::new("model.disaster.effect.lossOfMoney", -1, Vec::new()),
            Err(RulesError::InvalidProbability { probability: -1, .. })
        ));
    }

    #[test]
    fn test_several_requires_percentages() {
        let result = Disaster::new(
            "model.disaster.flood",
            EffectsPolicy::Several,
            vec![effect("a", 150)],
        );
        assert!(result.is_err());
        // The same weight is fine under ONE
        let one = Disaster::new("model.disaster.flood", EffectsPolicy::One, vec![effect("a", 150)]);
        assert!(one.is_ok());
    }

    #[test]
    fn test_one_policy_weights_must_fit_u32() {
        let max = i64::from(u32::MAX);
        let result = Disaster::new(
            "model.disaster.flood",
            EffectsPolicy::One,
            vec![effect("a", max), effect("b", 1)],
        );
        assert!(matches!(result, Err(RulesError::InvalidConfig(_))));

        let disaster =
            Disaster::new("model.disaster.flood", EffectsPolicy::One, vec![effect("a", max)])
                .unwrap();
        let mut rng = GameRng::seed_from_u64(1);
        let chosen = disaster.choose_effects::<TestTarget, _>(None, &mut rng);
        assert_eq!(ids(&chosen), vec!["a"]);
    }

    #[test]
    fn test_effect_scope_disjunction() {
        let e = Effect::new(
            "model.disaster.effect.lossOfBuilding",
            10,
            vec![
                Scope::any().with_type("model.building.docks"),
                Scope::any().with_type("model.building.stockade"),
            ],
        )
        .unwrap();
        assert!(e.applies_to(Some(&TestTarget::new("model.building.docks"))));
        assert!(!e.applies_to(Some(&TestTarget::new("model.building.chapel"))));
    }

    #[test]
    fn test_all_policy_fires_every_match_without_randomness() {
        let disaster = Disaster::new(
            "model.disaster.fire",
            EffectsPolicy::All,
            vec![
                effect("a", 0),
                Effect::new("b", 0, vec![Scope::any().with_type("model.colony.other")]).unwrap(),
                effect("c", 7),
            ],
        )
        .unwrap();
        let mut rng = ScriptedRandom::new(vec![0]);
        let target = TestTarget::new("model.colony.here");
        let chosen = disaster.choose_effects(Some(&target), &mut rng);
        assert_eq!(ids(&chosen), vec!["a", "c"]);
        assert_eq!(rng.calls, 0);
    }

    #[test]
    fn test_one_policy_weighted_over_matching() {
        let disaster = Disaster::new(
            "model.disaster.raid",
            EffectsPolicy::One,
            vec![effect("a", 1), effect("b", 3)],
        )
        .unwrap();
        let target = TestTarget::new("model.colony.here");

        let mut low = ScriptedRandom::new(vec![0]);
        assert_eq!(ids(&disaster.choose_effects(Some(&target), &mut low)), vec!["a"]);
        let mut high = ScriptedRandom::new(vec![1]);
        assert_eq!(ids(&disaster.choose_effects(Some(&target), &mut high)), vec!["b"]);
        assert_eq!(high.calls, 1);
    }

    #[test]
    fn test_one_policy_zero_weights_pick_nothing() {
        let disaster =
            Disaster::new("model.disaster.raid", EffectsPolicy::One, vec![effect("a", 0)]).unwrap();
        let mut rng = GameRng::seed_from_u64(1);
        assert!(disaster.choose_effects::<TestTarget, _>(None, &mut rng).is_empty());
    }

    #[test]
    fn test_several_policy_extremes() {
        let disaster = Disaster::new(
            "model.disaster.plague",
            EffectsPolicy::Several,
            vec![effect("always", 100), effect("never", 0)],
        )
        .unwrap();
        let mut rng = GameRng::seed_from_u64(99);
        for _ in 0..200 {
            let chosen = disaster.choose_effects::<TestTarget, _>(None, &mut rng);
            assert_eq!(ids(&chosen), vec!["always"]);
        }
    }

    #[test]
    fn test_policy_names() {
        assert_eq!("SEVERAL".parse::<EffectsPolicy>().unwrap(), EffectsPolicy::Several);
        assert!("some".parse::<EffectsPolicy>().is_err());
    }
}
