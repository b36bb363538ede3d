//! Build queue - a colony's ordered construction backlog
//!
//! The head of the queue is what the colony is currently building. Each
//! turn the production resolver asks the queue which goods it would consume
//! from what is available; the queue consumes all of its requirements or
//! none of them.

use serde::{Deserialize, Serialize};

use crate::city::buildable::BuildableType;
use crate::city::goods::AbstractGoods;
use crate::core::rng::{shuffle, RandomSource};
use crate::core::types::Id;
use crate::features::ability;
use crate::features::container::FeatureContainer;
use crate::features::feature::Ability;
use crate::rules::ruleset::RuleSet;

/// What happens to the queue when the head item completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionAction {
    /// Drop the finished item
    #[default]
    Remove,
    /// Drop the finished item unless it is the last one, which repeats
    RemoveExceptLast,
    /// Drop the finished item and shuffle the rest
    Shuffle,
    /// Drop the finished item and append a random pick from the old queue
    AddRandom,
}

/// Goods the head item would consume this turn
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionInfo {
    pub consumption: Vec<AbstractGoods>,
}

impl ProductionInfo {
    pub fn is_empty(&self) -> bool {
        self.consumption.is_empty()
    }

    pub fn consumed(&self, goods_type: &Id) -> u32 {
        self.consumption
            .iter()
            .filter(|g| &g.goods_type == goods_type)
            .map(|g| g.amount)
            .sum()
    }
}

/// Why [`BuildQueue::get_production_info`] returned what it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductionStatus {
    /// Nothing queued
    EmptyQueue,
    /// A requirement of the head item cannot be met
    Blocked,
    /// Every requirement can be met
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildQueue {
    queue: Vec<BuildableType>,
    completion_action: CompletionAction,
    priority: i32,
    features: FeatureContainer,
}

impl Default for BuildQueue {
    fn default() -> Self {
        Self::new(CompletionAction::default(), 0)
    }
}

impl BuildQueue {
    pub fn new(completion_action: CompletionAction, priority: i32) -> Self {
        let mut features = FeatureContainer::new();
        features.add_ability(Ability::new(ability::CONSUME_ALL_OR_NOTHING, true));
        Self {
            queue: Vec::new(),
            completion_action,
            priority,
            features,
        }
    }

    pub fn completion_action(&self) -> CompletionAction {
        self.completion_action
    }

    /// Order among the colony's goods consumers
    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn features(&self) -> &FeatureContainer {
        &self.features
    }

    pub fn consumes_all_or_nothing(&self) -> bool {
        self.features
            .has_ability(&Id::new(ability::CONSUME_ALL_OR_NOTHING))
    }

    /// Append an item; a building already in the queue moves to the end
    pub fn add(&mut self, buildable: BuildableType) {
        if buildable.is_building() {
            self.queue.retain(|queued| queued.id() != buildable.id());
        }
        self.queue.push(buildable);
    }

    pub fn add_all(&mut self, buildables: impl IntoIterator<Item = BuildableType>) {
        for buildable in buildables {
            self.add(buildable);
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<BuildableType> {
        (index < self.queue.len()).then(|| self.queue.remove(index))
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Replace the whole queue, keeping buildings unique
    pub fn set_queue(&mut self, buildables: Vec<BuildableType>) {
        self.queue.clear();
        self.add_all(buildables);
    }

    pub fn current_building(&self) -> Option<&BuildableType> {
        self.queue.first()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildableType> {
        self.queue.iter()
    }

    /// Goods the head item needs in total
    pub fn consumed_goods(&self) -> &[AbstractGoods] {
        self.current_building()
            .map(BuildableType::required_goods)
            .unwrap_or(&[])
    }

    /// Consumption for the head item given the available input
    ///
    /// Requirements are matched in declaration order against the first input
    /// entry of the same goods type holding enough of it. Storable goods (or
    /// any goods when overflow is saved) consume exactly the requirement;
    /// otherwise that entry's whole amount goes. One unmet requirement empties
    /// the result.
    pub fn get_production_info(
        &self,
        available: &[AbstractGoods],
        rules: &RuleSet,
    ) -> ProductionInfo {
        let Some(current) = self.current_building() else {
            return ProductionInfo::default();
        };

        let overflow = rules.options().save_production_overflow;
        let mut consumption = Vec::with_capacity(current.required_goods().len());
        for required in current.required_goods() {
            let Some(input) = available.iter().find(|input| {
                input.goods_type == required.goods_type && input.amount >= required.amount
            }) else {
                tracing::debug!(
                    "{} blocked: no entry holds {} {}",
                    current.id(),
                    required.amount,
                    required.goods_type
                );
                return ProductionInfo::default();
            };

            let amount = if overflow || rules.is_storable(&required.goods_type) {
                required.amount
            } else {
                input.amount
            };
            consumption.push(AbstractGoods::new(required.goods_type.clone(), amount));
        }

        tracing::debug!("{} consumes {} goods types", current.id(), consumption.len());
        ProductionInfo { consumption }
    }

    /// Tells an empty queue apart from a blocked head item
    pub fn production_status(
        &self,
        available: &[AbstractGoods],
        rules: &RuleSet,
    ) -> ProductionStatus {
        match self.current_building() {
            None => ProductionStatus::EmptyQueue,
            Some(current) if !current.needs_goods_to_build() => ProductionStatus::Ready,
            Some(_) if self.get_production_info(available, rules).is_empty() => {
                ProductionStatus::Blocked
            }
            Some(_) => ProductionStatus::Ready,
        }
    }

    /// Advance past the finished head item; returns it
    pub fn complete<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Option<BuildableType> {
        let finished = self.current_building()?.clone();
        match self.completion_action {
            CompletionAction::Remove => {
                self.queue.remove(0);
            }
            CompletionAction::RemoveExceptLast => {
                if self.queue.len() > 1 {
                    self.queue.remove(0);
                }
            }
            CompletionAction::Shuffle => {
                self.queue.remove(0);
                shuffle(rng, &mut self.queue);
            }
            CompletionAction::AddRandom => {
                let pick = rng.next_int(self.queue.len() as u32) as usize;
                let replacement = self.queue[pick].clone();
                self.queue.remove(0);
                self.add(replacement);
            }
        }
        tracing::debug!(
            "Completed {} ({:?}), {} left in queue",
            finished.id(),
            self.completion_action,
            self.queue.len()
        );
        Some(finished)
    }
}
