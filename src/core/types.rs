//! Core type definitions used throughout the codebase

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::sync::Arc;

/// Opaque identifier naming a type, ability, or modifier
/// (e.g. `model.ability.consumeAllOrNothing`).
///
/// Clones share the same allocation; equality is by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(Arc<str>);

impl Id {
    pub fn new(value: &str) -> Self {
        Self(Arc::from(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl Borrow<str> for Id {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Game turn. Turn numbers start at 0 and only increase.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Turn(pub u32);

impl Turn {
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    pub fn number(&self) -> u32 {
        self.0
    }

    /// Turns elapsed since `earlier`, zero if `earlier` is in the future
    pub fn since(&self, earlier: Turn) -> u32 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Unique identifier for players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl PlayerId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// A number of units of one type, not yet instantiated on the map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractUnit {
    pub unit_type: Id,
    pub number: u32,
}

impl AbstractUnit {
    pub fn new(unit_type: impl Into<Id>, number: u32) -> Self {
        Self { unit_type: unit_type.into(), number }
    }
}
