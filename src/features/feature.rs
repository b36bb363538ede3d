//! Feature - the record shared by abilities and modifiers
//!
//! Every feature has an identifier, an optional source (used to find and
//! remove everything a founding father or a piece of equipment granted), an
//! optional inclusive turn window, and a list of scopes.

use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, RulesError};
use crate::core::types::{Id, Turn};
use crate::features::modifier::Modifier;
use crate::features::scope::{Scope, ScopeTarget};

/// Identity, provenance, validity window and scopes of a feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureInfo {
    id: Id,
    source: Option<Id>,
    first_turn: Option<Turn>,
    last_turn: Option<Turn>,
    scopes: Vec<Scope>,
}

impl FeatureInfo {
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            source: None,
            first_turn: None,
            last_turn: None,
            scopes: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<Id>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scopes.push(scope);
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<Scope>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Set the inclusive validity window; either end may be open
    pub fn with_turn_window(mut self, first: Option<Turn>, last: Option<Turn>) -> Result<Self> {
        if let (Some(first), Some(last)) = (first, last) {
            if first > last {
                return Err(RulesError::InvalidTurnWindow {
                    id: self.id,
                    first,
                    last,
                });
            }
        }
        self.first_turn = first;
        self.last_turn = last;
        Ok(self)
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn source(&self) -> Option<&Id> {
        self.source.as_ref()
    }

    pub fn first_turn(&self) -> Option<Turn> {
        self.first_turn
    }

    pub fn last_turn(&self) -> Option<Turn> {
        self.last_turn
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn has_time_limit(&self) -> bool {
        self.first_turn.is_some() || self.last_turn.is_some()
    }

    pub fn has_scope(&self) -> bool {
        !self.scopes.is_empty()
    }

    /// True when `turn` lies inside the window
    pub fn is_active(&self, turn: Turn) -> bool {
        if self.first_turn.is_some_and(|first| turn < first) {
            return false;
        }
        !self.is_out_of_date(turn)
    }

    /// True iff a last turn is set and `turn` is past it
    pub fn is_out_of_date(&self, turn: Turn) -> bool {
        self.last_turn.is_some_and(|last| turn > last)
    }

    /// Empty scope list applies to everything; otherwise any scope must match
    pub fn applies_to<T: ScopeTarget + ?Sized>(&self, target: Option<&T>) -> bool {
        self.scopes.is_empty() || self.scopes.iter().any(|scope| scope.applies_to(target))
    }

    /// Turn window first, then scopes
    pub fn applies_to_at<T: ScopeTarget + ?Sized>(&self, target: Option<&T>, turn: Turn) -> bool {
        self.is_active(turn) && self.applies_to(target)
    }
}

/// Boolean capability flag
///
/// A false value is meaningful: it overrides an earlier true for the same id.
#[derive(Debug, Clone, PartialEq, Deref, Serialize, Deserialize)]
pub struct Ability {
    #[deref]
    info: FeatureInfo,
    value: bool,
}

impl Ability {
    pub fn new(id: impl Into<Id>, value: bool) -> Self {
        Self {
            info: FeatureInfo::new(id),
            value,
        }
    }

    pub fn from_info(info: FeatureInfo, value: bool) -> Self {
        Self { info, value }
    }

    pub fn with_source(mut self, source: impl Into<Id>) -> Self {
        self.info = self.info.with_source(source);
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.info = self.info.with_scope(scope);
        self
    }

    pub fn info(&self) -> &FeatureInfo {
        &self.info
    }

    pub fn value(&self) -> bool {
        self.value
    }
}

/// A feature is either an ability or a modifier
#[derive(Debug, Clone, PartialEq, From, Serialize, Deserialize)]
pub enum Feature {
    Ability(Ability),
    Modifier(Modifier),
}

impl Feature {
    pub fn info(&self) -> &FeatureInfo {
        match self {
            Feature::Ability(ability) => ability.info(),
            Feature::Modifier(modifier) => modifier.info(),
        }
    }

    pub fn id(&self) -> &Id {
        self.info().id()
    }
}
