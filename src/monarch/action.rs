//! Monarch action vocabulary

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Everything the crown can do to a colonial player in one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonarchAction {
    #[display(fmt = "NO_ACTION")]
    NoAction,
    #[display(fmt = "RAISE_TAX")]
    RaiseTax,
    #[display(fmt = "ADD_TO_REF")]
    AddToRef,
    #[display(fmt = "DECLARE_WAR")]
    DeclareWar,
    #[display(fmt = "SUPPORT_SEA")]
    SupportSea,
    #[display(fmt = "SUPPORT_LAND")]
    SupportLand,
    #[display(fmt = "OFFER_MERCENARIES")]
    OfferMercenaries,
    #[display(fmt = "WAIVE_TAX")]
    WaiveTax,
    #[display(fmt = "ADD_UNITS")]
    AddUnits,
}

impl MonarchAction {
    /// Actions the random selector may return, in table order
    pub const SELECTABLE: [MonarchAction; 7] = [
        MonarchAction::NoAction,
        MonarchAction::RaiseTax,
        MonarchAction::AddToRef,
        MonarchAction::DeclareWar,
        MonarchAction::SupportSea,
        MonarchAction::SupportLand,
        MonarchAction::OfferMercenaries,
    ];

    /// WAIVE_TAX and ADD_UNITS are only issued by the caller as follow-ups
    pub fn is_selectable(&self) -> bool {
        Self::SELECTABLE.contains(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_up_actions_not_selectable() {
        assert!(MonarchAction::RaiseTax.is_selectable());
        assert!(!MonarchAction::WaiveTax.is_selectable());
        assert!(!MonarchAction::AddUnits.is_selectable());
    }

    #[test]
    fn test_display_and_serde_names_agree() {
        let json = serde_json::to_string(&MonarchAction::OfferMercenaries).unwrap();
        assert_eq!(json, "\"OFFER_MERCENARIES\"");
        assert_eq!(MonarchAction::OfferMercenaries.to_string(), "OFFER_MERCENARIES");
    }
}
