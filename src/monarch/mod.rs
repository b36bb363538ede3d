//! The crown - weighted-random meddling in a colonial player's affairs

pub mod action;
pub mod force;
pub mod player;
pub mod selector;

pub use action::MonarchAction;
pub use force::{RefAddition, RefForce, RefUnit};
pub use player::{Contact, MonarchContext, PlayerState, PlayerStatus, Stance};
pub use selector::{MercenaryOffer, Monarch, MonarchOutcome};
