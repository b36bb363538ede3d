//! Rule definitions loaded from TOML

pub mod equipment;
mod loader;
pub mod ruleset;

pub use equipment::EquipmentType;
pub use ruleset::RuleSet;
