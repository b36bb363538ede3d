use thiserror::Error;

use crate::core::types::{Id, Turn};

#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Unknown goods type: {0}")]
    UnknownGoodsType(Id),

    #[error("Unknown buildable type: {0}")]
    UnknownBuildableType(Id),

    #[error("Unknown equipment type: {0}")]
    UnknownEquipmentType(Id),

    #[error("Unknown scope property: {0}")]
    UnknownProperty(String),

    #[error("Unknown modifier operation: {0}")]
    UnknownModifierOp(String),

    #[error("Unknown effects policy: {0}")]
    UnknownEffectsPolicy(String),

    #[error("Duplicate identifier: {0}")]
    DuplicateId(Id),

    #[error("Invalid turn window for {id}: first turn {first} is after last turn {last}")]
    InvalidTurnWindow { id: Id, first: Turn, last: Turn },

    #[error("Invalid probability {probability} for effect {id}")]
    InvalidProbability { id: Id, probability: i64 },

    #[error("Invalid difficulty tier: {0}")]
    InvalidDifficulty(u8),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RulesError>;
