pub mod config;
pub mod error;
pub mod rng;
pub mod types;

pub use config::{Difficulty, GameOptions, MonarchConfig};
pub use error::{Result, RulesError};
pub use rng::{GameRng, RandomChoice, RandomSource};
pub use types::{AbstractUnit, Id, PlayerId, Turn};
