//! Colonial Rules - feature composition engine for a colonial strategy game
//!
//! Rule-bearing types carry abilities and modifiers in feature containers.
//! Two consumers sit on top: colony build queues resolving goods
//! consumption, and the monarch's weighted-random action selector.

pub mod city;
pub mod core;
pub mod features;
pub mod monarch;
pub mod rules;
