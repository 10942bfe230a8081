//! Multi-barrier labeling rules.
//!
//! A [`ConditionSet`] turns a barrier unit `b` and a level count `n` into
//! `2n` predicates over a continuous return, keyed `-n..=-1` and `1..=n`.
//! Labeling pipelines evaluate a return against the set and use the
//! resulting level as the label, with `0` meaning no barrier was crossed.

pub mod config;
pub mod error;
pub mod ml;

pub use crate::config::{AppConfig, BarrierConfig, ConfigManager};
pub use crate::error::{BarrierError, Result};
pub use crate::ml::labeling::{BarrierCondition, ConditionSet, Side};
