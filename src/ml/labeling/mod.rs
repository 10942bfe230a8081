pub mod conditions;

pub use conditions::{BarrierCondition, ConditionSet, Side};
