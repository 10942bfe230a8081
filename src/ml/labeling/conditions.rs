use crate::config::BarrierConfig;
use crate::error::{BarrierError, Result};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Upper, // x > level * unit
    Lower, // x < -level * unit
}

/// One barrier predicate, captured by value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrierCondition {
    pub side: Side,
    pub level: u32,
    pub unit: f64,
}

impl BarrierCondition {
    pub fn upper(level: u32, unit: f64) -> Self {
        Self { side: Side::Upper, level, unit }
    }

    pub fn lower(level: u32, unit: f64) -> Self {
        Self { side: Side::Lower, level, unit }
    }

    /// Signed key of this condition in a [`ConditionSet`].
    pub fn key(&self) -> i32 {
        let level = self.level as i32;
        match self.side {
            Side::Upper => level,
            Side::Lower => -level,
        }
    }

    pub fn threshold(&self) -> f64 {
        let magnitude = self.level as f64 * self.unit;
        match self.side {
            Side::Upper => magnitude,
            Side::Lower => -magnitude,
        }
    }

    /// Strict comparison against the threshold. NaN never holds.
    pub fn holds(&self, x: f64) -> bool {
        match self.side {
            Side::Upper => x > self.threshold(),
            Side::Lower => x < self.threshold(),
        }
    }
}

impl fmt::Display for BarrierCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            Side::Upper => write!(f, "x > {}", self.threshold()),
            Side::Lower => write!(f, "x < {}", self.threshold()),
        }
    }
}

/// Barrier conditions for labels `-n..=-1` and `1..=n`.
///
/// For `n = 1` and barrier `b` the resulting rule is
///
/// ```text
/// y = -1  if r < -b
///      1  if r >  b
///      0  otherwise
/// ```
///
/// Larger `n` adds conditions at each multiple of `b` up to `n * b`. The set
/// is immutable once built and iterates in ascending key order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionSet {
    levels: usize,
    barrier: f64,
    conditions: BTreeMap<i32, BarrierCondition>,
}

impl ConditionSet {
    pub fn new(levels: usize, barrier: f64) -> Result<Self> {
        if levels < 1 {
            return Err(BarrierError::InvalidArgument(
                "Level count must be at least 1".to_string(),
            ));
        }
        if i32::try_from(levels).is_err() {
            return Err(BarrierError::InvalidArgument(format!(
                "Level count {} exceeds the largest label key",
                levels
            )));
        }
        if !barrier.is_finite() {
            return Err(BarrierError::InvalidArgument(format!(
                "Barrier must be finite, got {}",
                barrier
            )));
        }
        if barrier <= 0.0 {
            // Zero collapses every level to a sign test; negative inverts nesting.
            log::warn!(
                "Non-positive barrier {} degrades level nesting across {} levels",
                barrier,
                levels
            );
        }

        let generated = Self::generate_conditions(levels as u32, barrier);
        Ok(Self {
            levels,
            barrier,
            conditions: Self::sort_conditions(generated),
        })
    }

    pub fn from_config(config: &BarrierConfig) -> Result<Self> {
        Self::new(config.levels, config.barrier)
    }

    fn generate_conditions(levels: u32, barrier: f64) -> Vec<BarrierCondition> {
        let mut generated = Vec::with_capacity(2 * levels as usize);
        for i in 1..=levels {
            generated.push(BarrierCondition::lower(i, barrier));
            generated.push(BarrierCondition::upper(i, barrier));
        }
        generated
    }

    fn sort_conditions(generated: Vec<BarrierCondition>) -> BTreeMap<i32, BarrierCondition> {
        generated
            .into_iter()
            .map(|condition| {
                log::debug!("Level {}: {}", condition.key(), condition);
                (condition.key(), condition)
            })
            .collect()
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn barrier(&self) -> f64 {
        self.barrier
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn get(&self, key: i32) -> Option<&BarrierCondition> {
        self.conditions.get(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = i32> + '_ {
        self.conditions.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &BarrierCondition)> + '_ {
        self.conditions.iter().map(|(key, condition)| (*key, condition))
    }

    /// Most extreme level whose condition holds for `x`.
    ///
    /// Magnitudes are scanned from `n` down to `1`, so crossing level 2 wins
    /// over the level 1 condition that also holds. At equal magnitude the
    /// upper side is tested first; both sides can only hold together when the
    /// barrier is negative.
    pub fn evaluate(&self, x: f64) -> Option<i32> {
        (1..=self.levels as i32).rev().find_map(|magnitude| {
            [magnitude, -magnitude].into_iter().find(|key| {
                self.conditions
                    .get(key)
                    .is_some_and(|condition| condition.holds(x))
            })
        })
    }

    /// Every key whose condition holds for `x`, ascending.
    pub fn all_matches(&self, x: f64) -> Vec<i32> {
        self.iter()
            .filter(|(_, condition)| condition.holds(x))
            .map(|(key, _)| key)
            .collect()
    }

    /// Label for `x`, with `0` when no barrier is crossed.
    pub fn label(&self, x: f64) -> i32 {
        self.evaluate(x).unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a ConditionSet {
    type Item = (&'a i32, &'a BarrierCondition);
    type IntoIter = std::collections::btree_map::Iter<'a, i32, BarrierCondition>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_thresholds() {
        let up = BarrierCondition::upper(2, 0.01);
        let down = BarrierCondition::lower(2, 0.01);

        assert_eq!(up.key(), 2);
        assert_eq!(down.key(), -2);
        assert_eq!(up.threshold(), 0.02);
        assert_eq!(down.threshold(), -0.02);
    }

    #[test]
    fn test_condition_is_strict() {
        let up = BarrierCondition::upper(1, 0.01);
        let down = BarrierCondition::lower(1, 0.01);

        assert!(!up.holds(0.01));
        assert!(up.holds(0.0101));
        assert!(!down.holds(-0.01));
        assert!(down.holds(-0.0101));
    }

    #[test]
    fn test_condition_display() {
        assert_eq!(BarrierCondition::upper(1, 0.01).to_string(), "x > 0.01");
        assert_eq!(BarrierCondition::lower(1, 0.01).to_string(), "x < -0.01");
    }

    #[test]
    fn test_rejects_zero_levels() {
        let result = ConditionSet::new(0, 0.01);
        assert!(matches!(result, Err(BarrierError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_oversized_levels() {
        let result = ConditionSet::new(i32::MAX as usize + 1, 0.01);
        assert!(matches!(result, Err(BarrierError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_non_finite_barrier() {
        assert!(ConditionSet::new(1, f64::NAN).is_err());
        assert!(ConditionSet::new(1, f64::INFINITY).is_err());
        assert!(ConditionSet::new(1, f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_keys_ascending_without_zero() {
        let set = ConditionSet::new(3, 0.01).unwrap();
        let keys: Vec<i32> = set.keys().collect();

        assert_eq!(keys, vec![-3, -2, -1, 1, 2, 3]);
        assert_eq!(set.len(), 6);
        assert!(set.get(0).is_none());
    }

    #[test]
    fn test_label_maps_no_match_to_zero() {
        let set = ConditionSet::new(1, 0.01).unwrap();

        assert_eq!(set.label(0.005), 0);
        assert_eq!(set.label(0.02), 1);
        assert_eq!(set.label(-0.02), -1);
    }

    #[test]
    fn test_zero_barrier_is_sign_test() {
        let set = ConditionSet::new(2, 0.0).unwrap();

        assert_eq!(set.evaluate(0.0), None);
        assert_eq!(set.evaluate(1e-9), Some(2));
        assert_eq!(set.evaluate(-1e-9), Some(-2));
    }

    #[test]
    fn test_negative_barrier_prefers_upper_at_equal_magnitude() {
        // Thresholds flip: level 1 upper is x > -0.01, lower is x < 0.01
        let set = ConditionSet::new(1, -0.01).unwrap();

        assert_eq!(set.all_matches(0.0), vec![-1, 1]);
        assert_eq!(set.evaluate(0.0), Some(1));
    }

    #[test]
    fn test_into_iterator_matches_iter() {
        let set = ConditionSet::new(2, 0.01).unwrap();
        let via_ref: Vec<i32> = (&set).into_iter().map(|(k, _)| *k).collect();
        let via_iter: Vec<i32> = set.iter().map(|(k, _)| k).collect();

        assert_eq!(via_ref, via_iter);
    }
}
