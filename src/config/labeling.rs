use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::BarrierError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarrierConfig {
    pub levels: usize, // barriers generated on each side
    pub barrier: f64,  // e.g., 0.01 = 1% return per level
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            levels: 1,
            barrier: 0.01,
        }
    }
}

impl ConfigSection for BarrierConfig {
    fn section_name() -> &'static str {
        "labeling"
    }

    fn validate(&self) -> Result<(), BarrierError> {
        if self.levels < 1 {
            return Err(BarrierError::Configuration(
                "Level count must be at least 1".to_string()
            ));
        }
        if i32::try_from(self.levels).is_err() {
            return Err(BarrierError::Configuration(format!(
                "Level count {} is too large",
                self.levels
            )));
        }
        if !self.barrier.is_finite() {
            return Err(BarrierError::Configuration(
                "Barrier must be a finite number".to_string()
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        let defaults = Self::default();
        ConfigManifest {
            section: "Labeling".to_string(),
            fields: vec![
                FieldManifest {
                    name: "levels".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(defaults.levels),
                    min: Some(1.0),
                    max: Some(i32::MAX as f64),
                    description: "Number of barrier levels on each side of zero".to_string(),
                },
                FieldManifest {
                    name: "barrier".to_string(),
                    field_type: "float".to_string(),
                    default: serde_json::json!(defaults.barrier),
                    min: Some(0.0),
                    max: None,
                    description: "Return magnitude of one barrier unit".to_string(),
                },
            ],
        }
    }
}
