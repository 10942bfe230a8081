pub mod traits;
pub mod labeling;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use labeling::BarrierConfig;
pub use traits::{ConfigSection, ConfigManifest, FieldManifest};
