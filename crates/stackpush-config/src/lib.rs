//! Configuration for stackpush
//!
//! - [`ConfigSet`]: layered key/value configuration with source precedence
//! - [`properties`]: `.properties` file reading and writing
//! - [`PipelineContext`]: read-only inputs supplied by the calling pipeline
//! - [`PushSettings`]: orchestrator settings loaded from `stackpush.yml`

pub mod config_set;
pub mod context;
pub mod error;
pub mod properties;
pub mod settings;

pub use config_set::{ConfigEntry, ConfigSet, ConfigSource};
pub use context::{ArtifactCoordinates, PipelineContext};
pub use error::*;
pub use settings::{PushSettings, TemplateSelection, find_settings_file};
