//! Settings subsystem: typed definitions, a frozen registry, and a caching service
//!
//! # Architecture
//!
//! - **Types** (`types.rs`): Setting definitions and the registry
//! - **Service** (`service.rs`): SettingsService with caching, validation and permission checks
//!
//! Values resolve as stored value -> registered default.

pub mod service;
pub mod types;

pub use service::SettingsService;
pub use types::{
	FrozenSettingsRegistry, Setting, SettingDefinition, SettingDefinitionBuilder, SettingValue,
	SettingsRegistry,
};

// vim: ts=4
