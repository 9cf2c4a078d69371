//! Configuration module for ynab-sensors
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Budget instance settings and their schema migration
//! - Global polling preferences

pub mod paths;
pub mod settings;

pub use paths::SensorPaths;
pub use settings::{
    sanitize_name, AttentionPolicy, BudgetConfig, BudgetOptions, Selection, Settings,
    SettingsOrigin, UnderfundedRule,
};
