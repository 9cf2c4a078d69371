//! Interactive setup of budget instances
//!
//! Walks the user through token entry, budget choice, refresh options and
//! account/category selection, then saves the instance to the settings.

pub mod prompt;
pub mod steps;
pub mod wizard;

pub use wizard::{configure_budget, SetupArgs, SetupWizard};
