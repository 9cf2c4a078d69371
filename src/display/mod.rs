//! Display formatting for terminal output
//!
//! Plain-text tables for snapshots, poll status and sensors.

pub mod account;
pub mod budget;
pub mod category;
pub mod status;

pub use account::format_account_list;
pub use budget::{format_available_budgets, format_budget_list};
pub use category::{format_attention_list, format_category_table};
pub use status::{format_sensor_list, format_status, format_summary};
