//! Setup wizard steps
//!
//! Individual steps in the setup wizard flow.

pub mod budget;
pub mod options;
pub mod selection;
pub mod token;

pub use budget::BudgetSetupStep;
pub use options::OptionsSetupStep;
pub use selection::SelectionSetupStep;
pub use token::TokenSetupStep;
