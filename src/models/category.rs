//! Category snapshot model
//!
//! Categories carry assigned (budgeted) funds, spending activity and an
//! optional goal. Goal-derived fields are `Option` so that "no goal" is
//! distinguishable from "goal met".

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::money::Milliunits;

/// Suffix appended to the display name of a hidden category
pub const HIDDEN_SUFFIX: &str = " (Hidden)";

/// Type of a YNAB category goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GoalType {
    /// Target category balance
    TargetBalance,
    /// Target category balance by date
    TargetBalanceByDate,
    /// Monthly funding
    MonthlyFunding,
    /// Plan your spending
    Need,
    /// Debt payoff
    Debt,
    /// A goal type this crate does not know yet, kept verbatim
    Other(String),
}

impl GoalType {
    /// Parse the API's goal type code
    pub fn parse(s: &str) -> Self {
        match s {
            "TB" => Self::TargetBalance,
            "TBD" => Self::TargetBalanceByDate,
            "MF" => Self::MonthlyFunding,
            "NEED" => Self::Need,
            "DEBT" => Self::Debt,
            other => Self::Other(other.to_string()),
        }
    }

    /// The API's goal type code
    pub fn code(&self) -> &str {
        match self {
            Self::TargetBalance => "TB",
            Self::TargetBalanceByDate => "TBD",
            Self::MonthlyFunding => "MF",
            Self::Need => "NEED",
            Self::Debt => "DEBT",
            Self::Other(code) => code,
        }
    }
}

impl From<String> for GoalType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<GoalType> for String {
    fn from(g: GoalType) -> Self {
        g.code().to_string()
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Why a category needs attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttentionReason {
    Overspent,
    Underfunded,
    Ok,
}

impl AttentionReason {
    pub fn needs_attention(&self) -> bool {
        !matches!(self, Self::Ok)
    }
}

impl fmt::Display for AttentionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overspent => write!(f, "Overspent"),
            Self::Underfunded => write!(f, "Underfunded"),
            Self::Ok => write!(f, "Ok"),
        }
    }
}

/// Goal details of a category that has a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal_type: GoalType,

    /// Target amount; zero when the goal has no explicit target
    pub target: Milliunits,

    /// Percentage complete, 0-100
    pub percentage_complete: Decimal,

    /// Amount still needed to reach the goal
    pub overall_left: Milliunits,
}

/// A normalized category, as published in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub id: CategoryId,

    /// Display name, with [`HIDDEN_SUFFIX`] when hidden
    pub name: String,

    /// Name of the parent category group
    pub group_name: String,

    pub budgeted: Milliunits,

    /// Signed; negative values are spending
    pub activity: Milliunits,

    /// Always `budgeted + activity`
    pub balance: Milliunits,

    /// `None` when the category has no goal
    pub goal: Option<GoalProgress>,

    /// Share of the budgeted amount already spent, 0-100
    pub percentage_spent: Decimal,

    pub attention_reason: AttentionReason,

    pub hidden: bool,
}

impl CategorySnapshot {
    pub fn needs_attention(&self) -> bool {
        self.attention_reason.needs_attention()
    }

    pub fn goal_type(&self) -> Option<&GoalType> {
        self.goal.as_ref().map(|g| &g.goal_type)
    }

    pub fn goal_target(&self) -> Option<Milliunits> {
        self.goal.as_ref().map(|g| g.target)
    }

    pub fn goal_percentage_complete(&self) -> Option<Decimal> {
        self.goal.as_ref().map(|g| g.percentage_complete)
    }

    pub fn goal_overall_left(&self) -> Option<Milliunits> {
        self.goal.as_ref().map(|g| g.overall_left)
    }
}

impl fmt::Display for CategorySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
