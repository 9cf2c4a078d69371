//! Account snapshot model
//!
//! One normalized record per selected YNAB account (checking, savings,
//! credit cards, loans, ...), rebuilt wholesale on every refresh.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::AccountId;
use super::money::Milliunits;

/// Type of a YNAB account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountType {
    Checking,
    Savings,
    Cash,
    CreditCard,
    LineOfCredit,
    OtherAsset,
    OtherLiability,
    Mortgage,
    AutoLoan,
    StudentLoan,
    PersonalLoan,
    MedicalDebt,
    OtherDebt,
    /// A type this crate does not know yet, kept verbatim
    Unknown(String),
}

impl AccountType {
    /// Parse the API's camelCase type name
    pub fn parse(s: &str) -> Self {
        match s {
            "checking" => Self::Checking,
            "savings" => Self::Savings,
            "cash" => Self::Cash,
            "creditCard" => Self::CreditCard,
            "lineOfCredit" => Self::LineOfCredit,
            "otherAsset" => Self::OtherAsset,
            "otherLiability" => Self::OtherLiability,
            "mortgage" => Self::Mortgage,
            "autoLoan" => Self::AutoLoan,
            "studentLoan" => Self::StudentLoan,
            "personalLoan" => Self::PersonalLoan,
            "medicalDebt" => Self::MedicalDebt,
            "otherDebt" => Self::OtherDebt,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The API's camelCase type name
    pub fn api_name(&self) -> &str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Cash => "cash",
            Self::CreditCard => "creditCard",
            Self::LineOfCredit => "lineOfCredit",
            Self::OtherAsset => "otherAsset",
            Self::OtherLiability => "otherLiability",
            Self::Mortgage => "mortgage",
            Self::AutoLoan => "autoLoan",
            Self::StudentLoan => "studentLoan",
            Self::PersonalLoan => "personalLoan",
            Self::MedicalDebt => "medicalDebt",
            Self::OtherDebt => "otherDebt",
            Self::Unknown(name) => name,
        }
    }

    /// Returns true for debt-like accounts whose balance is normally negative
    pub fn is_liability(&self) -> bool {
        matches!(
            self,
            Self::CreditCard
                | Self::LineOfCredit
                | Self::OtherLiability
                | Self::Mortgage
                | Self::AutoLoan
                | Self::StudentLoan
                | Self::PersonalLoan
                | Self::MedicalDebt
                | Self::OtherDebt
        )
    }

    /// Accounts with a user-entered credit limit
    pub fn has_credit_limit(&self) -> bool {
        matches!(self, Self::CreditCard | Self::LineOfCredit)
    }

    /// Accounts with a user-entered APR and payment due day
    pub fn has_repayment_terms(&self) -> bool {
        matches!(self, Self::CreditCard | Self::PersonalLoan)
    }

    /// Icon used by the account sensor
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Checking => "mdi:bank",
            Self::Savings => "mdi:piggy-bank",
            Self::Cash => "mdi:cash",
            Self::CreditCard | Self::LineOfCredit => "mdi:credit-card",
            Self::Mortgage => "mdi:home-city",
            Self::AutoLoan => "mdi:car",
            Self::StudentLoan => "mdi:school",
            Self::MedicalDebt => "mdi:hospital-box",
            Self::OtherAsset => "mdi:chart-line",
            Self::OtherLiability | Self::PersonalLoan | Self::OtherDebt => "mdi:cash-minus",
            Self::Unknown(_) => "mdi:bank-outline",
        }
    }
}

impl From<String> for AccountType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<AccountType> for String {
    fn from(t: AccountType) -> Self {
        t.api_name().to_string()
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checking => write!(f, "Checking"),
            Self::Savings => write!(f, "Savings"),
            Self::Cash => write!(f, "Cash"),
            Self::CreditCard => write!(f, "Credit Card"),
            Self::LineOfCredit => write!(f, "Line of Credit"),
            Self::OtherAsset => write!(f, "Tracking Asset"),
            Self::OtherLiability => write!(f, "Tracking Liability"),
            Self::Mortgage => write!(f, "Mortgage"),
            Self::AutoLoan => write!(f, "Auto Loan"),
            Self::StudentLoan => write!(f, "Student Loan"),
            Self::PersonalLoan => write!(f, "Personal Loan"),
            Self::MedicalDebt => write!(f, "Medical Debt"),
            Self::OtherDebt => write!(f, "Other Debt"),
            Self::Unknown(name) => write!(f, "{}", name),
        }
    }
}

/// A normalized account, as published in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: AccountId,

    pub name: String,

    /// Total balance (cleared + uncleared)
    pub balance: Milliunits,

    pub cleared_balance: Milliunits,

    pub uncleared_balance: Milliunits,

    /// Off-budget (tracking) accounts don't affect To Be Budgeted
    pub on_budget: bool,

    #[serde(rename = "type")]
    pub account_type: AccountType,

    pub closed: bool,
}

impl fmt::Display for AccountSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
