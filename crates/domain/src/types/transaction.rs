//! Income and expense transactions
//!
//! Wire enums use the backend's upper-case identifiers. Translating them into
//! display labels is a presentation concern and lives outside this crate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    /// Unknown types are read as expenses
    #[serde(other)]
    Expense,
}

impl_wire_enum_conversions!(TransactionType {
    Income => "INCOME",
    Expense => "EXPENSE",
});

/// Expense category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Housing,
    Communication,
    Medical,
    Leisure,
    Education,
    Saving,
    Event,
    #[default]
    #[serde(other)]
    Etc,
}

impl_wire_enum_conversions!(Category {
    Food => "FOOD",
    Transport => "TRANSPORT",
    Shopping => "SHOPPING",
    Housing => "HOUSING",
    Communication => "COMMUNICATION",
    Medical => "MEDICAL",
    Leisure => "LEISURE",
    Education => "EDUCATION",
    Saving => "SAVING",
    Event => "EVENT",
    Etc => "ETC",
});

/// Transaction as returned by the list, daily and detail endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub title: String,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Always `None` for income
    #[serde(default)]
    pub category: Option<Category>,
    pub date: NaiveDate,
    /// Older backend builds send this field as `MEMO`
    #[serde(default, alias = "MEMO")]
    pub memo: Option<String>,
}

impl Transaction {
    /// Amount with sign applied (income positive, expense negative)
    #[must_use]
    pub const fn signed_amount(&self) -> i64 {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// A transaction to create or edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub title: String,
    pub memo: Option<String>,
    pub amount: i64,
    pub date: NaiveDate,
    pub kind: TransactionType,
    pub category: Option<Category>,
}

impl NewTransaction {
    /// An expense in the given category
    #[must_use]
    pub fn expense(title: impl Into<String>, amount: i64, date: NaiveDate, category: Category) -> Self {
        Self {
            title: title.into(),
            memo: None,
            amount,
            date,
            kind: TransactionType::Expense,
            category: Some(category),
        }
    }

    /// An income entry
    #[must_use]
    pub fn income(title: impl Into<String>, amount: i64, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            memo: None,
            amount,
            date,
            kind: TransactionType::Income,
            category: None,
        }
    }

    /// Attach a memo
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Request body for `/transaction/write` and `/transaction/edit/{id}`
    ///
    /// The category is only sent for expenses and defaults to `ETC`; the memo
    /// is always present (empty when unset).
    #[must_use]
    pub fn body(&self) -> TransactionBody<'_> {
        TransactionBody {
            title: &self.title,
            memo: self.memo.as_deref().unwrap_or_default(),
            amount: self.amount,
            date: self.date,
            kind: self.kind,
            category: match self.kind {
                TransactionType::Expense => Some(self.category.unwrap_or_default()),
                TransactionType::Income => None,
            },
        }
    }
}

/// Wire form of [`NewTransaction`]
#[derive(Debug, Clone, Serialize)]
pub struct TransactionBody<'a> {
    pub title: &'a str,
    pub memo: &'a str,
    pub amount: i64,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}
