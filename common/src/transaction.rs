use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::DatabaseID;

/// An event where money entered or left a budget.
///
/// The sign of `amount` follows the convention income-positive,
/// expense-negative; it is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: DatabaseID,
    amount: Decimal,
    notes: String,
    budget_id: DatabaseID,
    category_id: DatabaseID,
    created: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        id: DatabaseID,
        amount: Decimal,
        notes: String,
        budget_id: DatabaseID,
        category_id: DatabaseID,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            amount,
            notes,
            budget_id,
            category_id,
            created,
        }
    }

    pub fn id(&self) -> DatabaseID {
        self.id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// The budget the transaction belongs to. Immutable after creation;
    /// ownership of a transaction is derived through this budget.
    pub fn budget_id(&self) -> DatabaseID {
        self.budget_id
    }

    pub fn category_id(&self) -> DatabaseID {
        self.category_id
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

/// The writable fields for creating a transaction.
///
/// The referenced budget and category must belong to the caller; the server
/// verifies both before inserting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub budget_id: DatabaseID,
    pub category_id: DatabaseID,
    pub amount: Decimal,
    #[serde(default)]
    pub notes: String,
}

/// The writable fields for a partial transaction update.
///
/// There is no budget field: a transaction cannot be moved between budgets,
/// and a budget id supplied by the client is dropped during deserialization.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TransactionUpdate {
    pub category_id: Option<DatabaseID>,
    pub amount: Option<Decimal>,
    pub notes: Option<String>,
}
