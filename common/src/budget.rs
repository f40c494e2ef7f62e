use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Currency, DatabaseID, UserID};

/// A pot of money held in a single currency.
///
/// New instances should be created through the database layer so that the id
/// and creation time come from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    id: DatabaseID,
    currency: Currency,
    balance: Decimal,
    user_id: UserID,
    created: DateTime<Utc>,
}

impl Budget {
    pub fn new(
        id: DatabaseID,
        currency: Currency,
        balance: Decimal,
        user_id: UserID,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            currency,
            balance,
            user_id,
            created,
        }
    }

    pub fn id(&self) -> DatabaseID {
        self.id
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// The id of the user that owns the budget. Immutable after creation.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

/// The writable fields for creating a budget.
///
/// The owner is not part of this payload; it is always taken from the
/// authenticated caller, and an owner field supplied by the client is
/// dropped during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBudget {
    pub currency: Currency,
    /// Defaults to zero when omitted.
    #[serde(default)]
    pub balance: Decimal,
}

/// The writable fields for a partial budget update.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BudgetUpdate {
    pub currency: Option<Currency>,
    pub balance: Option<Decimal>,
}
