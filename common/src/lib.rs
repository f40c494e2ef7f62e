//! Domain types shared between the API server and its command line tools.

use chrono::{DateTime, Utc};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

mod budget;
mod category;
mod currency;
mod password;
mod transaction;

pub use budget::{Budget, BudgetUpdate, NewBudget};
pub use category::{
    Category, CategoryName, CategoryNameError, CategoryType, CategoryUpdate, NewCategory,
    ParseCategoryTypeError,
};
pub use currency::{Currency, ParseCurrencyError};
pub use password::{PasswordError, PasswordHash, RawPassword};
pub use transaction::{NewTransaction, Transaction, TransactionUpdate};

/// The integer type used for database row ids.
pub type DatabaseID = i64;

/// The id of a registered user.
///
/// This is a distinct type from [DatabaseID] so that a user id cannot be
/// accidentally swapped with a resource id in an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserID(i64);

impl UserID {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// A user of the application.
///
/// This type deliberately does not implement `Serialize`: the password hash
/// must never leave the server. Use [User::profile] for responses.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserID,
    email: EmailAddress,
    password_hash: PasswordHash,
    is_active: bool,
    is_staff: bool,
    created: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: UserID,
        email: EmailAddress,
        password_hash: PasswordHash,
        is_active: bool,
        is_staff: bool,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            is_active,
            is_staff,
            created,
        }
    }

    pub fn id(&self) -> UserID {
        self.id
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Whether the user may sign in. Accounts are deactivated instead of
    /// deleted.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// The view of the user that is safe to send to clients.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
        }
    }
}

/// The data for creating a new user record.
#[derive(Debug)]
pub struct NewUser {
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
}

/// The client-facing view of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: EmailAddress,
}
