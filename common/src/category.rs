use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DatabaseID, UserID};

#[derive(Debug, Error, Clone, PartialEq)]
#[error("category name cannot be empty")]
pub struct CategoryNameError;

/// The name of a category.
///
/// Names are free text and need not be unique, but must not be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an error if `name` is an empty string.
    pub fn new(name: String) -> Result<Self, CategoryNameError> {
        if name.is_empty() {
            Err(CategoryNameError)
        } else {
            Ok(Self(name))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: String) -> Self {
        Self(name)
    }
}

impl TryFrom<String> for CategoryName {
    type Error = CategoryNameError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{0} is not a category type")]
pub struct ParseCategoryTypeError(pub String);

/// Whether a category collects income or expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryType {
    Income,
    Expense,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => "Income",
            CategoryType::Expense => "Expense",
        }
    }
}

impl FromStr for CategoryType {
    type Err = ParseCategoryTypeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "Income" => Ok(CategoryType::Income),
            "Expense" => Ok(CategoryType::Expense),
            _ => Err(ParseCategoryTypeError(text.to_string())),
        }
    }
}

impl Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A label for grouping transactions, e.g., 'Groceries', 'Rent', 'Wages'.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    id: DatabaseID,
    name: CategoryName,
    category_type: CategoryType,
    user_id: UserID,
    created: DateTime<Utc>,
}

impl Category {
    /// Create a new category.
    ///
    /// Note that this does *not* add the category to the application database.
    pub fn new(
        id: DatabaseID,
        name: CategoryName,
        category_type: CategoryType,
        user_id: UserID,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            category_type,
            user_id,
            created,
        }
    }

    pub fn id(&self) -> DatabaseID {
        self.id
    }

    pub fn name(&self) -> &CategoryName {
        &self.name
    }

    pub fn category_type(&self) -> CategoryType {
        self.category_type
    }

    /// The id of the user that owns the category.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

/// The writable fields for creating a category.
///
/// The owner is not part of this payload; it is always taken from the
/// authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: CategoryName,
    pub category_type: CategoryType,
}

/// The writable fields for a partial category update.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<CategoryName>,
    pub category_type: Option<CategoryType>,
}
