//! SQLite persistence for the application's entities.
//!
//! Every function that reads or writes an owned resource takes the owning
//! user's id and scopes its SQL to it, so a row belonging to another user is
//! indistinguishable from a row that does not exist.

use std::fmt::Display;
use std::str::FromStr;

use chrono::Utc;
use email_address::EmailAddress;
use rusqlite::{Connection, Error, Row, Transaction as SqlTransaction};
use rust_decimal::Decimal;

use common::{
    Budget, BudgetUpdate, Category, CategoryName, CategoryType, CategoryUpdate, Currency,
    DatabaseID, NewBudget, NewCategory, NewTransaction, NewUser, PasswordHash, Transaction,
    TransactionUpdate, User, UserID,
};

use crate::filter::BudgetFilter;

/// Errors originating from operations on the app's database.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DbError {
    /// The user's email already exists in the database. The client should try again with a different email address.
    DuplicateEmail,
    /// A query was given an invalid foreign key. The client should check that the ids are valid.
    InvalidForeignKey,
    /// The row could not be found with the provided info (e.g., id). The client should try again with different parameters.
    NotFound,
    /// Wrapper for Sqlite errors not handled by the other enum entries.
    SqlError(Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SqlError(inner_error) => write!(f, "{:?}: {}", self, inner_error),
            other => write!(f, "{:?}", other),
        }
    }
}

impl From<Error> for DbError {
    fn from(error: Error) -> Self {
        match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 787 => {
                DbError::InvalidForeignKey
            }
            // Code 2067 occurs when a UNIQUE constraint failed.
            Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("email") =>
            {
                DbError::DuplicateEmail
            }
            Error::QueryReturnedNoRows => DbError::NotFound,
            e => DbError::SqlError(e),
        }
    }
}

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), DbError>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a concrete rust type.
pub trait MapRow {
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// **Note:** This function expects that the row object contains all the table columns in the order they were defined.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust type, or if an invalid column index was used.
    fn map_row(row: &Row) -> Result<Self::ReturnType, Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type, reading from the column at `offset`.
    ///
    /// This is useful in cases where tables have been joined and you want to construct two different types from the one query.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, Error>;
}

/// A trait for inserting a record into the application database.
pub trait Insert {
    type ResultType;

    /// Insert the object into the application database.
    ///
    /// # Errors
    ///
    /// This function will return an error if the insertion failed.
    fn insert(self, connection: &Connection) -> Result<Self::ResultType, DbError>;
}

/// A trait for retrieving records from the application database by a field of type `T`.
pub trait SelectBy<T> {
    type ResultType;

    /// Select records from the application database that match `field`.
    fn select(field: T, connection: &Connection) -> Result<Self::ResultType, DbError>;
}

fn decimal_from_row(row: &Row, index: usize) -> Result<Decimal, Error> {
    let text: String = row.get(index)?;

    Decimal::from_str(&text).map_err(|e| {
        Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn currency_from_row(row: &Row, index: usize) -> Result<Currency, Error> {
    let text: String = row.get(index)?;

    Currency::from_str(&text).map_err(|e| {
        Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn category_type_from_row(row: &Row, index: usize) -> Result<CategoryType, Error> {
    let text: String = row.get(index)?;

    CategoryType::from_str(&text).map_err(|e| {
        Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl CreateTable for User {
    fn create_table(connection: &Connection) -> Result<(), DbError> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user (
                    id INTEGER PRIMARY KEY,
                    email TEXT UNIQUE NOT NULL,
                    password TEXT NOT NULL,
                    is_active INTEGER NOT NULL,
                    is_staff INTEGER NOT NULL,
                    created TEXT NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for User {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self, Error> {
        let id = UserID::new(row.get(offset)?);

        let raw_email: String = row.get(offset + 1)?;
        let email = EmailAddress::new_unchecked(raw_email);

        // SAFETY: the hash column is only ever written from a `PasswordHash`.
        let password_hash = unsafe { PasswordHash::new_unchecked(row.get(offset + 2)?) };

        Ok(Self::new(
            id,
            email,
            password_hash,
            row.get(offset + 3)?,
            row.get(offset + 4)?,
            row.get(offset + 5)?,
        ))
    }
}

impl Insert for NewUser {
    type ResultType = User;

    /// Create a new user in the database.
    ///
    /// New users start active and without staff rights.
    ///
    /// # Errors
    /// This function will return an error if the email is already in use, or
    /// if there was a problem executing the SQL query.
    fn insert(self, connection: &Connection) -> Result<Self::ResultType, DbError> {
        let created = Utc::now();

        connection.execute(
            "INSERT INTO user (email, password, is_active, is_staff, created) VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                self.email.to_string(),
                self.password_hash.to_string(),
                true,
                false,
                created,
            ),
        )?;

        let id = UserID::new(connection.last_insert_rowid());

        Ok(User::new(
            id,
            self.email,
            self.password_hash,
            true,
            false,
            created,
        ))
    }
}

impl SelectBy<&EmailAddress> for User {
    type ResultType = User;

    /// Get the user from the database that has the specified `email` address.
    ///
    /// # Errors
    /// Returns [DbError::NotFound] if there is no user with that email, or an
    /// error for SQL related failures.
    fn select(email: &EmailAddress, connection: &Connection) -> Result<Self::ResultType, DbError> {
        connection
            .prepare(
                "SELECT id, email, password, is_active, is_staff, created
                FROM user WHERE email = :email",
            )?
            .query_row(&[(":email", &email.to_string())], User::map_row)
            .map_err(|e| e.into())
    }
}

impl SelectBy<UserID> for User {
    type ResultType = User;

    /// Get the user from the database that has the specified id.
    ///
    /// # Errors
    /// Returns [DbError::NotFound] if there is no such user, or an error for
    /// SQL related failures.
    fn select(id: UserID, connection: &Connection) -> Result<Self::ResultType, DbError> {
        connection
            .prepare(
                "SELECT id, email, password, is_active, is_staff, created
                FROM user WHERE id = :id",
            )?
            .query_row(&[(":id", &id.as_i64())], User::map_row)
            .map_err(|e| e.into())
    }
}

/// Update a user's email and/or password hash. Fields passed as `None` are
/// left unchanged.
///
/// # Errors
/// Returns [DbError::NotFound] if `user_id` does not refer to a user, or
/// [DbError::DuplicateEmail] if the new email is taken by another user.
pub fn update_user(
    user_id: UserID,
    email: Option<EmailAddress>,
    password_hash: Option<PasswordHash>,
    connection: &Connection,
) -> Result<User, DbError> {
    let user = User::select(user_id, connection)?;

    let email = email.unwrap_or_else(|| user.email().to_owned());
    let password_hash = password_hash.unwrap_or_else(|| user.password_hash().to_owned());

    connection.execute(
        "UPDATE user SET email = ?1, password = ?2 WHERE id = ?3",
        (email.to_string(), password_hash.to_string(), user_id.as_i64()),
    )?;

    Ok(User::new(
        user_id,
        email,
        password_hash,
        user.is_active(),
        user.is_staff(),
        user.created(),
    ))
}

impl CreateTable for Budget {
    fn create_table(connection: &Connection) -> Result<(), DbError> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS budget (
                    id INTEGER PRIMARY KEY,
                    currency TEXT NOT NULL,
                    balance TEXT NOT NULL,
                    user_id INTEGER NOT NULL,
                    created TEXT NOT NULL,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for Budget {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self, Error> {
        Ok(Self::new(
            row.get(offset)?,
            currency_from_row(row, offset + 1)?,
            decimal_from_row(row, offset + 2)?,
            UserID::new(row.get(offset + 3)?),
            row.get(offset + 4)?,
        ))
    }
}

/// Create a new budget owned by `user_id`.
///
/// The owner always comes from the authenticated caller, never from the
/// request payload.
///
/// # Errors
/// This function will return an error if `user_id` does not refer to a valid
/// user, or there is some other SQL error.
pub fn insert_budget(
    new_budget: NewBudget,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, DbError> {
    let created = Utc::now();

    connection.execute(
        "INSERT INTO budget (currency, balance, user_id, created) VALUES (?1, ?2, ?3, ?4)",
        (
            new_budget.currency.as_str(),
            new_budget.balance.to_string(),
            user_id.as_i64(),
            created,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Budget::new(
        id,
        new_budget.currency,
        new_budget.balance,
        user_id,
        created,
    ))
}

/// Retrieve the budgets owned by `user_id` that satisfy `filter`, newest
/// first.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn select_budgets(
    user_id: UserID,
    filter: &BudgetFilter,
    connection: &Connection,
) -> Result<Vec<Budget>, DbError> {
    connection
        .prepare(
            "SELECT id, currency, balance, user_id, created FROM budget
            WHERE user_id = :user_id
            ORDER BY created DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], Budget::map_row)?
        .filter_map(|maybe_budget| match maybe_budget {
            Ok(budget) if !filter.matches(&budget) => None,
            Ok(budget) => Some(Ok(budget)),
            Err(e) => Some(Err(DbError::SqlError(e))),
        })
        .collect()
}

/// Retrieve a budget by its id, scoped to `user_id`.
///
/// # Errors
/// Returns [DbError::NotFound] if the budget does not exist *or* belongs to
/// another user. The two cases are deliberately indistinguishable.
pub fn select_budget(
    id: DatabaseID,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, DbError> {
    connection
        .prepare(
            "SELECT id, currency, balance, user_id, created FROM budget
            WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((id, user_id.as_i64()), Budget::map_row)
        .map_err(|e| e.into())
}

/// Update a budget's writable fields. Fields passed as `None` are left
/// unchanged; the owner cannot be changed.
///
/// # Errors
/// Returns [DbError::NotFound] if the budget does not exist or belongs to
/// another user.
pub fn update_budget(
    id: DatabaseID,
    user_id: UserID,
    changes: BudgetUpdate,
    connection: &Connection,
) -> Result<Budget, DbError> {
    let budget = select_budget(id, user_id, connection)?;

    let currency = changes.currency.unwrap_or(budget.currency());
    let balance = changes.balance.unwrap_or(budget.balance());

    connection.execute(
        "UPDATE budget SET currency = ?1, balance = ?2 WHERE id = ?3 AND user_id = ?4",
        (currency.as_str(), balance.to_string(), id, user_id.as_i64()),
    )?;

    Ok(Budget::new(id, currency, balance, user_id, budget.created()))
}

/// Delete a budget and, through the schema's cascade, its transactions.
///
/// # Errors
/// Returns [DbError::NotFound] if the budget does not exist or belongs to
/// another user, including when it was already deleted.
pub fn delete_budget(
    id: DatabaseID,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), DbError> {
    let rows_deleted = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_deleted == 0 {
        Err(DbError::NotFound)
    } else {
        Ok(())
    }
}

impl CreateTable for Category {
    fn create_table(connection: &Connection) -> Result<(), DbError> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS category (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    category_type TEXT NOT NULL,
                    user_id INTEGER NOT NULL,
                    created TEXT NOT NULL,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for Category {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self, Error> {
        let raw_name: String = row.get(offset + 1)?;

        Ok(Self::new(
            row.get(offset)?,
            CategoryName::new_unchecked(raw_name),
            category_type_from_row(row, offset + 2)?,
            UserID::new(row.get(offset + 3)?),
            row.get(offset + 4)?,
        ))
    }
}

/// Create a new category owned by `user_id`.
///
/// # Errors
/// This function will return an error if `user_id` does not refer to a valid
/// user, or there is some other SQL error.
pub fn insert_category(
    new_category: NewCategory,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, DbError> {
    let created = Utc::now();

    connection.execute(
        "INSERT INTO category (name, category_type, user_id, created) VALUES (?1, ?2, ?3, ?4)",
        (
            new_category.name.as_ref(),
            new_category.category_type.as_str(),
            user_id.as_i64(),
            created,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category::new(
        id,
        new_category.name,
        new_category.category_type,
        user_id,
        created,
    ))
}

/// Retrieve the categories owned by `user_id`, newest first.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn select_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, DbError> {
    connection
        .prepare(
            "SELECT id, name, category_type, user_id, created FROM category
            WHERE user_id = :user_id
            ORDER BY created DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], Category::map_row)?
        .map(|maybe_category| maybe_category.map_err(DbError::SqlError))
        .collect()
}

/// Retrieve a category by its id, scoped to `user_id`.
///
/// # Errors
/// Returns [DbError::NotFound] if the category does not exist or belongs to
/// another user.
pub fn select_category(
    id: DatabaseID,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, DbError> {
    connection
        .prepare(
            "SELECT id, name, category_type, user_id, created FROM category
            WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((id, user_id.as_i64()), Category::map_row)
        .map_err(|e| e.into())
}

/// Update a category's writable fields. Fields passed as `None` are left
/// unchanged; the owner cannot be changed.
///
/// # Errors
/// Returns [DbError::NotFound] if the category does not exist or belongs to
/// another user.
pub fn update_category(
    id: DatabaseID,
    user_id: UserID,
    changes: CategoryUpdate,
    connection: &Connection,
) -> Result<Category, DbError> {
    let category = select_category(id, user_id, connection)?;

    let name = changes.name.unwrap_or_else(|| category.name().to_owned());
    let category_type = changes.category_type.unwrap_or(category.category_type());

    connection.execute(
        "UPDATE category SET name = ?1, category_type = ?2 WHERE id = ?3 AND user_id = ?4",
        (
            name.as_ref(),
            category_type.as_str(),
            id,
            user_id.as_i64(),
        ),
    )?;

    Ok(Category::new(
        id,
        name,
        category_type,
        user_id,
        category.created(),
    ))
}

/// Delete a category and, through the schema's cascade, its transactions.
///
/// # Errors
/// Returns [DbError::NotFound] if the category does not exist or belongs to
/// another user.
pub fn delete_category(
    id: DatabaseID,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), DbError> {
    let rows_deleted = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_deleted == 0 {
        Err(DbError::NotFound)
    } else {
        Ok(())
    }
}

impl CreateTable for Transaction {
    fn create_table(connection: &Connection) -> Result<(), DbError> {
        connection
                .execute(
                    "CREATE TABLE IF NOT EXISTS \"transaction\" (
                            id INTEGER PRIMARY KEY,
                            amount TEXT NOT NULL,
                            notes TEXT NOT NULL,
                            budget_id INTEGER NOT NULL,
                            category_id INTEGER NOT NULL,
                            created TEXT NOT NULL,
                            FOREIGN KEY(budget_id) REFERENCES budget(id) ON UPDATE CASCADE ON DELETE CASCADE,
                            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
                            )",
                    (),
                )?;

        Ok(())
    }
}

impl MapRow for Transaction {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self, Error> {
        Ok(Self::new(
            row.get(offset)?,
            decimal_from_row(row, offset + 1)?,
            row.get(offset + 2)?,
            row.get(offset + 3)?,
            row.get(offset + 4)?,
            row.get(offset + 5)?,
        ))
    }
}

/// Create a new transaction against one of the caller's budgets.
///
/// Ownership of a transaction is derived through its budget, so both the
/// referenced budget and category must belong to `user_id`.
///
/// # Errors
/// Returns [DbError::NotFound] if the referenced budget or category does not
/// exist or belongs to another user. The response does not reveal which.
pub fn insert_transaction(
    new_transaction: NewTransaction,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, DbError> {
    select_budget(new_transaction.budget_id, user_id, connection)?;
    select_category(new_transaction.category_id, user_id, connection)?;

    let created = Utc::now();

    connection.execute(
        "INSERT INTO \"transaction\" (amount, notes, budget_id, category_id, created) VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            new_transaction.amount.to_string(),
            &new_transaction.notes,
            new_transaction.budget_id,
            new_transaction.category_id,
            created,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction::new(
        id,
        new_transaction.amount,
        new_transaction.notes,
        new_transaction.budget_id,
        new_transaction.category_id,
        created,
    ))
}

/// Retrieve the transactions in the budgets owned by `user_id`, newest first.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn select_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, DbError> {
    connection
        .prepare(
            "SELECT t.id, t.amount, t.notes, t.budget_id, t.category_id, t.created
            FROM \"transaction\" t
            INNER JOIN budget b ON t.budget_id = b.id
            WHERE b.user_id = :user_id
            ORDER BY t.created DESC, t.id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], Transaction::map_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(DbError::SqlError))
        .collect()
}

/// Retrieve a transaction by its id, scoped through its budget to `user_id`.
///
/// # Errors
/// Returns [DbError::NotFound] if the transaction does not exist or its
/// budget belongs to another user.
pub fn select_transaction(
    id: DatabaseID,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, DbError> {
    connection
        .prepare(
            "SELECT t.id, t.amount, t.notes, t.budget_id, t.category_id, t.created
            FROM \"transaction\" t
            INNER JOIN budget b ON t.budget_id = b.id
            WHERE t.id = ?1 AND b.user_id = ?2",
        )?
        .query_row((id, user_id.as_i64()), Transaction::map_row)
        .map_err(|e| e.into())
}

/// Update a transaction's writable fields. Fields passed as `None` are left
/// unchanged; the budget reference cannot be changed.
///
/// # Errors
/// Returns [DbError::NotFound] if the transaction is not reachable through
/// the caller's budgets, or if a new `category_id` does not refer to one of
/// the caller's categories.
pub fn update_transaction(
    id: DatabaseID,
    user_id: UserID,
    changes: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, DbError> {
    let transaction = select_transaction(id, user_id, connection)?;

    let category_id = match changes.category_id {
        Some(category_id) => {
            select_category(category_id, user_id, connection)?;
            category_id
        }
        None => transaction.category_id(),
    };
    let amount = changes.amount.unwrap_or(transaction.amount());
    let notes = changes.notes.unwrap_or_else(|| transaction.notes().to_owned());

    connection.execute(
        "UPDATE \"transaction\" SET amount = ?1, notes = ?2, category_id = ?3 WHERE id = ?4",
        (amount.to_string(), &notes, category_id, id),
    )?;

    Ok(Transaction::new(
        id,
        amount,
        notes,
        transaction.budget_id(),
        category_id,
        transaction.created(),
    ))
}

/// Delete a transaction, scoped through its budget to `user_id`.
///
/// # Errors
/// Returns [DbError::NotFound] if the transaction is not reachable through
/// the caller's budgets, including when it was already deleted.
pub fn delete_transaction(
    id: DatabaseID,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), DbError> {
    let rows_deleted = connection.execute(
        "DELETE FROM \"transaction\"
        WHERE id = ?1 AND budget_id IN (SELECT id FROM budget WHERE user_id = ?2)",
        (id, user_id.as_i64()),
    )?;

    if rows_deleted == 0 {
        Err(DbError::NotFound)
    } else {
        Ok(())
    }
}

/// Create the application's tables and enable foreign key enforcement.
///
/// Safe to call on a database that already has the schema.
pub fn initialize(connection: &Connection) -> Result<(), DbError> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    User::create_table(&transaction)?;
    Budget::create_table(&transaction)?;
    Category::create_table(&transaction)?;
    Transaction::create_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod user_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use common::{NewUser, PasswordHash, User, UserID};

    use super::{initialize, update_user, DbError, Insert, SelectBy};

    fn init_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn test_password_hash() -> PasswordHash {
        unsafe { PasswordHash::new_unchecked("definitelyapasswordhash".to_string()) }
    }

    #[test]
    fn insert_user_succeeds() {
        let conn = init_db();

        let email = EmailAddress::from_str("hello@world.com").unwrap();
        let password_hash = test_password_hash();

        let inserted_user = NewUser {
            email: email.clone(),
            password_hash: password_hash.clone(),
        }
        .insert(&conn)
        .unwrap();

        assert!(inserted_user.id().as_i64() > 0);
        assert_eq!(inserted_user.email(), &email);
        assert_eq!(inserted_user.password_hash(), &password_hash);
        assert!(inserted_user.is_active());
        assert!(!inserted_user.is_staff());
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let conn = init_db();

        let email = EmailAddress::from_str("hello@world.com").unwrap();

        assert!(NewUser {
            email: email.clone(),
            password_hash: test_password_hash(),
        }
        .insert(&conn)
        .is_ok());

        assert_eq!(
            NewUser {
                email,
                password_hash: test_password_hash(),
            }
            .insert(&conn),
            Err(DbError::DuplicateEmail)
        );
    }

    #[test]
    fn select_user_fails_with_non_existent_email() {
        let conn = init_db();

        let email = EmailAddress::from_str("notavalidemail@foo.bar").unwrap();

        assert_eq!(User::select(&email, &conn), Err(DbError::NotFound));
    }

    #[test]
    fn select_user_by_id_succeeds() {
        let conn = init_db();

        let test_user = NewUser {
            email: EmailAddress::from_str("foo@bar.baz").unwrap(),
            password_hash: test_password_hash(),
        }
        .insert(&conn)
        .unwrap();

        let retrieved_user = User::select(test_user.id(), &conn).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn update_user_changes_email_only() {
        let conn = init_db();

        let test_user = NewUser {
            email: EmailAddress::from_str("foo@bar.baz").unwrap(),
            password_hash: test_password_hash(),
        }
        .insert(&conn)
        .unwrap();

        let new_email = EmailAddress::from_str("bar@baz.qux").unwrap();
        let updated_user =
            update_user(test_user.id(), Some(new_email.clone()), None, &conn).unwrap();

        assert_eq!(updated_user.email(), &new_email);
        assert_eq!(updated_user.password_hash(), test_user.password_hash());
        assert_eq!(User::select(test_user.id(), &conn).unwrap(), updated_user);
    }

    #[test]
    fn update_user_fails_on_unknown_id() {
        let conn = init_db();

        let result = update_user(UserID::new(1337), None, None, &conn);

        assert_eq!(result, Err(DbError::NotFound));
    }
}


#[cfg(test)]
mod category_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use common::{CategoryName, CategoryType, CategoryUpdate, NewCategory, NewUser, PasswordHash, User};

    use super::{
        delete_category, initialize, insert_category, select_categories, select_category,
        update_category, DbError, Insert,
    };

    fn create_database_and_insert_test_user() -> (Connection, User) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let test_user = NewUser {
            email: EmailAddress::from_str("foo@bar.baz").unwrap(),
            password_hash: unsafe {
                PasswordHash::new_unchecked("definitelyapasswordhash".to_string())
            },
        }
        .insert(&conn)
        .unwrap();

        (conn, test_user)
    }

    fn new_category(name: &str, category_type: CategoryType) -> NewCategory {
        NewCategory {
            name: CategoryName::new(name.to_string()).unwrap(),
            category_type,
        }
    }

    #[test]
    fn insert_category_succeeds() {
        let (conn, test_user) = create_database_and_insert_test_user();

        let category = insert_category(
            new_category("Deposit", CategoryType::Income),
            test_user.id(),
            &conn,
        )
        .unwrap();

        assert!(category.id() > 0);
        assert_eq!(category.name().as_ref(), "Deposit");
        assert_eq!(category.category_type(), CategoryType::Income);
        assert_eq!(category.user_id(), test_user.id());
    }

    #[test]
    fn select_categories_scoped_to_owner() {
        let (conn, test_user) = create_database_and_insert_test_user();

        let other_user = NewUser {
            email: EmailAddress::from_str("bar@baz.qux").unwrap(),
            password_hash: unsafe {
                PasswordHash::new_unchecked("anotherpasswordhash".to_string())
            },
        }
        .insert(&conn)
        .unwrap();

        insert_category(
            new_category("Rent", CategoryType::Expense),
            other_user.id(),
            &conn,
        )
        .unwrap();
        let own_category = insert_category(
            new_category("Spotify Premium", CategoryType::Expense),
            test_user.id(),
            &conn,
        )
        .unwrap();

        let categories = select_categories(test_user.id(), &conn).unwrap();

        assert_eq!(categories, vec![own_category]);
    }

    #[test]
    fn duplicate_category_names_are_permitted() {
        let (conn, test_user) = create_database_and_insert_test_user();

        let first = insert_category(
            new_category("Groceries", CategoryType::Expense),
            test_user.id(),
            &conn,
        )
        .unwrap();
        let second = insert_category(
            new_category("Groceries", CategoryType::Expense),
            test_user.id(),
            &conn,
        )
        .unwrap();

        assert_ne!(first.id(), second.id());
        assert_eq!(first.name(), second.name());
    }

    #[test]
    fn update_category_changes_name() {
        let (conn, test_user) = create_database_and_insert_test_user();

        let category = insert_category(
            new_category("Spotify Premium", CategoryType::Expense),
            test_user.id(),
            &conn,
        )
        .unwrap();

        let updated_category = update_category(
            category.id(),
            test_user.id(),
            CategoryUpdate {
                name: Some(CategoryName::new("YouTube Premium".to_string()).unwrap()),
                category_type: None,
            },
            &conn,
        )
        .unwrap();

        assert_eq!(updated_category.name().as_ref(), "YouTube Premium");
        assert_eq!(updated_category.category_type(), CategoryType::Expense);
        assert_eq!(
            select_category(category.id(), test_user.id(), &conn).unwrap(),
            updated_category
        );
    }

    #[test]
    fn delete_category_fails_for_non_owner() {
        let (conn, test_user) = create_database_and_insert_test_user();

        let other_user = NewUser {
            email: EmailAddress::from_str("bar@baz.qux").unwrap(),
            password_hash: unsafe {
                PasswordHash::new_unchecked("anotherpasswordhash".to_string())
            },
        }
        .insert(&conn)
        .unwrap();

        let category = insert_category(
            new_category("Rent", CategoryType::Expense),
            test_user.id(),
            &conn,
        )
        .unwrap();

        assert_eq!(
            delete_category(category.id(), other_user.id(), &conn),
            Err(DbError::NotFound)
        );
        assert!(select_category(category.id(), test_user.id(), &conn).is_ok());
    }
}
