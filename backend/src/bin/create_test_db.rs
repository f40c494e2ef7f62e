use std::env;
use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::str::FromStr;

use rusqlite::Connection;
use rust_decimal::Decimal;

use backend::db::{
    initialize, insert_budget, insert_category, insert_transaction, Insert,
};
use common::{
    CategoryName, CategoryType, Currency, NewBudget, NewCategory, NewTransaction, NewUser,
    PasswordHash, RawPassword,
};

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <output_path>", &args[0]);
        exit(1);
    }

    let output_path = Path::new(&args[1]);

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize(&conn)?;

    println!("Creating test user...");

    let password_hash =
        PasswordHash::new(unsafe { RawPassword::new_unchecked("testpass123".to_owned()) })?;

    let user = NewUser {
        email: "test@test.com".parse()?,
        password_hash,
    }
    .insert(&conn)?;

    println!("Creating sample budget and transactions...");

    let budget = insert_budget(
        NewBudget {
            currency: Currency::UAH,
            balance: Decimal::from_str("50000")?,
        },
        user.id(),
        &conn,
    )?;

    let income = insert_category(
        NewCategory {
            name: CategoryName::new("Deposit".to_owned())?,
            category_type: CategoryType::Income,
        },
        user.id(),
        &conn,
    )?;

    let expenses = insert_category(
        NewCategory {
            name: CategoryName::new("Rent".to_owned())?,
            category_type: CategoryType::Expense,
        },
        user.id(),
        &conn,
    )?;

    insert_transaction(
        NewTransaction {
            budget_id: budget.id(),
            category_id: income.id(),
            amount: Decimal::from_str("5000")?,
            notes: "Monthly deposit income".to_owned(),
        },
        user.id(),
        &conn,
    )?;

    insert_transaction(
        NewTransaction {
            budget_id: budget.id(),
            category_id: expenses.id(),
            amount: Decimal::from_str("-10000")?,
            notes: "Monthly rent".to_owned(),
        },
        user.id(),
        &conn,
    )?;

    Ok(())
}
