//! Expense tracking.
//!
//! This module contains everything related to expenses:
//! - The `Expense` model and `NewExpense` for validated, unsaved expenses
//! - Database functions for storing, querying, deleting and totalling expenses
//! - Route handlers for the expense and totals endpoints

mod create_endpoint;
mod delete_endpoint;
mod domain;
mod list_endpoint;
mod query;
mod totals;

pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use domain::{Expense, ExpenseId, create_expense_table};
pub use list_endpoint::list_expenses_endpoint;
pub use totals::{UserTotal, UserTotals, get_user_totals_endpoint};
