//! Division budgets and their realization.

pub mod error;
pub mod service;
pub mod types;


pub use error::BudgetError;
pub use service::BudgetService;
pub use types::{
    BudgetSummary, CreateBudgetInput, CreateRealizationInput, UpdateBudgetInput,
    UpdateRealizationInput, ValidBudget,
};
