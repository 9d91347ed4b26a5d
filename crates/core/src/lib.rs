//! Core business logic for SalesDesk.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `division` - Division name canonicalization
//! - `access` - Role-based division scoping
//! - `month` - Calendar months and fiscal ranges
//! - `project` - Project, SPH and post-PO rules
//! - `revenue` - Revenue realization moves
//! - `customer` - Customer input rules
//! - `budget` - Division budgets and realization
//! - `dashboard` - Dashboard filters and KPI math
//! - `export` - Project CSV export layout

pub mod access;
pub mod auth;
pub mod budget;
pub mod customer;
pub mod dashboard;
pub mod division;
pub mod export;
pub mod month;
pub mod project;
pub mod revenue;
