//! Database table modules
//!
//! Each module contains `impl Database` blocks for a specific table or related tables.

mod auth_sessions;
mod categories;
mod category_links;
mod pages;
