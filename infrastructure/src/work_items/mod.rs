//! Work-item tracking adapters

mod ado;

pub use ado::AdoWorkItems;
