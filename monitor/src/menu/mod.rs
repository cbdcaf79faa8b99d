//! Menu reconciliation

pub mod descriptor;
pub mod reconcile;
pub mod state;
