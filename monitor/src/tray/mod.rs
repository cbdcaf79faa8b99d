//! Presentation of the reconciled menu

pub mod dispatch;
pub mod presenter;
