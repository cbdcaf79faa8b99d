//! Platform credentials

pub mod credentials;
