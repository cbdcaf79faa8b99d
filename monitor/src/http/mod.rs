//! Platform API clients

pub mod client;
pub mod render;
pub mod vercel;
