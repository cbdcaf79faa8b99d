//! Data models

pub mod deploy;
pub mod render;
pub mod vercel;
