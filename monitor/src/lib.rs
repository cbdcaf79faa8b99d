//! pzdeploys
//!
//! Watches Render and Vercel for builds in progress and mirrors them into a
//! tray menu. Two independent pollers feed one menu state; every snapshot from
//! either platform rebuilds the whole menu.

pub mod app;
pub mod authn;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod menu;
pub mod models;
pub mod sources;
pub mod storage;
pub mod tray;
pub mod utils;
pub mod workers;
