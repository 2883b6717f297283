//! Library crate for user-manager.
//!
//! This crate exposes the building blocks of the TUI:
//! - Remote listing and validation services (`api`)
//! - Application state, keymap and update loop (`app`)
//! - Command line and on-disk settings (`config`)
//! - Error and result types (`error`)
//! - Login, add and edit form controllers (`forms`)
//! - The user record (`model`)
//! - Ordering, search and paging of the list (`search`)
//! - The local JSON slot for created and edited users (`storage`)
//! - The in-memory user list (`store`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `user-manager` binary and by tests.
#![deny(rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod forms;
pub mod model;
pub mod search;
pub mod storage;
pub mod store;
pub mod ui;

/// Convenient error and result types shared across the crate.
pub use error::{DynError, Result};
