//! # Core Application Logic
//!
//! This module contains refgen's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Record (typed data)  │
//!                    │  • Model (CRUD)         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │   Store    │      │   Export   │
//!     │  Adapter   │      │ (SQLite /  │      │ (template  │
//!     │ (ratatui)  │      │  memory)   │      │  renderer) │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`record`]: `Record`, `RecordFields`, `Summary`
//! - [`validation`]: the save/export field checks
//! - [`model`]: `RecordModel`, CRUD over a `RecordStore`
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and `update()`, every screen transition
//! - [`config`]: layered configuration

pub mod action;
pub mod config;
pub mod model;
pub mod record;
pub mod state;
pub mod validation;

pub use action::{Action, Effect, update};
pub use state::App;
