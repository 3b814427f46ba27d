//! # preferred-id
//!
//! Host application for the NamingSystem `$preferred-id` operation.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 apps/preferred-id (THE BINARY)               │
//! │                                                              │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐  │
//! │  │   CLI       │    │   HTTP API  │    │  Catalog wiring  │  │
//! │  │  (clap)     │    │   (axum)    │    │ memory/redb/http │  │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘  │
//! │         └──────────────────┼────────────────────┘            │
//! │                            ▼                                 │
//! │                 ┌────────────────────┐                       │
//! │                 │ preferred-id-core  │                       │
//! │                 │    (THE LOGIC)     │                       │
//! │                 └────────────────────┘                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod media;
