//! Core types and state machines for the checkpoint logbook.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the role-gated authorization table ([`guard`]), the visitor custody state
//! machine ([`checkpoint`]) and the cargo lifecycle ([`ledger`]). Storage
//! backends implement [`store::LogbookStore`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod badge;
pub mod cargo;
pub mod checkpoint;
pub mod clock;
pub mod custody;
pub mod error;
pub mod guard;
pub mod ledger;
pub mod locks;
pub mod memory;
pub mod role;
pub mod store;
pub mod visitor;

mod validate;

pub use checkpoint::VisitorCheckpoint;
pub use error::{Error, Result};
pub use ledger::CargoLedger;
pub use role::{Operation, OperatorContext, ResourceKind, Role};
