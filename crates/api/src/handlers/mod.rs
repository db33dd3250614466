//! HTTP handlers, grouped by resource.

pub mod chat;
pub mod game;
pub mod ledger;
pub mod participant;
pub mod session;
