//! # Ports
//!
//! Hexagonal boundaries of the key game: the inbound API trait and the
//! outbound capabilities (value transfer, authorization, clock).

pub mod inbound;
pub mod outbound;

pub use inbound::KeyGameApi;
pub use outbound::{AccessPolicy, Clock, FundsTransfer};
