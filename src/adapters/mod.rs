//! # Adapters
//!
//! Concrete implementations of the outbound ports: in-memory bank, role
//! book, and clocks. Production deployments replace the bank and role book
//! with adapters over the real token-ledger and access-control
//! collaborators.

pub mod access;
pub mod bank;
pub mod clock;

pub use access::RoleBook;
pub use bank::InMemoryBank;
pub use clock::{ManualClock, SystemClock};
