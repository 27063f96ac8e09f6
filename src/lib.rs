//! # keyround
//!
//! Round-based, pay-to-play key game ledger.
//!
//! ## Role in System
//!
//! - **Economic core**: compounding key pricing, per-round dividend
//!   accounting, winner payouts, and remainder rollover
//! - **Single logical writer**: every operation executes atomically against
//!   the shared round registry and pricing state
//! - **Capability consumer**: value transfer and owner/admin authorization
//!   come from collaborators through outbound ports
//!
//! ## Control Flow
//!
//! ```text
//! [caller] ──KeyGameApi──→ [KeyGameService]
//!                               │ reconcile lifecycle (lazy round advance)
//!                               │ pricing / dividends / settlement
//!                               ↓
//!                        [LedgerState (staged copy)]
//!                               │ at most one outbound transfer
//!                               ↓
//!                        [FundsTransfer port] ──Ok──→ commit + events
//! ```
//!
//! A failed transfer, arithmetic fault, or validation error drops the staged
//! copy: no operation ever leaves partial mutations visible.

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

pub use domain::*;
pub use errors::{LedgerError, TransferError};
pub use events::{ConfigParameter, EventRecord, LedgerEvent};
pub use ports::*;
pub use service::{KeyGameService, ServiceConfig, ServiceStats};
