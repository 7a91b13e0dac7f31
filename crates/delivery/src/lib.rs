//! # Altawater Delivery Crate
//!
//! This crate holds the request lifecycle core of the Altawater bot. It tracks
//! which chat participant lives in which flat, which group chat receives
//! delivery notifications, and whether a delivery is outstanding for a flat.
//!
//! ## Architecture
//!
//! - **Types**: Identifiers, triggers, outbound instructions and errors
//! - **Registry**: Session-to-unit and delivery-group state
//! - **Ledger**: Outstanding requests keyed by unit
//! - **Coordinator**: Turns one trigger into an outbound plan
//! - **Notifier**: Port the transport implements to carry the plan out
//!
//! ## Usage
//!
//! ```rust
//! use altawater_delivery::{ChatId, Coordinator, Outbound, SessionId, Trigger};
//!
//! let coordinator = Coordinator::new();
//! let session = SessionId::new("42");
//!
//! coordinator.handle(Trigger::RegisterUnit { session: session.clone(), unit: "12".into() });
//! coordinator.handle(Trigger::DesignateGroup { group: ChatId::new("-100") });
//!
//! let plan = coordinator.handle(Trigger::SubmitRequest { session });
//! assert!(plan.iter().any(|outbound| matches!(outbound, Outbound::Notify { .. })));
//! ```

pub mod coordinator;
pub mod ledger;
pub mod messages;
pub mod notifier;
pub mod registry;
pub mod types;

pub use coordinator::Coordinator;
pub use ledger::{Accepted, Cleared, Request, RequestLedger};
pub use notifier::{deliver, Notifier};
pub use registry::{DeliveryGroupRegistry, UnitRegistry};
pub use types::{
    AcknowledgeAction, ChatId, DeliveryError, DeliveryResult, GroupId, MessageRef, Outbound,
    SessionId, Trigger, UnitId,
};
