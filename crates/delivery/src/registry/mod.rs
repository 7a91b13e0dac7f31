//! Session and delivery-group state.

pub mod groups;
pub mod units;

pub use groups::DeliveryGroupRegistry;
pub use units::UnitRegistry;
