//! User-facing texts produced by the core.

use crate::types::{DeliveryError, UnitId};

pub const REQUEST_SENT: &str = "Request sent to delivery team.";
pub const GROUP_REGISTERED: &str = "This group is now registered as the delivery group.";
pub const NO_ACTIVE_REQUEST: &str = "No active request found.";

pub fn registered(unit: &UnitId, keyword: &str) -> String {
    format!("Registered to flat {unit}. Now type '{keyword}' to request water.")
}

pub fn notification(unit: &UnitId) -> String {
    format!("🚰 Water requested for Flat {unit}")
}

pub fn delivered(unit: &UnitId) -> String {
    format!("✅ Water delivered to Flat {unit}")
}

/// Text shown to the person whose trigger was rejected.
pub fn rejection(error: &DeliveryError) -> String {
    match error {
        DeliveryError::NotRegistered => "You must /join with a flat number first.".to_string(),
        DeliveryError::AlreadyOutstanding { .. } => {
            "Water already requested for your flat. Please wait for delivery.".to_string()
        }
        DeliveryError::NotFound { .. } => NO_ACTIVE_REQUEST.to_string(),
        DeliveryError::NoDeliveryTarget { .. } => {
            "Delivery group not registered yet. Ask admin to run /register_delivery_group in the group."
                .to_string()
        }
        DeliveryError::InvalidUnit => "Flat number must not be empty.".to_string(),
    }
}
