//! Orchestrates registries and ledger in response to inbound triggers.

use tracing::{debug, info};

use crate::ledger::{Accepted, Cleared, RequestLedger};
use crate::messages;
use crate::registry::{DeliveryGroupRegistry, UnitRegistry};
use crate::types::{
    AcknowledgeAction, DeliveryError, DeliveryResult, GroupId, Outbound, SessionId, Trigger,
    UnitId,
};

const DEFAULT_REQUEST_KEYWORD: &str = "water";

/// Owns all delivery state and turns triggers into outbound plans.
///
/// Share it behind an `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct Coordinator {
    units: UnitRegistry,
    groups: DeliveryGroupRegistry,
    ledger: RequestLedger,
    request_keyword: String,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator {
    pub fn new() -> Self {
        Self::with_request_keyword(DEFAULT_REQUEST_KEYWORD)
    }

    /// Use `keyword` in the registration hint residents receive.
    pub fn with_request_keyword(keyword: impl Into<String>) -> Self {
        Self {
            units: UnitRegistry::new(),
            groups: DeliveryGroupRegistry::new(),
            ledger: RequestLedger::new(),
            request_keyword: keyword.into(),
        }
    }

    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    pub fn groups(&self) -> &DeliveryGroupRegistry {
        &self.groups
    }

    pub fn ledger(&self) -> &RequestLedger {
        &self.ledger
    }

    /// Handle one trigger. Rejections become replies; nothing here fails.
    pub fn handle(&self, trigger: Trigger) -> Vec<Outbound> {
        match trigger {
            Trigger::RegisterUnit { session, unit } => match self.register_unit(&session, &unit) {
                Ok(unit) => vec![Outbound::reply(messages::registered(
                    &unit,
                    &self.request_keyword,
                ))],
                Err(error) => vec![Self::rejected(&error)],
            },
            Trigger::SubmitRequest { session } => match self.submit_request(&session) {
                Ok(Accepted(request)) => self.route_accepted(&request.unit),
                Err(error) => vec![Self::rejected(&error)],
            },
            Trigger::Acknowledge { unit, message } => match self.acknowledge(&unit) {
                Ok(Cleared(request)) => {
                    vec![Outbound::update(message, messages::delivered(&request.unit))]
                }
                Err(error) => {
                    debug!(%error, "acknowledge rejected");
                    vec![Outbound::update(message, messages::NO_ACTIVE_REQUEST)]
                }
            },
            Trigger::DesignateGroup { group } => {
                self.designate_group(group.clone());
                let mut plan = vec![Outbound::reply(messages::GROUP_REGISTERED)];
                plan.extend(self.announce_pending(&group));
                plan
            }
        }
    }

    /// Register the unit a session belongs to, returning the parsed unit.
    pub fn register_unit(&self, session: &SessionId, raw_unit: &str) -> DeliveryResult<UnitId> {
        let unit = UnitId::parse(raw_unit)?;
        if let Some(previous) = self.units.register_unit(session, unit.clone()) {
            debug!(%session, %previous, %unit, "session re-registered");
        }
        info!(%session, %unit, "unit registered");
        Ok(unit)
    }

    /// Record a request for the session's registered unit.
    pub fn submit_request(&self, session: &SessionId) -> DeliveryResult<Accepted> {
        let unit = self
            .units
            .lookup_unit(session)
            .ok_or(DeliveryError::NotRegistered)?;
        self.ledger.submit(&unit)
    }

    /// Clear the request for the unit carried in the acknowledge action.
    pub fn acknowledge(&self, raw_unit: &str) -> DeliveryResult<Cleared> {
        let unit = UnitId::parse(raw_unit)?;
        self.ledger.acknowledge(&unit)
    }

    /// Make `group` the delivery target, returning the previous one.
    pub fn designate_group(&self, group: GroupId) -> Option<GroupId> {
        info!(%group, "delivery group designated");
        self.groups.designate(group)
    }

    pub fn outstanding_count(&self) -> usize {
        self.ledger.len()
    }

    fn route_accepted(&self, unit: &UnitId) -> Vec<Outbound> {
        // The request is already recorded, so a designation racing with this
        // read either sees it as unannounced or leaves the group visible here.
        match self.groups.current() {
            Some(group) => {
                let mut plan: Vec<Outbound> = self.announce(&group, unit).into_iter().collect();
                plan.push(Outbound::reply(messages::REQUEST_SENT));
                plan
            }
            None => {
                let error = DeliveryError::no_delivery_target(unit);
                debug!(%unit, "request held until a delivery group is designated");
                vec![Self::rejected(&error)]
            }
        }
    }

    fn announce_pending(&self, group: &GroupId) -> Vec<Outbound> {
        let plan: Vec<Outbound> = self
            .ledger
            .unannounced()
            .iter()
            .filter_map(|unit| self.announce(group, unit))
            .collect();
        if !plan.is_empty() {
            info!(%group, count = plan.len(), "announcing held requests");
        }
        plan
    }

    fn announce(&self, group: &GroupId, unit: &UnitId) -> Option<Outbound> {
        if !self.ledger.claim_announcement(unit) {
            return None;
        }
        Some(Outbound::Notify {
            target: group.clone(),
            text: messages::notification(unit),
            action: Some(AcknowledgeAction { unit: unit.clone() }),
        })
    }

    fn rejected(error: &DeliveryError) -> Outbound {
        debug!(%error, "trigger rejected");
        Outbound::reply(messages::rejection(error))
    }
}
