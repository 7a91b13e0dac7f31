//! Test plan for the `altawater-delivery` crate.
//!
//! Covers the per-unit state machine, the resident and delivery-team
//! scenarios end to end, and the concurrency guarantees of the ledger.

use std::sync::{Arc, Barrier};
use std::thread;

use altawater_delivery::{
    ChatId, Coordinator, DeliveryError, MessageRef, Outbound, RequestLedger, SessionId, Trigger,
    UnitId,
};

fn unit(raw: &str) -> UnitId {
    UnitId::parse(raw).expect("valid unit")
}

fn registered(coordinator: &Coordinator, session: &str, flat: &str) -> SessionId {
    let session = SessionId::new(session);
    coordinator.handle(Trigger::RegisterUnit {
        session: session.clone(),
        unit: flat.to_string(),
    });
    session
}

fn notifications(plan: &[Outbound]) -> Vec<(&ChatId, &str, Option<&UnitId>)> {
    plan.iter()
        .filter_map(|outbound| match outbound {
            Outbound::Notify {
                target,
                text,
                action,
            } => Some((target, text.as_str(), action.as_ref().map(|a| &a.unit))),
            _ => None,
        })
        .collect()
}

#[test]
fn scenario_a_request_without_group_stays_outstanding() {
    let coordinator = Coordinator::new();
    let session = registered(&coordinator, "S", "12");

    let plan = coordinator.handle(Trigger::SubmitRequest { session });

    assert_eq!(
        plan,
        vec![Outbound::reply(
            "Delivery group not registered yet. Ask admin to run /register_delivery_group in the group."
        )]
    );
    assert!(coordinator.ledger().has_outstanding(&unit("12")));
}

#[test]
fn scenario_b_group_receives_actionable_notification() {
    let coordinator = Coordinator::new();
    let group = ChatId::new("G");
    coordinator.handle(Trigger::DesignateGroup { group: group.clone() });
    let session = registered(&coordinator, "S", "7");

    let plan = coordinator.handle(Trigger::SubmitRequest { session });

    let sent = notifications(&plan);
    assert_eq!(sent.len(), 1);
    let (target, text, action_unit) = sent[0];
    assert_eq!(target, &group);
    assert!(text.contains('7'));
    assert_eq!(action_unit, Some(&unit("7")));
    assert!(plan.contains(&Outbound::reply("Request sent to delivery team.")));
}

#[test]
fn scenario_c_acknowledge_clears_then_reports_not_found() {
    let coordinator = Coordinator::new();
    coordinator.handle(Trigger::DesignateGroup {
        group: ChatId::new("G"),
    });
    let session = registered(&coordinator, "S", "7");
    coordinator.handle(Trigger::SubmitRequest { session });
    let message = MessageRef::new(ChatId::new("G"), "501");

    let first = coordinator.handle(Trigger::Acknowledge {
        unit: "7".into(),
        message: message.clone(),
    });
    assert_eq!(
        first,
        vec![Outbound::update(message.clone(), "✅ Water delivered to Flat 7")]
    );
    assert!(!coordinator.ledger().has_outstanding(&unit("7")));

    let second = coordinator.handle(Trigger::Acknowledge {
        unit: "7".into(),
        message: message.clone(),
    });
    assert_eq!(
        second,
        vec![Outbound::update(message, "No active request found.")]
    );
    assert!(matches!(
        coordinator.acknowledge("7"),
        Err(DeliveryError::NotFound { .. })
    ));
}

#[test]
fn scenario_d_unregistered_session_is_rejected() {
    let coordinator = Coordinator::new();
    let session = SessionId::new("stranger");

    assert_eq!(
        coordinator.submit_request(&session),
        Err(DeliveryError::NotRegistered)
    );
    let plan = coordinator.handle(Trigger::SubmitRequest { session });

    assert_eq!(
        plan,
        vec![Outbound::reply("You must /join with a flat number first.")]
    );
    assert!(coordinator.ledger().is_empty());
}

#[test]
fn re_registered_session_requests_for_new_unit() {
    let coordinator = Coordinator::new();
    let session = registered(&coordinator, "S", "12");
    registered(&coordinator, "S", "14");

    coordinator
        .submit_request(&session)
        .expect("request accepted");

    assert!(coordinator.ledger().has_outstanding(&unit("14")));
    assert!(!coordinator.ledger().has_outstanding(&unit("12")));
}

#[test]
fn neighbours_share_one_request_per_unit() {
    let coordinator = Coordinator::new();
    let first = registered(&coordinator, "A", "9");
    let second = registered(&coordinator, "B", "9");

    assert!(coordinator.submit_request(&first).is_ok());
    assert_eq!(
        coordinator.submit_request(&second),
        Err(DeliveryError::AlreadyOutstanding { unit: unit("9") })
    );
}

#[test]
fn held_request_is_announced_when_group_arrives() {
    let coordinator = Coordinator::new();
    let session = registered(&coordinator, "S", "12");
    coordinator.handle(Trigger::SubmitRequest { session });

    let plan = coordinator.handle(Trigger::DesignateGroup {
        group: ChatId::new("G"),
    });

    let sent = notifications(&plan);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].2, Some(&unit("12")));
}

#[test]
fn redesignation_moves_future_notifications() {
    let coordinator = Coordinator::new();
    coordinator.handle(Trigger::DesignateGroup {
        group: ChatId::new("old"),
    });
    coordinator.handle(Trigger::DesignateGroup {
        group: ChatId::new("new"),
    });
    let session = registered(&coordinator, "S", "3");

    let plan = coordinator.handle(Trigger::SubmitRequest { session });

    let sent = notifications(&plan);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, &ChatId::new("new"));
}

#[test]
fn concurrent_submits_for_one_unit_accept_exactly_once() {
    const CALLERS: usize = 32;

    let ledger = Arc::new(RequestLedger::new());
    let barrier = Arc::new(Barrier::new(CALLERS));
    let target = unit("42");

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            let target = target.clone();
            thread::spawn(move || {
                barrier.wait();
                ledger.submit(&target)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("submitter thread panicked"))
        .collect();

    let accepted = results.iter().filter(|result| result.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|result| matches!(result, Err(DeliveryError::AlreadyOutstanding { .. })))
        .count();
    assert_eq!(accepted, 1);
    assert_eq!(rejected, CALLERS - 1);
    assert_eq!(ledger.len(), 1);
}

#[test]
fn concurrent_acknowledges_clear_exactly_once() {
    const CALLERS: usize = 16;

    let ledger = Arc::new(RequestLedger::new());
    ledger.submit(&unit("8")).expect("accepted");
    let barrier = Arc::new(Barrier::new(CALLERS));

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                ledger.acknowledge(&unit("8")).is_ok()
            })
        })
        .collect();

    let cleared = handles
        .into_iter()
        .map(|handle| handle.join().expect("acknowledger thread panicked"))
        .filter(|cleared| *cleared)
        .count();
    assert_eq!(cleared, 1);
    assert!(ledger.is_empty());
}

#[test]
fn concurrent_submits_for_distinct_units_all_succeed() {
    const UNITS: usize = 64;

    let ledger = Arc::new(RequestLedger::new());
    let handles: Vec<_> = (0..UNITS)
        .map(|index| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || ledger.submit(&unit(&index.to_string())).is_ok())
        })
        .collect();

    let accepted = handles
        .into_iter()
        .map(|handle| handle.join().expect("submitter thread panicked"))
        .filter(|accepted| *accepted)
        .count();
    assert_eq!(accepted, UNITS);
    assert_eq!(ledger.len(), UNITS);
}

#[test]
fn racing_submit_and_designation_announce_once() {
    for round in 0..50 {
        let coordinator = Arc::new(Coordinator::new());
        let session = registered(&coordinator, "S", "5");
        let barrier = Arc::new(Barrier::new(2));

        let submitter = {
            let coordinator = Arc::clone(&coordinator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                coordinator.handle(Trigger::SubmitRequest { session })
            })
        };
        let designator = {
            let coordinator = Arc::clone(&coordinator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                coordinator.handle(Trigger::DesignateGroup {
                    group: ChatId::new("G"),
                })
            })
        };

        let mut plan = submitter.join().expect("submitter panicked");
        plan.extend(designator.join().expect("designator panicked"));

        assert_eq!(
            notifications(&plan).len(),
            1,
            "round {round}: request must be announced exactly once"
        );
    }
}
