use marketplace_api::order_status::{OrderAction, OrderStatus, TransitionError};

#[test]
fn happy_path_take_to_completed() {
    let status = OrderStatus::Placed;
    let status = status.apply(OrderAction::Take).unwrap();
    assert_eq!(status, OrderStatus::InTransit);
    let status = status.apply(OrderAction::MarkArrived).unwrap();
    assert_eq!(status, OrderStatus::Arrived);
    let status = status.apply(OrderAction::Complete).unwrap();
    assert_eq!(status, OrderStatus::Completed);
    assert!(status.is_terminal());
}

#[test]
fn dispatched_order_waits_for_accept() {
    let status = OrderStatus::Placed.apply(OrderAction::Dispatch).unwrap();
    assert_eq!(status, OrderStatus::Awaiting);
    assert_eq!(
        status.apply(OrderAction::Accept).unwrap(),
        OrderStatus::InTransit
    );
    assert!(status.apply(OrderAction::Take).is_err());
}

#[test]
fn arrived_can_complete_partially() {
    assert_eq!(
        OrderStatus::Arrived
            .apply(OrderAction::CompletePartially)
            .unwrap(),
        OrderStatus::PartiallyCompleted
    );
}

#[test]
fn cancel_allowed_only_while_courier_is_involved() {
    for status in [OrderStatus::Awaiting, OrderStatus::InTransit, OrderStatus::Arrived] {
        assert_eq!(
            status.apply(OrderAction::Cancel).unwrap(),
            OrderStatus::Cancelled
        );
    }
    assert!(OrderStatus::Placed.apply(OrderAction::Cancel).is_err());
    assert!(OrderStatus::Completed.apply(OrderAction::Cancel).is_err());
}

#[test]
fn skipping_stages_is_rejected() {
    let err = OrderStatus::Placed.apply(OrderAction::Complete).unwrap_err();
    assert_eq!(
        err,
        TransitionError::NotAllowed {
            from: OrderStatus::Placed,
            action: OrderAction::Complete,
        }
    );
    assert!(OrderStatus::InTransit.apply(OrderAction::Complete).is_err());
    assert!(OrderStatus::Placed.apply(OrderAction::MarkArrived).is_err());
}

#[test]
fn terminal_states_have_no_actions() {
    for status in OrderStatus::ALL {
        if status.is_terminal() {
            assert!(status.available_actions().is_empty(), "{status}");
        } else {
            assert!(!status.available_actions().is_empty(), "{status}");
        }
    }
}

#[test]
fn wire_names_round_trip_through_serde_and_from_str() {
    for status in OrderStatus::ALL {
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, format!("\"{}\"", status.as_str()));
        let back: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
        assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
    }
    assert_eq!(
        "в_пути".parse::<OrderStatus>().unwrap(),
        OrderStatus::InTransit
    );
    assert!("shipped".parse::<OrderStatus>().is_err());
}

#[test]
fn only_delivery_outcomes_are_requestable_targets() {
    assert_eq!(
        OrderAction::for_target(OrderStatus::Arrived).unwrap(),
        OrderAction::MarkArrived
    );
    assert_eq!(
        OrderAction::for_target(OrderStatus::Completed).unwrap(),
        OrderAction::Complete
    );
    assert_eq!(
        OrderAction::for_target(OrderStatus::PartiallyCompleted).unwrap(),
        OrderAction::CompletePartially
    );
    assert_eq!(
        OrderAction::for_target(OrderStatus::Cancelled).unwrap_err(),
        TransitionError::NotRequestable(OrderStatus::Cancelled)
    );
    assert!(OrderAction::for_target(OrderStatus::Placed).is_err());
}

#[test]
fn only_placed_orders_are_editable() {
    for status in OrderStatus::ALL {
        assert_eq!(
            status.is_editable_by_customer(),
            status == OrderStatus::Placed
        );
    }
}
