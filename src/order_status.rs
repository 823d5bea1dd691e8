//! Order lifecycle.
//!
//! An order is created `оформлен` at checkout and then moves forward through
//! delivery stages driven by couriers (and one dispatch step driven by an
//! admin). The wire names are part of the public API and are stored verbatim
//! in the `orders.status` column.
//!
//! ```text
//! оформлен ──dispatch──▶ ожидает ──accept──▶ в_пути ──arrive──▶ прибыл ──complete──▶ завершено
//!     │                     │                  │                   ├──partial───▶ завершено_частично
//!     └────────take─────────┼─────────────────▶│                   │
//!                           └──cancel──▶ отменён ◀──cancel──────────┘
//! ```
//!
//! Every status change in the crate goes through [`OrderStatus::apply`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    /// Customer completed checkout; no courier yet.
    #[serde(rename = "оформлен")]
    Placed,
    /// Dispatched to a specific courier who has not accepted yet.
    #[serde(rename = "ожидает")]
    Awaiting,
    #[serde(rename = "в_пути")]
    InTransit,
    #[serde(rename = "прибыл")]
    Arrived,
    #[serde(rename = "завершено")]
    Completed,
    #[serde(rename = "завершено_частично")]
    PartiallyCompleted,
    #[serde(rename = "отменён")]
    Cancelled,
}

/// An actor command that may move an order to another status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    /// Admin hands a placed order to a courier.
    Dispatch,
    /// Courier takes an unassigned placed order.
    Take,
    /// Assigned courier accepts a dispatched order.
    Accept,
    MarkArrived,
    Complete,
    CompletePartially,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot {action} an order in status {from}")]
    NotAllowed {
        from: OrderStatus,
        action: OrderAction,
    },

    #[error("status {0} cannot be requested directly")]
    NotRequestable(OrderStatus),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Placed,
        OrderStatus::Awaiting,
        OrderStatus::InTransit,
        OrderStatus::Arrived,
        OrderStatus::Completed,
        OrderStatus::PartiallyCompleted,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "оформлен",
            OrderStatus::Awaiting => "ожидает",
            OrderStatus::InTransit => "в_пути",
            OrderStatus::Arrived => "прибыл",
            OrderStatus::Completed => "завершено",
            OrderStatus::PartiallyCompleted => "завершено_частично",
            OrderStatus::Cancelled => "отменён",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::PartiallyCompleted | OrderStatus::Cancelled
        )
    }

    /// Customers may edit or delete an order only before any courier is involved.
    pub fn is_editable_by_customer(&self) -> bool {
        matches!(self, OrderStatus::Placed)
    }

    /// The status reached by performing `action` on an order in `self`.
    pub fn apply(self, action: OrderAction) -> Result<OrderStatus, TransitionError> {
        use OrderAction as A;
        use OrderStatus as S;

        let next = match (self, action) {
            (S::Placed, A::Dispatch) => S::Awaiting,
            (S::Placed, A::Take) => S::InTransit,
            (S::Awaiting, A::Accept) => S::InTransit,
            (S::InTransit, A::MarkArrived) => S::Arrived,
            (S::Arrived, A::Complete) => S::Completed,
            (S::Arrived, A::CompletePartially) => S::PartiallyCompleted,
            (S::Awaiting | S::InTransit | S::Arrived, A::Cancel) => S::Cancelled,
            (from, action) => return Err(TransitionError::NotAllowed { from, action }),
        };
        Ok(next)
    }

    /// Actions that are valid from this status.
    pub fn available_actions(self) -> Vec<OrderAction> {
        OrderAction::ALL
            .into_iter()
            .filter(|action| self.apply(*action).is_ok())
            .collect()
    }
}

impl OrderAction {
    pub const ALL: [OrderAction; 7] = [
        OrderAction::Dispatch,
        OrderAction::Take,
        OrderAction::Accept,
        OrderAction::MarkArrived,
        OrderAction::Complete,
        OrderAction::CompletePartially,
        OrderAction::Cancel,
    ];

    /// Maps a target status sent to the generic courier status endpoint onto
    /// the action that reaches it. Statuses with a dedicated endpoint (taking,
    /// accepting, cancelling) are not requestable here.
    pub fn for_target(target: OrderStatus) -> Result<OrderAction, TransitionError> {
        match target {
            OrderStatus::Arrived => Ok(OrderAction::MarkArrived),
            OrderStatus::Completed => Ok(OrderAction::Complete),
            OrderStatus::PartiallyCompleted => Ok(OrderAction::CompletePartially),
            other => Err(TransitionError::NotRequestable(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::Dispatch => "dispatch",
            OrderAction::Take => "take",
            OrderAction::Accept => "accept",
            OrderAction::MarkArrived => "mark_arrived",
            OrderAction::Complete => "complete",
            OrderAction::CompletePartially => "complete_partially",
            OrderAction::Cancel => "cancel",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
