use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        courier::UpdateOrderStatusRequest,
        orders::{OrderList, OrderWithItems},
    },
    entity::orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_courier},
    models::Role,
    order_status::{OrderAction, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, Pagination, SortOrder},
    services::{order_service, orders_from_entities, parse_status},
    state::AppState,
};

/// Orders a courier can pick up: unassigned placed orders and orders dispatched to them.
pub async fn available_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_courier(user)?;
    let (page, limit, offset) = pagination.normalize();

    let condition = Condition::any()
        .add(
            Condition::all()
                .add(OrderCol::Status.eq(OrderStatus::Placed.as_str()))
                .add(OrderCol::CourierId.is_null()),
        )
        .add(
            Condition::all()
                .add(OrderCol::Status.eq(OrderStatus::Awaiting.as_str()))
                .add(OrderCol::CourierId.eq(user.user_id)),
        );

    let finder = Orders::find()
        .filter(condition)
        .order_by_asc(OrderCol::CreatedAt)
        .order_by_asc(OrderCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Available orders",
        OrderList {
            items: orders_from_entities(orders)?,
        },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn my_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_courier(user)?;
    let status = query.status_filter()?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(OrderCol::CourierId.eq(user.user_id));
    if let Some(status) = status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::UpdatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::UpdatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Courier orders",
        OrderList {
            items: orders_from_entities(orders)?,
        },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Takes an unassigned placed order, or accepts one dispatched to the caller.
pub async fn accept_order(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = transition(state, user, order_id, |status| match status {
        OrderStatus::Placed => OrderAction::Take,
        _ => OrderAction::Accept,
    })
    .await?;
    respond(state, "Order accepted", order).await
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let action = OrderAction::for_target(payload.status)?;
    let order = transition(state, user, order_id, |_| action).await?;
    respond(state, "Order status updated", order).await
}

pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = transition(state, user, order_id, |_| OrderAction::Cancel).await?;
    respond(state, "Order cancelled", order).await
}

/// Runs one courier action against the locked order row. The stored status
/// only changes when the state machine allows the action.
async fn transition(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    choose_action: impl FnOnce(OrderStatus) -> OrderAction,
) -> AppResult<OrderModel> {
    ensure_courier(user)?;
    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(order_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let from = parse_status(&order.status)?;
    let action = choose_action(from);
    let next = from.apply(action)?;

    match action {
        OrderAction::Take => {}
        _ if user.role == Role::Admin => {}
        _ => {
            if order.courier_id != Some(user.user_id) {
                return Err(AppError::Forbidden);
            }
        }
    }

    if next == OrderStatus::Cancelled {
        let items = order_service::load_items(&txn, order.id).await?;
        order_service::restock(&txn, &items).await?;
    }

    let claims_order = matches!(action, OrderAction::Take | OrderAction::Accept);
    let mut active: OrderActive = order.into();
    if claims_order {
        active.courier_id = Set(Some(user.user_id));
    }
    active.status = Set(next.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        courier_id = %user.user_id,
        %action,
        %from,
        to = %next,
        "order status changed"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "order_status_change",
        "orders",
        serde_json::json!({
            "order_id": order.id,
            "action": action.as_str(),
            "from": from.as_str(),
            "to": next.as_str(),
        }),
    )
    .await;

    Ok(order)
}

async fn respond(
    state: &AppState,
    message: &str,
    order: OrderModel,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let data = order_service::with_items(&state.orm, order).await?;
    Ok(ApiResponse::success(message, data, Some(Meta::empty())))
}
