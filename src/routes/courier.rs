use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        courier::UpdateOrderStatusRequest,
        orders::{OrderList, OrderWithItems},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::{OrderListQuery, Pagination},
    services::courier_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/available-orders", get(available_orders))
        .route("/orders", get(my_orders))
        .route("/accept/{order_id}", put(accept_order))
        .route("/orders/{order_id}/status", put(update_status))
        .route("/orders/{order_id}/cancel", put(cancel_order))
}

#[utoipa::path(
    get,
    path = "/api/v1/courier/available-orders",
    params(Pagination),
    responses(
        (status = 200, description = "Unassigned placed orders and orders dispatched to the caller", body = ApiResponse<OrderList>),
        (status = 403, description = "Not a courier"),
    ),
    security(("bearer_auth" = [])),
    tag = "Courier"
)]
pub async fn available_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = courier_service::available_orders(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/courier/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders assigned to the caller", body = ApiResponse<OrderList>),
        (status = 403, description = "Not a courier"),
    ),
    security(("bearer_auth" = [])),
    tag = "Courier"
)]
pub async fn my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = courier_service::my_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/courier/accept/{order_id}",
    params(
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order is now in transit with the caller", body = ApiResponse<OrderWithItems>),
        (status = 403, description = "Order dispatched to another courier"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Order cannot be taken in its current status"),
    ),
    security(("bearer_auth" = [])),
    tag = "Courier"
)]
pub async fn accept_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = courier_service::accept_order(&state, &user, order_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/courier/orders/{order_id}/status",
    params(
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status advanced", body = ApiResponse<OrderWithItems>),
        (status = 403, description = "Order belongs to another courier"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Transition not allowed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Courier"
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = courier_service::update_status(&state, &user, order_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/courier/orders/{order_id}/cancel",
    params(
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order cancelled and stock restored", body = ApiResponse<OrderWithItems>),
        (status = 403, description = "Order belongs to another courier"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Order cannot be cancelled in its current status"),
    ),
    security(("bearer_auth" = [])),
    tag = "Courier"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = courier_service::cancel_order(&state, &user, order_id).await?;
    Ok(Json(resp))
}
