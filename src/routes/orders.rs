use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::orders::{CheckoutRequest, OrderItemRemoval, OrderList, OrderWithItems},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(list_orders).post(checkout))
        .route("/{user_id}/{order_id}", get(get_order).delete(delete_order))
        .route(
            "/{user_id}/{order_id}/items/{product_id}/{size_id}",
            delete(remove_order_item),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Order owner"),
        OrderListQuery
    ),
    responses(
        (status = 200, description = "Orders of the user", body = ApiResponse<OrderList>),
        (status = 400, description = "Unknown status filter"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &user, user_id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Order owner")
    ),
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order placed from the cart", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Empty cart, invalid address, unsupported country or not enough stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::checkout(&state, &user, user_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{user_id}/{order_id}",
    params(
        ("user_id" = Uuid, Path, description = "Order owner"),
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path((user_id, order_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, &user, user_id, order_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{user_id}/{order_id}",
    params(
        ("user_id" = Uuid, Path, description = "Order owner"),
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Order already handed to a courier"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path((user_id, order_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = order_service::delete_order(&state, &user, user_id, order_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{user_id}/{order_id}/items/{product_id}/{size_id}",
    params(
        ("user_id" = Uuid, Path, description = "Order owner"),
        ("order_id" = Uuid, Path, description = "Order ID"),
        ("product_id" = Uuid, Path, description = "Product ID"),
        ("size_id" = Uuid, Path, description = "Size ID")
    ),
    responses(
        (status = 200, description = "Item removed; order deleted when it was the last one", body = ApiResponse<OrderItemRemoval>),
        (status = 404, description = "Order or item not found"),
        (status = 409, description = "Order already handed to a courier"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn remove_order_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((user_id, order_id, product_id, size_id)): Path<(Uuid, Uuid, Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<OrderItemRemoval>>> {
    let resp =
        order_service::remove_order_item(&state, &user, user_id, order_id, product_id, size_id)
            .await?;
    Ok(Json(resp))
}
