use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        admin::{BrandList, CreateBrandRequest, DispatchOrderRequest, GrantCourierRequest, UserList},
        orders::{OrderList, OrderWithItems},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Brand, User},
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}", get(get_order_admin))
        .route("/orders/{id}/dispatch", put(dispatch_order))
        .route("/couriers", get(list_couriers).post(grant_courier))
        .route("/couriers/{user_id}", delete(revoke_courier))
        .route("/brands", get(list_brands).post(create_brand))
        .route("/brands/{id}", delete(delete_brand))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/orders",
    params(OrderListQuery),
    responses(
    (status = 200, description = "Get all orders (admin only)", body = ApiResponse<OrderList>),
    (status = 403, description = "Forbidden"),
    (status = 500, description = "Internal Server Error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = admin_service::list_all_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/orders/{id}",
    params(
    (
        "id" = Uuid, Path, description = "Order ID")
    ),
    responses(
    (status = 200, description = "Get any order with items (admin only)", body = ApiResponse<OrderWithItems>),
    (status = 404, description = "Not Found", ),
    (status = 403, description = "Forbidden", ),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_order_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = admin_service::get_order_admin(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/orders/{id}/dispatch",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = DispatchOrderRequest,
    responses(
        (status = 200, description = "Order awaits the courier", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Target user is not a courier"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Order is no longer placed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn dispatch_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DispatchOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = admin_service::dispatch_order(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/couriers",
    responses(
        (status = 200, description = "Users with the courier role", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_couriers(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = admin_service::list_couriers(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/couriers",
    request_body = GrantCourierRequest,
    responses(
        (status = 200, description = "User is now a courier", body = ApiResponse<User>),
        (status = 400, description = "User is an admin"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn grant_courier(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<GrantCourierRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::grant_courier(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/couriers/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Courier user ID")
    ),
    responses(
        (status = 200, description = "Courier role revoked", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Courier not found"),
        (status = 409, description = "Courier has open orders"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn revoke_courier(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::revoke_courier(&state, &user, user_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/brands",
    responses(
        (status = 200, description = "All brands", body = ApiResponse<BrandList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_brands(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<BrandList>>> {
    let resp = admin_service::list_brands(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/brands",
    request_body = CreateBrandRequest,
    responses(
        (status = 200, description = "Brand created", body = ApiResponse<Brand>),
        (status = 400, description = "Missing or duplicate name"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_brand(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBrandRequest>,
) -> AppResult<Json<ApiResponse<Brand>>> {
    let resp = admin_service::create_brand(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Brand deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_brand(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::delete_brand(&state, &user, id).await?;
    Ok(Json(resp))
}
