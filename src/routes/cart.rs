use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, put},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartView, RemoveCartItemQuery, UpdateCartItemRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(get_cart).post(add_to_cart))
        .route("/{user_id}/clear", delete(clear_cart))
        .route(
            "/{user_id}/{product_id}",
            put(update_cart_item).delete(remove_from_cart),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/cart/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Cart owner")
    ),
    responses(
        (status = 200, description = "Current cart", body = ApiResponse<CartView>),
        (status = 403, description = "Not the cart owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::get_cart(&state, &user, user_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/cart/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Cart owner")
    ),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Item added; refreshed cart", body = ApiResponse<CartView>),
        (status = 400, description = "Invalid quantity or not enough stock"),
        (status = 404, description = "Unknown product or size"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::add_to_cart(&state, &user, user_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/cart/{user_id}/{product_id}",
    params(
        ("user_id" = Uuid, Path, description = "Cart owner"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Quantity set; refreshed cart", body = ApiResponse<CartView>),
        (status = 400, description = "Quantity below 1 or not enough stock"),
        (status = 404, description = "Item not in cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((user_id, product_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::update_cart_item(&state, &user, user_id, product_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/cart/{user_id}/{product_id}",
    params(
        ("user_id" = Uuid, Path, description = "Cart owner"),
        ("product_id" = Uuid, Path, description = "Product ID"),
        RemoveCartItemQuery
    ),
    responses(
        (status = 200, description = "Item removed; refreshed cart", body = ApiResponse<CartView>),
        (status = 404, description = "Item not in cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path((user_id, product_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<RemoveCartItemQuery>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp =
        cart_service::remove_from_cart(&state, &user, user_id, product_id, query.size_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/cart/{user_id}/clear",
    params(
        ("user_id" = Uuid, Path, description = "Cart owner")
    ),
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<CartView>),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::clear_cart(&state, &user, user_id).await?;
    Ok(Json(resp))
}
