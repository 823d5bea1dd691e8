use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::wishlist::WishlistProductList,
    entity::{
        products::Entity as Products,
        wishlist_items::{ActiveModel as WishlistActive, Column as WishlistCol, Entity as WishlistItems},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_wishlist(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<WishlistProductList>> {
    ensure_owner(user, user_id)?;
    let (page, limit, offset) = pagination.normalize();
    let products = sqlx::query_as::<_, Product>(
        r#"
        SELECT p.id, p.name, p.description, p.price, p.image_path,
               p.brand_id, p.subcategory_id, p.created_at
        FROM wishlist_items w
        JOIN products p ON p.id = w.product_id
        WHERE w.user_id = $1
        ORDER BY w.created_at DESC, w.id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM wishlist_items WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&state.pool)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "OK",
        WishlistProductList { items: products },
        Some(meta),
    ))
}

pub async fn add_to_wishlist(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_owner(user, user_id)?;
    if Products::find_by_id(product_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let inserted = WishlistItems::insert(WishlistActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        product_id: Set(product_id),
        created_at: NotSet,
    })
    .on_conflict(
        OnConflict::columns([WishlistCol::UserId, WishlistCol::ProductId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(&state.orm)
    .await?;

    if inserted > 0 {
        audit::record(
            &state.pool,
            user.user_id,
            "wishlist_add",
            "wishlist_items",
            serde_json::json!({ "user_id": user_id, "product_id": product_id }),
        )
        .await;
    }

    Ok(ApiResponse::success(
        "Added to wishlist",
        serde_json::json!({ "product_id": product_id }),
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_wishlist(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_owner(user, user_id)?;
    let result = WishlistItems::delete_many()
        .filter(WishlistCol::UserId.eq(user_id))
        .filter(WishlistCol::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "wishlist_remove",
        "wishlist_items",
        serde_json::json!({ "user_id": user_id, "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Removed from wishlist",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
