use sea_orm::sea_query::{Expr, LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    db::DbPool,
    dto::cart::{AddToCartRequest, CartView, UpdateCartItemRequest},
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems},
        product_sizes::Entity as ProductSizes,
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner},
    models::CartItem,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Reads the cart as the storefront shows it, joined with live product data.
pub async fn load_cart(pool: &DbPool, user_id: Uuid) -> AppResult<CartView> {
    let items = sqlx::query_as::<_, CartItem>(
        r#"
        SELECT ci.product_id, ci.size_id, s.name AS size_name, ci.quantity,
               p.price, p.name, p.image_path
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        JOIN sizes s ON s.id = ci.size_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at ASC, ci.id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(CartView::from_items(items))
}

pub async fn get_cart(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    ensure_owner(user, user_id)?;
    let cart = load_cart(&state.pool, user_id).await?;
    let count = cart.items.len() as i64;
    Ok(ApiResponse::success("OK", cart, Some(Meta::single_page(count))))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    ensure_owner(user, user_id)?;
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let txn = state.orm.begin().await?;

    if Products::find_by_id(payload.product_id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound);
    }
    let stock = ProductSizes::find_by_id((payload.product_id, payload.size_id))
        .one(&txn)
        .await?
        .map(|ps| ps.stock)
        .ok_or(AppError::NotFound)?;
    ensure_in_stock(payload.quantity, stock)?;

    // Concurrent adds of the same line accumulate on the unique key.
    let line = CartItems::insert(CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        product_id: Set(payload.product_id),
        size_id: Set(payload.size_id),
        quantity: Set(payload.quantity),
        created_at: NotSet,
    })
    .on_conflict(
        OnConflict::columns([CartCol::UserId, CartCol::ProductId, CartCol::SizeId])
            .value(
                CartCol::Quantity,
                Expr::col((CartItems, CartCol::Quantity)).add(payload.quantity),
            )
            .to_owned(),
    )
    .exec_with_returning(&txn)
    .await?;

    let quantity = line.quantity;
    // Dropping the transaction here undoes the upsert.
    ensure_in_stock(quantity, stock)?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_add",
        "cart_items",
        serde_json::json!({
            "user_id": user_id,
            "product_id": payload.product_id,
            "size_id": payload.size_id,
            "quantity": quantity,
        }),
    )
    .await;

    let cart = load_cart(&state.pool, user_id).await?;
    Ok(ApiResponse::success("Added to cart", cart, None))
}

pub async fn update_cart_item(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    product_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartView>> {
    ensure_owner(user, user_id)?;
    if payload.quantity < 1 {
        return Err(AppError::BadRequest("quantity must be at least 1".into()));
    }

    let txn = state.orm.begin().await?;

    let item = CartItems::find()
        .filter(item_condition(user_id, product_id, Some(payload.size_id)))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let stock = ProductSizes::find_by_id((product_id, payload.size_id))
        .one(&txn)
        .await?
        .map(|ps| ps.stock)
        .unwrap_or(0);
    ensure_in_stock(payload.quantity, stock)?;

    let mut active: CartActive = item.into();
    active.quantity = Set(payload.quantity);
    active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_update",
        "cart_items",
        serde_json::json!({
            "user_id": user_id,
            "product_id": product_id,
            "size_id": payload.size_id,
            "quantity": payload.quantity,
        }),
    )
    .await;

    let cart = load_cart(&state.pool, user_id).await?;
    Ok(ApiResponse::success("Cart updated", cart, None))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    product_id: Uuid,
    size_id: Option<Uuid>,
) -> AppResult<ApiResponse<CartView>> {
    ensure_owner(user, user_id)?;
    let result = CartItems::delete_many()
        .filter(item_condition(user_id, product_id, size_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "cart_remove",
        "cart_items",
        serde_json::json!({ "user_id": user_id, "product_id": product_id, "size_id": size_id }),
    )
    .await;

    let cart = load_cart(&state.pool, user_id).await?;
    Ok(ApiResponse::success("Removed from cart", cart, None))
}

pub async fn clear_cart(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    ensure_owner(user, user_id)?;
    let result = CartItems::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .exec(&state.orm)
        .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_clear",
        "cart_items",
        serde_json::json!({ "user_id": user_id, "removed": result.rows_affected }),
    )
    .await;

    let cart = load_cart(&state.pool, user_id).await?;
    Ok(ApiResponse::success("Cart cleared", cart, Some(Meta::empty())))
}

fn item_condition(user_id: Uuid, product_id: Uuid, size_id: Option<Uuid>) -> Condition {
    let mut condition = Condition::all()
        .add(CartCol::UserId.eq(user_id))
        .add(CartCol::ProductId.eq(product_id));
    if let Some(size_id) = size_id {
        condition = condition.add(CartCol::SizeId.eq(size_id));
    }
    condition
}

/// A cart line may not ask for more than is on the shelf.
pub fn ensure_in_stock(quantity: i32, stock: i32) -> AppResult<()> {
    if quantity > stock {
        return Err(AppError::BadRequest(format!(
            "only {} item(s) left in stock",
            stock.max(0)
        )));
    }
    Ok(())
}
