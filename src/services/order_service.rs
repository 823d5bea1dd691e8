use chrono::Utc;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CheckoutRequest, OrderItemRemoval, OrderList, OrderWithItems},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        product_sizes::{Column as ProductSizeCol, Entity as ProductSizes},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner},
    order_status::OrderStatus,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{order_from_entity, order_item_from_entity, order_total, orders_from_entities, parse_status},
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_owner(user, user_id)?;
    let status = query.status_filter()?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(OrderCol::UserId.eq(user_id));
    if let Some(status) = status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList {
            items: orders_from_entities(orders)?,
        },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    order_id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_owner(user, user_id)?;
    let order = Orders::find()
        .filter(owned_order(user_id, order_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let data = with_items(&state.orm, order).await?;
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

/// Turns the user's cart into an order in one transaction.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_owner(user, user_id)?;
    payload.validate(&state.config.supported_country)?;

    let txn = state.orm.begin().await?;

    let mut cart = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    // Lock stock rows in a fixed order so concurrent checkouts cannot deadlock.
    cart.sort_by_key(|item| (item.product_id, item.size_id));

    let mut lines = Vec::with_capacity(cart.len());
    let mut total: i64 = 0;
    for item in &cart {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }
        let product = Products::find_by_id(item.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::BadRequest("A product in the cart no longer exists".into()))?;
        let stock = ProductSizes::find_by_id((item.product_id, item.size_id))
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .map(|ps| ps.stock)
            .unwrap_or(0);
        if stock < item.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for product {}",
                product.name
            )));
        }

        total = i64::from(item.quantity)
            .checked_mul(product.price)
            .and_then(|line| total.checked_add(line))
            .ok_or_else(|| AppError::BadRequest("Order total is too large".into()))?;
        lines.push((item.product_id, item.size_id, item.quantity, product.price));
    }

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        courier_id: Set(None),
        address: Set(payload.address.trim().to_string()),
        city: Set(payload.city.trim().to_string()),
        notes: Set(payload.normalized_notes()),
        payment_provider: Set(payload.payment_provider.as_str().to_string()),
        latitude: Set(payload.latitude),
        longitude: Set(payload.longitude),
        status: Set(OrderStatus::Placed.as_str().to_string()),
        total: Set(total),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for (product_id, size_id, quantity, price) in lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(product_id),
            size_id: Set(size_id),
            quantity: Set(quantity),
            price_at_purchase: Set(price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));

        ProductSizes::update_many()
            .col_expr(
                ProductSizeCol::Stock,
                Expr::col(ProductSizeCol::Stock).sub(quantity),
            )
            .filter(ProductSizeCol::ProductId.eq(product_id))
            .filter(ProductSizeCol::SizeId.eq(size_id))
            .exec(&txn)
            .await?;
    }

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(order_id = %order.id, user_id = %user_id, total, "order placed");
    audit::record(
        &state.pool,
        user.user_id,
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "total": total }),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout success",
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    order_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_owner(user, user_id)?;
    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(owned_order(user_id, order_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_editable(&order)?;

    let items = load_items(&txn, order.id).await?;
    restock(&txn, &items).await?;
    Orders::delete_by_id(order.id).exec(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "order_delete",
        "orders",
        serde_json::json!({ "order_id": order_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order deleted",
        serde_json::json!({ "order_id": order_id }),
        Some(Meta::empty()),
    ))
}

/// Removes one line from a placed order. Removing the last line deletes the order.
pub async fn remove_order_item(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    size_id: Uuid,
) -> AppResult<ApiResponse<OrderItemRemoval>> {
    ensure_owner(user, user_id)?;
    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(owned_order(user_id, order_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_editable(&order)?;

    let item = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .filter(OrderItemCol::ProductId.eq(product_id))
        .filter(OrderItemCol::SizeId.eq(size_id))
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    restock(&txn, std::slice::from_ref(&item)).await?;
    OrderItems::delete_by_id(item.id).exec(&txn).await?;

    let remaining = load_items(&txn, order.id).await?;
    let removal = if remaining.is_empty() {
        Orders::delete_by_id(order.id).exec(&txn).await?;
        OrderItemRemoval {
            order_deleted: true,
            order: None,
        }
    } else {
        let total = order_total(&remaining);
        let mut active: OrderActive = order.into();
        active.total = Set(total);
        active.updated_at = Set(Utc::now().into());
        let order = active.update(&txn).await?;
        OrderItemRemoval {
            order_deleted: false,
            order: Some(OrderWithItems {
                order: order_from_entity(order)?,
                items: remaining.into_iter().map(order_item_from_entity).collect(),
            }),
        }
    };

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "order_item_remove",
        "order_items",
        serde_json::json!({
            "order_id": order_id,
            "product_id": product_id,
            "size_id": size_id,
            "order_deleted": removal.order_deleted,
        }),
    )
    .await;

    let message = if removal.order_deleted {
        "Order deleted"
    } else {
        "Item removed"
    };
    Ok(ApiResponse::success(message, removal, Some(Meta::empty())))
}

pub(crate) async fn load_items<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> AppResult<Vec<OrderItemModel>> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .order_by_asc(OrderItemCol::Id)
        .all(conn)
        .await?;
    Ok(items)
}

pub(crate) async fn with_items<C: ConnectionTrait>(
    conn: &C,
    order: OrderModel,
) -> AppResult<OrderWithItems> {
    let items = load_items(conn, order.id)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();
    Ok(OrderWithItems {
        order: order_from_entity(order)?,
        items,
    })
}

/// Puts the items of an order back on the shelf. Stock rows are touched in
/// `(product_id, size_id)` order, the same order checkout locks them in.
pub(crate) async fn restock<C: ConnectionTrait>(
    conn: &C,
    items: &[OrderItemModel],
) -> AppResult<()> {
    let mut items: Vec<&OrderItemModel> = items.iter().collect();
    items.sort_by_key(|item| (item.product_id, item.size_id));
    for item in items {
        ProductSizes::update_many()
            .col_expr(
                ProductSizeCol::Stock,
                Expr::col(ProductSizeCol::Stock).add(item.quantity),
            )
            .filter(ProductSizeCol::ProductId.eq(item.product_id))
            .filter(ProductSizeCol::SizeId.eq(item.size_id))
            .exec(conn)
            .await?;
    }
    Ok(())
}

fn owned_order(user_id: Uuid, order_id: Uuid) -> Condition {
    Condition::all()
        .add(OrderCol::UserId.eq(user_id))
        .add(OrderCol::Id.eq(order_id))
}

fn ensure_editable(order: &OrderModel) -> AppResult<()> {
    let status = parse_status(&order.status)?;
    if !status.is_editable_by_customer() {
        return Err(AppError::Conflict(format!(
            "order can no longer be changed in status {status}"
        )));
    }
    Ok(())
}
