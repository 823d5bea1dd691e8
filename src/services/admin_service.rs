use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        admin::{BrandList, CreateBrandRequest, DispatchOrderRequest, GrantCourierRequest, UserList},
        orders::{OrderList, OrderWithItems},
    },
    entity::{
        brands::{ActiveModel as BrandActive, Column as BrandCol, Entity as Brands},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Brand, Role, User},
    order_status::{OrderAction, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{brand_from_entity, order_service, orders_from_entities, parse_status, user_from_entity},
    state::AppState,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let status = query.status_filter()?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
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
        "Orders",
        OrderList {
            items: orders_from_entities(orders)?,
        },
        Some(meta),
    ))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let data = order_service::with_items(&state.orm, order).await?;
    Ok(ApiResponse::success("Order found", data, Some(Meta::empty())))
}

/// Hands a placed order to a specific courier, who then has to accept it.
pub async fn dispatch_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: DispatchOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(user)?;

    let courier = Users::find_by_id(payload.courier_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("courier not found".into()))?;
    if courier.role != Role::Courier.as_str() {
        return Err(AppError::BadRequest("user is not a courier".into()));
    }

    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let from = parse_status(&order.status)?;
    let next = from.apply(OrderAction::Dispatch)?;

    let mut active: OrderActive = order.into();
    active.courier_id = Set(Some(courier.id));
    active.status = Set(next.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id = %order.id, courier_id = %courier.id, "order dispatched");
    audit::record(
        &state.pool,
        user.user_id,
        "order_dispatch",
        "orders",
        serde_json::json!({ "order_id": order.id, "courier_id": courier.id }),
    )
    .await;

    let data = order_service::with_items(&state.orm, order).await?;
    Ok(ApiResponse::success("Order dispatched", data, Some(Meta::empty())))
}

pub async fn list_couriers(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let items = Users::find()
        .filter(UserCol::Role.eq(Role::Courier.as_str()))
        .order_by_asc(UserCol::Email)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect::<AppResult<Vec<User>>>()?;

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Couriers",
        UserList { items },
        Some(Meta::single_page(total)),
    ))
}

pub async fn grant_courier(
    state: &AppState,
    user: &AuthUser,
    payload: GrantCourierRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let target = Users::find_by_id(payload.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if target.role == Role::Admin.as_str() {
        return Err(AppError::BadRequest("cannot change the role of an admin".into()));
    }

    let mut active: UserActive = target.into();
    active.role = Set(Role::Courier.as_str().to_string());
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "courier_grant",
        "users",
        serde_json::json!({ "user_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Courier added",
        user_from_entity(updated)?,
        Some(Meta::empty()),
    ))
}

pub async fn revoke_courier(
    state: &AppState,
    user: &AuthUser,
    courier_id: Uuid,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let target = Users::find()
        .filter(UserCol::Id.eq(courier_id))
        .filter(UserCol::Role.eq(Role::Courier.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let active_statuses = [
        OrderStatus::Awaiting.as_str(),
        OrderStatus::InTransit.as_str(),
        OrderStatus::Arrived.as_str(),
    ];
    let open_orders = Orders::find()
        .filter(OrderCol::CourierId.eq(courier_id))
        .filter(OrderCol::Status.is_in(active_statuses))
        .count(&state.orm)
        .await?;
    if open_orders > 0 {
        return Err(AppError::Conflict(format!(
            "courier still has {open_orders} open order(s)"
        )));
    }

    let mut active: UserActive = target.into();
    active.role = Set(Role::Customer.as_str().to_string());
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "courier_revoke",
        "users",
        serde_json::json!({ "user_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Courier removed",
        user_from_entity(updated)?,
        Some(Meta::empty()),
    ))
}

pub async fn list_brands(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<BrandList>> {
    ensure_admin(user)?;
    let items: Vec<Brand> = Brands::find()
        .order_by_asc(BrandCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(brand_from_entity)
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Brands",
        BrandList { items },
        Some(Meta::single_page(total)),
    ))
}

pub async fn create_brand(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBrandRequest,
) -> AppResult<ApiResponse<Brand>> {
    ensure_admin(user)?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("brand name is required".into()));
    }

    let exists = Brands::find()
        .filter(BrandCol::Name.eq(name.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::BadRequest("Brand already exists".into()));
    }

    let brand = BrandActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(payload.description.filter(|d| !d.trim().is_empty())),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "brand_create",
        "brands",
        serde_json::json!({ "brand_id": brand.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Brand created",
        brand_from_entity(brand),
        Some(Meta::empty()),
    ))
}

pub async fn delete_brand(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Brands::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "brand_delete",
        "brands",
        serde_json::json!({ "brand_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
