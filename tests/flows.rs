mod common;

use common::{create_product, create_user, setup_state, stock_of};
use marketplace_api::{
    dto::{
        admin::DispatchOrderRequest,
        cart::{AddToCartRequest, UpdateCartItemRequest},
        courier::UpdateOrderStatusRequest,
        orders::CheckoutRequest,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{PaymentProvider, Role},
    order_status::OrderStatus,
    routes::params::{OrderListQuery, Pagination},
    services::{admin_service, cart_service, courier_service, order_service, wishlist_service},
    state::AppState,
};
use uuid::Uuid;

fn checkout_request(country_code: &str) -> CheckoutRequest {
    CheckoutRequest {
        address: "ул. Тверская, 7".into(),
        city: "Москва".into(),
        notes: None,
        payment_provider: PaymentProvider::Cash,
        latitude: 55.76,
        longitude: 37.61,
        country_code: country_code.into(),
    }
}

async fn add(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    size_id: Uuid,
    quantity: i32,
) -> Result<(), AppError> {
    cart_service::add_to_cart(
        state,
        user,
        user.user_id,
        AddToCartRequest {
            product_id,
            size_id,
            quantity,
        },
    )
    .await
    .map(|_| ())
}

// Cart: add twice accumulates, set quantity, stock is enforced, other users are locked out.
#[tokio::test]
async fn cart_tracks_quantities_and_stock() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Customer).await?;
    let stranger = create_user(&state, Role::Customer).await?;
    let product = create_product(&state, 1_000, 5).await?;

    add(&state, &customer, product.product_id, product.size_id, 2).await?;
    add(&state, &customer, product.product_id, product.size_id, 1).await?;

    let cart = cart_service::get_cart(&state, &customer, customer.user_id)
        .await?
        .data
        .unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.total_quantity, 3);
    assert_eq!(cart.total_price, 3_000);

    let over = add(&state, &customer, product.product_id, product.size_id, 3).await;
    assert!(matches!(over, Err(AppError::BadRequest(_))));

    let updated = cart_service::update_cart_item(
        &state,
        &customer,
        customer.user_id,
        product.product_id,
        UpdateCartItemRequest {
            size_id: product.size_id,
            quantity: 5,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.total_quantity, 5);

    let zero = cart_service::update_cart_item(
        &state,
        &customer,
        customer.user_id,
        product.product_id,
        UpdateCartItemRequest {
            size_id: product.size_id,
            quantity: 0,
        },
    )
    .await;
    assert!(matches!(zero, Err(AppError::BadRequest(_))));

    let foreign = cart_service::get_cart(&state, &stranger, customer.user_id).await;
    assert!(matches!(foreign, Err(AppError::Forbidden)));

    let cleared = cart_service::clear_cart(&state, &customer, customer.user_id)
        .await?
        .data
        .unwrap();
    assert!(cleared.items.is_empty());
    assert_eq!(cleared.total_price, 0);

    Ok(())
}

// Checkout snapshots prices, decrements stock and empties the cart.
#[tokio::test]
async fn checkout_places_order_and_rejects_other_countries() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Customer).await?;
    let tee = create_product(&state, 1_500, 10).await?;
    let cap = create_product(&state, 700, 3).await?;

    add(&state, &customer, tee.product_id, tee.size_id, 2).await?;
    add(&state, &customer, cap.product_id, cap.size_id, 1).await?;

    let rejected =
        order_service::checkout(&state, &customer, customer.user_id, checkout_request("kz")).await;
    assert!(matches!(rejected, Err(AppError::BadRequest(_))));
    let none = order_service::list_orders(&state, &customer, customer.user_id, OrderListQuery::default())
        .await?
        .data
        .unwrap();
    assert!(none.items.is_empty());

    let placed = order_service::checkout(&state, &customer, customer.user_id, checkout_request("RU"))
        .await?
        .data
        .unwrap();
    assert_eq!(placed.order.status, OrderStatus::Placed);
    assert_eq!(placed.order.total, 2 * tee.price + cap.price);
    assert_eq!(placed.items.len(), 2);
    assert!(placed
        .items
        .iter()
        .any(|item| item.product_id == tee.product_id && item.price_at_purchase == tee.price));

    assert_eq!(stock_of(&state, &tee).await?, 8);
    assert_eq!(stock_of(&state, &cap).await?, 2);

    let cart = cart_service::get_cart(&state, &customer, customer.user_id)
        .await?
        .data
        .unwrap();
    assert!(cart.items.is_empty());

    let empty = order_service::checkout(&state, &customer, customer.user_id, checkout_request("ru")).await;
    assert!(matches!(empty, Err(AppError::BadRequest(_))));

    Ok(())
}

// Removing items recomputes the total; removing the last one deletes the order.
#[tokio::test]
async fn removing_last_item_deletes_order() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Customer).await?;
    let tee = create_product(&state, 1_500, 4).await?;
    let cap = create_product(&state, 700, 4).await?;

    add(&state, &customer, tee.product_id, tee.size_id, 1).await?;
    add(&state, &customer, cap.product_id, cap.size_id, 2).await?;
    let order = order_service::checkout(&state, &customer, customer.user_id, checkout_request("ru"))
        .await?
        .data
        .unwrap()
        .order;

    let first = order_service::remove_order_item(
        &state,
        &customer,
        customer.user_id,
        order.id,
        tee.product_id,
        tee.size_id,
    )
    .await?
    .data
    .unwrap();
    assert!(!first.order_deleted);
    assert_eq!(first.order.unwrap().order.total, 2 * cap.price);
    assert_eq!(stock_of(&state, &tee).await?, 4);

    let last = order_service::remove_order_item(
        &state,
        &customer,
        customer.user_id,
        order.id,
        cap.product_id,
        cap.size_id,
    )
    .await?
    .data
    .unwrap();
    assert!(last.order_deleted);
    assert!(last.order.is_none());
    assert_eq!(stock_of(&state, &cap).await?, 4);

    let gone = order_service::get_order(&state, &customer, customer.user_id, order.id).await;
    assert!(matches!(gone, Err(AppError::NotFound)));

    let again = order_service::remove_order_item(
        &state,
        &customer,
        customer.user_id,
        order.id,
        cap.product_id,
        cap.size_id,
    )
    .await;
    assert!(matches!(again, Err(AppError::NotFound)));
    assert_eq!(stock_of(&state, &cap).await?, 4);

    Ok(())
}

// Courier takes an order, delivers it, and cannot skip or rewind stages.
#[tokio::test]
async fn courier_walks_order_through_delivery() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Customer).await?;
    let courier = create_user(&state, Role::Courier).await?;
    let other_courier = create_user(&state, Role::Courier).await?;
    let product = create_product(&state, 2_000, 5).await?;

    add(&state, &customer, product.product_id, product.size_id, 1).await?;
    let order = order_service::checkout(&state, &customer, customer.user_id, checkout_request("ru"))
        .await?
        .data
        .unwrap()
        .order;

    let available =
        courier_service::available_orders(&state, &courier, Pagination::new(Some(1), Some(100)))
            .await?;
    assert!(available.meta.and_then(|m| m.total).unwrap_or(0) >= 1);
    assert!(available
        .data
        .unwrap()
        .items
        .iter()
        .all(|o| o.status == OrderStatus::Placed || o.courier_id == Some(courier.user_id)));

    let not_yet = courier_service::update_status(
        &state,
        &courier,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Completed,
        },
    )
    .await;
    assert!(matches!(not_yet, Err(AppError::Conflict(_))));
    let unchanged = order_service::get_order(&state, &customer, customer.user_id, order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(unchanged.order.status, OrderStatus::Placed);
    assert_eq!(unchanged.order.courier_id, None);

    let taken = courier_service::accept_order(&state, &courier, order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(taken.order.status, OrderStatus::InTransit);
    assert_eq!(taken.order.courier_id, Some(courier.user_id));

    let hijack = courier_service::update_status(
        &state,
        &other_courier,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Arrived,
        },
    )
    .await;
    assert!(matches!(hijack, Err(AppError::Forbidden)));

    let locked = order_service::delete_order(&state, &customer, customer.user_id, order.id).await;
    assert!(matches!(locked, Err(AppError::Conflict(_))));

    let arrived = courier_service::update_status(
        &state,
        &courier,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Arrived,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(arrived.order.status, OrderStatus::Arrived);

    let done = courier_service::update_status(
        &state,
        &courier,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Completed,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(done.order.status, OrderStatus::Completed);

    let rewind = courier_service::cancel_order(&state, &courier, order.id).await;
    assert!(matches!(rewind, Err(AppError::Conflict(_))));
    let unchanged = order_service::get_order(&state, &customer, customer.user_id, order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(unchanged.order.status, OrderStatus::Completed);

    let mine = courier_service::my_orders(
        &state,
        &courier,
        OrderListQuery {
            status: Some("завершено".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert!(mine.items.iter().any(|o| o.id == order.id));

    Ok(())
}

// Admin dispatch puts the order in ожидает; cancelling it restores stock and frees the courier.
#[tokio::test]
async fn dispatched_order_cancel_restocks() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, Role::Admin).await?;
    let customer = create_user(&state, Role::Customer).await?;
    let courier = create_user(&state, Role::Courier).await?;
    let product = create_product(&state, 900, 3).await?;

    add(&state, &customer, product.product_id, product.size_id, 2).await?;
    let order = order_service::checkout(&state, &customer, customer.user_id, checkout_request("ru"))
        .await?
        .data
        .unwrap()
        .order;
    assert_eq!(stock_of(&state, &product).await?, 1);

    let not_courier = admin_service::dispatch_order(
        &state,
        &admin,
        order.id,
        DispatchOrderRequest {
            courier_id: customer.user_id,
        },
    )
    .await;
    assert!(matches!(not_courier, Err(AppError::BadRequest(_))));

    let dispatched = admin_service::dispatch_order(
        &state,
        &admin,
        order.id,
        DispatchOrderRequest {
            courier_id: courier.user_id,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(dispatched.order.status, OrderStatus::Awaiting);

    let busy = admin_service::revoke_courier(&state, &admin, courier.user_id).await;
    assert!(matches!(busy, Err(AppError::Conflict(_))));

    let cancelled = courier_service::cancel_order(&state, &courier, order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&state, &product).await?, 3);

    let revoked = admin_service::revoke_courier(&state, &admin, courier.user_id)
        .await?
        .data
        .unwrap();
    assert_eq!(revoked.role, Role::Customer);

    Ok(())
}

#[tokio::test]
async fn wishlist_add_is_idempotent() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Customer).await?;
    let product = create_product(&state, 500, 1).await?;

    wishlist_service::add_to_wishlist(&state, &customer, customer.user_id, product.product_id).await?;
    wishlist_service::add_to_wishlist(&state, &customer, customer.user_id, product.product_id).await?;

    let list = wishlist_service::list_wishlist(&state, &customer, customer.user_id, Pagination::default()).await?;
    assert_eq!(list.meta.and_then(|m| m.total), Some(1));
    assert_eq!(list.data.unwrap().items[0].id, product.product_id);

    let missing =
        wishlist_service::add_to_wishlist(&state, &customer, customer.user_id, Uuid::new_v4()).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    wishlist_service::remove_from_wishlist(&state, &customer, customer.user_id, product.product_id).await?;
    let again =
        wishlist_service::remove_from_wishlist(&state, &customer, customer.user_id, product.product_id).await;
    assert!(matches!(again, Err(AppError::NotFound)));

    Ok(())
}

// Parallel adds of the same line collapse into one row instead of racing the unique key.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_share_one_line() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Customer).await?;
    let product = create_product(&state, 900, 20).await?;

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let state = state.clone();
        let customer = customer.clone();
        let product_id = product.product_id;
        let size_id = product.size_id;
        tasks.spawn(async move {
            wishlist_service::add_to_wishlist(&state, &customer, customer.user_id, product_id)
                .await?;
            add(&state, &customer, product_id, size_id, 1).await
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined??;
    }

    let list = wishlist_service::list_wishlist(&state, &customer, customer.user_id, Pagination::default()).await?;
    assert_eq!(list.meta.and_then(|m| m.total), Some(1));

    let cart = cart_service::get_cart(&state, &customer, customer.user_id)
        .await?
        .data
        .unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 8);
    assert_eq!(stock_of(&state, &product).await?, 20);

    Ok(())
}

// Deleting orders restocks while other customers check out the same products.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn delete_and_checkout_run_side_by_side() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let first = create_product(&state, 1_000, 100).await?;
    let second = create_product(&state, 2_000, 100).await?;

    let mut placed = Vec::new();
    for _ in 0..4 {
        let customer = create_user(&state, Role::Customer).await?;
        add(&state, &customer, second.product_id, second.size_id, 1).await?;
        add(&state, &customer, first.product_id, first.size_id, 1).await?;
        let order = order_service::checkout(&state, &customer, customer.user_id, checkout_request("ru"))
            .await?
            .data
            .unwrap()
            .order;
        placed.push((customer, order.id));
    }

    let mut shoppers = Vec::new();
    for _ in 0..4 {
        let customer = create_user(&state, Role::Customer).await?;
        add(&state, &customer, first.product_id, first.size_id, 1).await?;
        add(&state, &customer, second.product_id, second.size_id, 1).await?;
        shoppers.push(customer);
    }

    let mut tasks = tokio::task::JoinSet::new();
    for (customer, order_id) in placed {
        let state = state.clone();
        tasks.spawn(async move {
            order_service::delete_order(&state, &customer, customer.user_id, order_id)
                .await
                .map(|_| ())
        });
    }
    for customer in shoppers {
        let state = state.clone();
        tasks.spawn(async move {
            order_service::checkout(&state, &customer, customer.user_id, checkout_request("ru"))
                .await
                .map(|_| ())
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined??;
    }

    assert_eq!(stock_of(&state, &first).await?, 96);
    assert_eq!(stock_of(&state, &second).await?, 96);

    Ok(())
}
