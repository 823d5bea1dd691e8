use chrono::Utc;

use crate::{
    entity::{
        brands::Model as BrandModel, order_items::Model as OrderItemModel,
        orders::Model as OrderModel, products::Model as ProductModel, users::Model as UserModel,
    },
    error::{AppError, AppResult},
    models::{Brand, Order, OrderItem, Product, Role, User},
    order_status::OrderStatus,
};

pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod courier_service;
pub mod order_service;
pub mod wishlist_service;

pub(crate) fn user_from_entity(model: UserModel) -> AppResult<User> {
    Ok(User {
        id: model.id,
        email: model.email,
        role: model.role.parse::<Role>().map_err(AppError::Internal)?,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        image_path: model.image_path,
        brand_id: model.brand_id,
        subcategory_id: model.subcategory_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn brand_from_entity(model: BrandModel) -> Brand {
    Brand {
        id: model.id,
        name: model.name,
        description: model.description,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn parse_status(raw: &str) -> AppResult<OrderStatus> {
    raw.parse::<OrderStatus>()
        .map_err(|err| AppError::Internal(err.into()))
}

pub(crate) fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        courier_id: model.courier_id,
        address: model.address,
        city: model.city,
        notes: model.notes,
        payment_provider: model.payment_provider,
        latitude: model.latitude,
        longitude: model.longitude,
        status: parse_status(&model.status)?,
        total: model.total,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

pub(crate) fn orders_from_entities(models: Vec<OrderModel>) -> AppResult<Vec<Order>> {
    models.into_iter().map(order_from_entity).collect()
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        size_id: model.size_id,
        quantity: model.quantity,
        price_at_purchase: model.price_at_purchase,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

/// Sum of `quantity × price_at_purchase`.
pub fn order_total(items: &[OrderItemModel]) -> i64 {
    items
        .iter()
        .map(|item| i64::from(item.quantity) * item.price_at_purchase)
        .sum()
}
