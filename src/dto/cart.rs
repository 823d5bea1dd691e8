use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::CartItem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub size_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub size_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RemoveCartItemQuery {
    /// Remove only this size; every size of the product when absent.
    pub size_id: Option<Uuid>,
}

/// The authoritative cart, returned by every cart read and mutation.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total_quantity: i64,
    pub total_price: i64,
}

impl CartView {
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let total_quantity = items.iter().map(|item| i64::from(item.quantity)).sum();
        let total_price = items
            .iter()
            .map(|item| item.price * i64::from(item.quantity))
            .sum();
        Self {
            items,
            total_quantity,
            total_price,
        }
    }
}
