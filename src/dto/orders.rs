use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppError,
    models::{Order, OrderItem, PaymentProvider},
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub address: String,
    pub city: String,
    pub notes: Option<String>,
    pub payment_provider: PaymentProvider,
    pub latitude: f64,
    pub longitude: f64,
    /// Country of the delivery point as reported by `/reverse-geocode`.
    pub country_code: String,
}

impl CheckoutRequest {
    /// Rejects the request before anything is written.
    pub fn validate(&self, supported_country: &str) -> Result<(), AppError> {
        if self.address.trim().is_empty() {
            return Err(AppError::BadRequest("address is required".into()));
        }
        if self.city.trim().is_empty() {
            return Err(AppError::BadRequest("city is required".into()));
        }
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AppError::BadRequest("latitude is out of range".into()));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AppError::BadRequest("longitude is out of range".into()));
        }
        if !self
            .country_code
            .trim()
            .eq_ignore_ascii_case(supported_country.trim())
        {
            return Err(AppError::BadRequest(format!(
                "delivery is only available in {}",
                supported_country.to_uppercase()
            )));
        }
        Ok(())
    }

    /// Notes with surrounding whitespace removed; blank notes become `None`.
    pub fn normalized_notes(&self) -> Option<String> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

/// Result of removing one item from an order.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemRemoval {
    /// True when the removed item was the last one and the order is gone.
    pub order_deleted: bool,
    pub order: Option<OrderWithItems>,
}
