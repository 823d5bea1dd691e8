use serde::Deserialize;
use utoipa::ToSchema;

use crate::order_status::OrderStatus;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// One of `прибыл`, `завершено`, `завершено_частично`.
    pub status: OrderStatus,
}
