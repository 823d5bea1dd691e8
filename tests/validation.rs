use axum::http::StatusCode;
use marketplace_api::{
    dto::{
        cart::CartView,
        orders::CheckoutRequest,
    },
    error::AppError,
    models::{CartItem, PaymentProvider},
    order_status::{OrderAction, OrderStatus},
    routes::params::{OrderListQuery, Pagination},
    services::{cart_service::ensure_in_stock, catalog_service::escape_like},
};
use uuid::Uuid;

fn checkout_request() -> CheckoutRequest {
    CheckoutRequest {
        address: "ул. Ленина, 1".into(),
        city: "Москва".into(),
        notes: Some("  ring twice ".into()),
        payment_provider: PaymentProvider::Card,
        latitude: 55.75,
        longitude: 37.61,
        country_code: "RU".into(),
    }
}

#[test]
fn checkout_accepts_supported_country_case_insensitively() {
    assert!(checkout_request().validate("ru").is_ok());
}

#[test]
fn checkout_rejects_other_countries() {
    let mut req = checkout_request();
    req.country_code = "kz".into();
    let err = req.validate("ru").unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn checkout_requires_address_and_city() {
    let mut req = checkout_request();
    req.address = "   ".into();
    assert!(matches!(req.validate("ru"), Err(AppError::BadRequest(_))));

    let mut req = checkout_request();
    req.city = String::new();
    assert!(matches!(req.validate("ru"), Err(AppError::BadRequest(_))));
}

#[test]
fn checkout_rejects_out_of_range_coordinates() {
    let mut req = checkout_request();
    req.latitude = 91.0;
    assert!(req.validate("ru").is_err());

    let mut req = checkout_request();
    req.longitude = f64::NAN;
    assert!(req.validate("ru").is_err());
}

#[test]
fn payment_provider_uses_lowercase_wire_names() {
    let provider: PaymentProvider = serde_json::from_str("\"cash\"").unwrap();
    assert_eq!(provider, PaymentProvider::Cash);
    assert!(serde_json::from_str::<PaymentProvider>("\"crypto\"").is_err());
}

#[test]
fn notes_are_trimmed_and_blank_notes_dropped() {
    assert_eq!(
        checkout_request().normalized_notes().as_deref(),
        Some("ring twice")
    );
    let mut req = checkout_request();
    req.notes = Some("   ".into());
    assert_eq!(req.normalized_notes(), None);
}

#[test]
fn pagination_defaults_and_clamps() {
    assert_eq!(Pagination::default().normalize(), (1, 20, 0));
    assert_eq!(Pagination::new(Some(3), Some(10)).normalize(), (3, 10, 20));
    assert_eq!(Pagination::new(Some(0), Some(1000)).normalize(), (1, 100, 0));
}

#[test]
fn huge_page_number_saturates_offset() {
    assert_eq!(
        Pagination::new(Some(i64::MAX), Some(100)).normalize(),
        (i64::MAX, 100, i64::MAX)
    );
    assert_eq!(
        Pagination::new(Some(i64::MIN), Some(i64::MIN)).normalize(),
        (1, 1, 0)
    );
}

#[test]
fn search_wildcards_match_literally() {
    assert_eq!(escape_like("50%_off"), "50\\%\\_off");
    assert_eq!(escape_like("a\\b"), "a\\\\b");
    assert_eq!(escape_like("кроссовки"), "кроссовки");
}

#[test]
fn order_status_filter_parses_wire_names() {
    let query = OrderListQuery {
        status: Some("прибыл".into()),
        ..Default::default()
    };
    assert_eq!(query.status_filter().unwrap(), Some(OrderStatus::Arrived));

    let blank = OrderListQuery {
        status: Some(" ".into()),
        ..Default::default()
    };
    assert_eq!(blank.status_filter().unwrap(), None);

    let unknown = OrderListQuery {
        status: Some("shipped".into()),
        ..Default::default()
    };
    assert!(matches!(unknown.status_filter(), Err(AppError::BadRequest(_))));
}

#[test]
fn cart_view_totals_follow_items() {
    let item = |quantity, price| CartItem {
        product_id: Uuid::new_v4(),
        size_id: Uuid::new_v4(),
        size_name: "M".into(),
        quantity,
        price,
        name: "Tee".into(),
        image_path: None,
    };
    let view = CartView::from_items(vec![item(2, 1_500), item(1, 700)]);
    assert_eq!(view.total_quantity, 3);
    assert_eq!(view.total_price, 3_700);

    let empty = CartView::from_items(Vec::new());
    assert_eq!((empty.total_quantity, empty.total_price), (0, 0));
}

#[test]
fn stock_check_rejects_overdraw() {
    assert!(ensure_in_stock(3, 3).is_ok());
    assert!(matches!(ensure_in_stock(4, 3), Err(AppError::BadRequest(_))));
}

#[test]
fn errors_map_to_http_statuses() {
    assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        AppError::Unauthorized("x".into()).status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(AppError::Upstream("x".into()).status(), StatusCode::BAD_GATEWAY);

    let transition = OrderStatus::Placed
        .apply(OrderAction::Complete)
        .unwrap_err();
    assert_eq!(AppError::from(transition).status(), StatusCode::CONFLICT);
}
