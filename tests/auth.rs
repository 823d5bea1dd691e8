use marketplace_api::{
    config::AppConfig,
    error::AppError,
    middleware::auth::{AuthUser, decode_token, ensure_admin, ensure_courier, ensure_owner},
    models::Role,
    services::auth_service::{hash_password, issue_token, verify_password},
};
use uuid::Uuid;

fn config() -> AppConfig {
    AppConfig {
        database_url: String::new(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        jwt_ttl_hours: 1,
        supported_country: "ru".into(),
        geocoder_url: "http://127.0.0.1:9".into(),
        geocoder_user_agent: "marketplace-api-tests".into(),
        static_dir: "static".into(),
        concurrency_limit: 10,
    }
}

#[test]
fn issued_token_decodes_to_same_user() {
    let config = config();
    let user_id = Uuid::new_v4();
    let token = issue_token(&config, user_id, Role::Courier).unwrap();

    let user = decode_token(&token, &config.jwt_secret).unwrap();
    assert_eq!(user.user_id, user_id);
    assert_eq!(user.role, Role::Courier);
}

#[test]
fn token_signed_with_other_secret_is_rejected() {
    let token = issue_token(&config(), Uuid::new_v4(), Role::Customer).unwrap();
    let err = decode_token(&token, "another-secret").unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[test]
fn oversized_token_lifetime_is_an_error() {
    let mut config = config();
    config.jwt_ttl_hours = i64::MAX;
    let err = issue_token(&config, Uuid::new_v4(), Role::Customer).unwrap_err();
    assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn password_hash_verifies() {
    let hash = hash_password("secret123").unwrap();
    assert!(verify_password("secret123", &hash).unwrap());
    assert!(!verify_password("wrong", &hash).unwrap());
}

#[test]
fn owners_and_admins_reach_user_resources() {
    let owner = AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Customer,
    };
    let stranger = AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Customer,
    };
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Admin,
    };

    assert!(ensure_owner(&owner, owner.user_id).is_ok());
    assert!(ensure_owner(&admin, owner.user_id).is_ok());
    assert!(matches!(
        ensure_owner(&stranger, owner.user_id),
        Err(AppError::Forbidden)
    ));
}

#[test]
fn role_guards() {
    let customer = AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Customer,
    };
    let courier = AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Courier,
    };
    assert!(ensure_courier(&customer).is_err());
    assert!(ensure_courier(&courier).is_ok());
    assert!(ensure_admin(&courier).is_err());
}
