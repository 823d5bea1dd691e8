#![allow(dead_code)]

use marketplace_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        product_sizes::ActiveModel as ProductSizeActive, products::ActiveModel as ProductActive,
        sizes::ActiveModel as SizeActive, users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    models::Role,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

/// Integration tests need Postgres; they return early when none is configured.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        jwt_ttl_hours: 1,
        supported_country: "ru".into(),
        geocoder_url: "http://127.0.0.1:9".into(),
        geocoder_user_agent: "marketplace-api-tests".into(),
        static_dir: "static".into(),
        concurrency_limit: 10,
    };
    Ok(Some(AppState::new(orm, config)?))
}

/// Inserts a user with a unique email and returns the matching principal.
pub async fn create_user(state: &AppState, role: Role) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(format!("{}-{}@example.com", role, Uuid::new_v4())),
        password_hash: Set("dummy".into()),
        role: Set(role.as_str().into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role,
    })
}

pub struct SeededProduct {
    pub product_id: Uuid,
    pub size_id: Uuid,
    pub price: i64,
}

/// A product with a single size holding `stock` units.
pub async fn create_product(state: &AppState, price: i64, stock: i32) -> anyhow::Result<SeededProduct> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Test Tee {}", Uuid::new_v4())),
        description: Set(Some("A product for testing".into())),
        price: Set(price),
        image_path: Set(None),
        brand_id: Set(None),
        subcategory_id: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let size = SizeActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("M-{}", Uuid::new_v4())),
    }
    .insert(&state.orm)
    .await?;

    ProductSizeActive {
        product_id: Set(product.id),
        size_id: Set(size.id),
        stock: Set(stock),
    }
    .insert(&state.orm)
    .await?;

    Ok(SeededProduct {
        product_id: product.id,
        size_id: size.id,
        price,
    })
}

pub async fn stock_of(state: &AppState, product: &SeededProduct) -> anyhow::Result<i32> {
    use marketplace_api::entity::product_sizes::Entity as ProductSizes;
    use sea_orm::EntityTrait;

    let row = ProductSizes::find_by_id((product.product_id, product.size_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product size missing"))?;
    Ok(row.stock)
}
