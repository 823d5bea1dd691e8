use marketplace_api::{
    config::AppConfig,
    db::{DbPool, create_orm_conn, raw_pool, run_migrations},
    models::Role,
    services::auth_service::hash_password,
};
use uuid::Uuid;

const SIZES: [&str; 5] = ["XS", "S", "M", "L", "XL"];

// (category, subcategories)
const CATEGORIES: [(&str, &[&str]); 3] = [
    ("Одежда", &["Футболки", "Худи", "Куртки"]),
    ("Обувь", &["Кроссовки", "Ботинки"]),
    ("Аксессуары", &["Кепки", "Рюкзаки"]),
];

const BRANDS: [(&str, &str); 3] = [
    ("Northwind", "Outdoor basics"),
    ("Urban Line", "City streetwear"),
    ("Trailhead", "Shoes for long walks"),
];

// (name, price in kopecks, brand, subcategory, image)
const PRODUCTS: [(&str, i64, &str, &str, &str); 6] = [
    ("Basic Tee", 129_900, "Urban Line", "Футболки", "products/basic-tee.jpg"),
    ("Logo Hoodie", 459_900, "Urban Line", "Худи", "products/logo-hoodie.jpg"),
    ("Storm Jacket", 1_249_000, "Northwind", "Куртки", "products/storm-jacket.jpg"),
    ("Runner 2", 899_000, "Trailhead", "Кроссовки", "products/runner-2.jpg"),
    ("Winter Boot", 1_099_000, "Trailhead", "Ботинки", "products/winter-boot.jpg"),
    ("Field Cap", 189_900, "Northwind", "Кепки", "products/field-cap.jpg"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;
    let pool = raw_pool(&orm);

    let admin_id = ensure_user(&pool, "admin@example.com", "admin123", Role::Admin).await?;
    let courier_id = ensure_user(&pool, "courier@example.com", "courier123", Role::Courier).await?;
    let customer_id = ensure_user(&pool, "user@example.com", "user123", Role::Customer).await?;
    seed_catalog(&pool).await?;

    println!(
        "Seed completed. Admin ID: {admin_id}, Courier ID: {courier_id}, Customer ID: {customer_id}"
    );
    Ok(())
}

async fn ensure_user(pool: &DbPool, email: &str, password: &str, role: Role) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

/// Upserts by unique name and returns the row id either way.
async fn upsert_named(pool: &DbPool, table: &str, name: &str) -> anyhow::Result<Uuid> {
    let sql = format!(
        "INSERT INTO {table} (id, name) VALUES ($1, $2) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name RETURNING id"
    );
    let (id,): (Uuid,) = sqlx::query_as(&sql)
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

async fn seed_catalog(pool: &DbPool) -> anyhow::Result<()> {
    let mut size_ids = Vec::with_capacity(SIZES.len());
    for size in SIZES {
        size_ids.push(upsert_named(pool, "sizes", size).await?);
    }

    let mut subcategory_ids = Vec::new();
    for (category, subcategories) in CATEGORIES {
        let category_id = upsert_named(pool, "categories", category).await?;
        for name in subcategories {
            let (id,): (Uuid,) = sqlx::query_as(
                r#"
                INSERT INTO subcategories (id, category_id, name)
                VALUES ($1, $2, $3)
                ON CONFLICT (category_id, name) DO UPDATE SET name = EXCLUDED.name
                RETURNING id
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(category_id)
            .bind(*name)
            .fetch_one(pool)
            .await?;
            subcategory_ids.push((*name, id));
        }
    }

    let mut brand_ids = Vec::with_capacity(BRANDS.len());
    for (name, description) in BRANDS {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO brands (id, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE SET description = EXCLUDED.description
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .fetch_one(pool)
        .await?;
        brand_ids.push((name, id));
    }

    for (name, price, brand, subcategory, image) in PRODUCTS {
        let brand_id = brand_ids.iter().find(|(n, _)| *n == brand).map(|(_, id)| *id);
        let subcategory_id = subcategory_ids
            .iter()
            .find(|(n, _)| *n == subcategory)
            .map(|(_, id)| *id);

        let (product_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO products (id, name, description, price, image_path, brand_id, subcategory_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (name) DO UPDATE SET price = EXCLUDED.price, image_path = EXCLUDED.image_path
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(format!("{name} by {brand}"))
        .bind(price)
        .bind(image)
        .bind(brand_id)
        .bind(subcategory_id)
        .fetch_one(pool)
        .await?;

        for size_id in &size_ids {
            sqlx::query(
                r#"
                INSERT INTO product_sizes (product_id, size_id, stock)
                VALUES ($1, $2, $3)
                ON CONFLICT (product_id, size_id) DO NOTHING
                "#,
            )
            .bind(product_id)
            .bind(size_id)
            .bind(10_i32)
            .execute(pool)
            .await?;
        }
    }

    println!("Seeded {} products", PRODUCTS.len());
    Ok(())
}
