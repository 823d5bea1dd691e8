use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    dto::catalog::{CategoryList, ProductDetail, ProductList, SubcategoryList},
    entity::{
        brands::Entity as Brands,
        categories::{Column as CategoryCol, Entity as Categories},
        product_sizes::{Column as ProductSizeCol, Entity as ProductSizes},
        products::{Column as ProdCol, Entity as Products},
        sizes::Column as SizeCol,
        sizes::Entity as Sizes,
        subcategories::{Column as SubcategoryCol, Entity as Subcategories, Model as SubcategoryModel},
    },
    error::{AppError, AppResult},
    models::{Category, ProductSize, Subcategory},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::{brand_from_entity, product_from_entity},
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        condition = condition.add(
            Condition::any()
                .add(Expr::col(ProdCol::Name).ilike(pattern.clone()))
                .add(Expr::col(ProdCol::Description).ilike(pattern)),
        );
    }

    if let Some(subcategory_id) = query.subcategory_id {
        condition = condition.add(ProdCol::SubcategoryId.eq(subcategory_id));
    } else if let Some(category_id) = query.category_id {
        let subcategory_ids: Vec<Uuid> = Subcategories::find()
            .filter(SubcategoryCol::CategoryId.eq(category_id))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();
        condition = condition.add(ProdCol::SubcategoryId.is_in(subcategory_ids));
    }

    if let Some(brand_id) = query.brand_id {
        condition = condition.add(ProdCol::BrandId.eq(brand_id));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(ProdCol::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(ProdCol::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => ProdCol::CreatedAt,
        ProductSortBy::Price => ProdCol::Price,
        ProductSortBy::Name => ProdCol::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };
    // Stable pages when the sort key ties.
    finder = finder.order_by_asc(ProdCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let brand = match product.brand_id {
        Some(brand_id) => Brands::find_by_id(brand_id)
            .one(&state.orm)
            .await?
            .map(brand_from_entity),
        None => None,
    };

    let sizes = ProductSizes::find()
        .filter(ProductSizeCol::ProductId.eq(product.id))
        .find_also_related(Sizes)
        .order_by_asc(SizeCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(product_size, size)| {
            size.map(|size| ProductSize {
                size_id: product_size.size_id,
                size_name: size.name,
                stock: product_size.stock,
            })
        })
        .collect();

    Ok(ApiResponse::success(
        "Product",
        ProductDetail {
            product: product_from_entity(product),
            brand,
            sizes,
        },
        None,
    ))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let categories = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?;
    let subcategories = Subcategories::find()
        .order_by_asc(SubcategoryCol::Name)
        .all(&state.orm)
        .await?;

    let mut by_category: HashMap<Uuid, Vec<Subcategory>> = HashMap::new();
    for sub in subcategories {
        by_category
            .entry(sub.category_id)
            .or_default()
            .push(subcategory_from_entity(sub));
    }

    let items = categories
        .into_iter()
        .map(|category| Category {
            subcategories: by_category.remove(&category.id).unwrap_or_default(),
            id: category.id,
            name: category.name,
        })
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn list_subcategories(
    state: &AppState,
    category_id: Option<Uuid>,
) -> AppResult<ApiResponse<SubcategoryList>> {
    let mut finder = Subcategories::find();
    if let Some(category_id) = category_id {
        finder = finder.filter(SubcategoryCol::CategoryId.eq(category_id));
    }
    let items = finder
        .order_by_asc(SubcategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(subcategory_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Subcategories",
        SubcategoryList { items },
        Some(Meta::empty()),
    ))
}

fn subcategory_from_entity(model: SubcategoryModel) -> Subcategory {
    Subcategory {
        id: model.id,
        category_id: model.category_id,
        name: model.name,
    }
}

/// Makes `%`, `_` and `\` in user input match literally inside an ILIKE pattern.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
