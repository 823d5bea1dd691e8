use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Brand, Category, Product, ProductSize, Subcategory};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: Product,
    pub brand: Option<Brand>,
    pub sizes: Vec<ProductSize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubcategoryList {
    pub items: Vec<Subcategory>,
}
