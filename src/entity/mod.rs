pub mod brands;
pub mod cart_items;
pub mod categories;
pub mod order_items;
pub mod orders;
pub mod product_sizes;
pub mod products;
pub mod sizes;
pub mod subcategories;
pub mod users;
pub mod wishlist_items;

pub use brands::Entity as Brands;
pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_sizes::Entity as ProductSizes;
pub use products::Entity as Products;
pub use sizes::Entity as Sizes;
pub use subcategories::Entity as Subcategories;
pub use users::Entity as Users;
pub use wishlist_items::Entity as WishlistItems;
