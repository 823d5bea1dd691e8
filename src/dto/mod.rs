pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod courier;
pub mod geocode;
pub mod orders;
pub mod wishlist;
