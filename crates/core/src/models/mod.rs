//! Records mirroring the backend's resources.
//!
//! These are plain data-transfer types with the derived conveniences the
//! web clients need (listing images, price ranges, cart totals). Nothing
//! here is authoritative; every value is recomputed from the latest fetch.

pub mod cart;
pub mod catalog;
pub mod order;
pub mod search;
pub mod user;
pub mod wishlist;

pub use cart::{Cart, CartItem};
pub use catalog::{Category, Image, PriceRange, Product, Variant};
pub use order::{Order, OrderItem};
pub use search::{IndexedCategory, IndexedProduct, IndexedVariant};
pub use user::User;
pub use wishlist::WishlistItem;
