//! Aggregates module
pub mod bundle;
pub mod cart;
pub mod product;
pub mod user;

pub use bundle::{Bundle, BundleChanges, BundleView, DiscountCheck, NewBundle};
pub use cart::{Cart, CartItem, CartLine, CartView, ItemRef, ItemRequest, LineDetail};
pub use product::{NewProduct, Product, ProductChanges};
pub use user::{Credentials, Registration, User};
