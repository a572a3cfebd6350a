//! Typed resource clients
//!
//! Each client is a borrowed view over the shared `ApiClient`: it builds the
//! endpoint, runs it through the pipeline and decodes the answer. Bodies with
//! constraints are validated before anything is sent.

mod auth;
mod branch;
mod brand;
mod cart;
mod category;
mod customer;
mod guest_token;
mod menu;
mod order;
mod product;
mod supplier;
mod tenant;

pub use auth::Auth;
pub use branch::Branches;
pub use brand::Brands;
pub use cart::Carts;
pub use category::Categories;
pub use customer::Customers;
pub use guest_token::GuestTokens;
pub use menu::Menus;
pub use order::Orders;
pub use product::{Favorites, Products};
pub use supplier::{SortDirection, SupplierOrder, SupplierQuery, Suppliers};
pub use tenant::Tenants;
