//! Products domain module.
//!
//! Catalog entries shown on the landing page. Pure domain logic only: the
//! rules for a valid product and how it changes, with no IO or storage.

pub mod product;

pub use product::{NewProduct, Product, ProductName};
