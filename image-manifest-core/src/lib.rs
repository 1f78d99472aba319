#![doc = "image-manifest-core: build and resolve the product image manifest."]

//! The manifest indexes every image object under a bucket prefix by product
//! category or feature path. It is built offline from a bucket listing and
//! read at serve time.
//!
//! Data flows one way:
//! [`enumerate`] -> [`builder`] -> [`persist`] (and [`codegen`]) -> [`resolve`].
//! [`generate`] wires the offline half together.
//!
//! All I/O with the outside world goes through the traits in [`contract`].

pub mod builder;
pub mod codegen;
pub mod color;
pub mod config;
pub mod contract;
pub mod enumerate;
pub mod error;
pub mod generate;
pub mod manifest;
pub mod persist;
pub mod resolve;

pub use error::{ManifestError, Result};
