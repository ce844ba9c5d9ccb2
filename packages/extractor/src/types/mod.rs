//! Domain types: schemas, model catalog, documents and batch results.

pub mod document;
pub mod model;
pub mod schema;
