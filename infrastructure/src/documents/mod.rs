//! Document publication adapters

mod local;

pub use local::LocalDocumentStore;
