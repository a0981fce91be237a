//! In-memory job store
//!
//! The store is the sole owner of job records after creation. The outer lock
//! only guards the identifier index; each record carries its own lock, so
//! writers to the same record are serialized while different records proceed
//! without contention. Critical sections never hold a lock across an await
//! point. Records live for the process lifetime; there is no eviction.

mod job_store;

pub use job_store::{JobFilter, JobStore, StoreError};
