//! Research job model: strategies, job entity, state machine and value objects

pub mod context;
pub mod entities;
pub mod strategy;
pub mod value_objects;
