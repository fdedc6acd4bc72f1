//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the child-type policy seam but are themselves concrete structs.

mod tree;

pub use tree::TreeService;
