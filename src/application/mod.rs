//! Application layer: the operation boundary used by command handlers
//!
//! This layer turns operation descriptors into domain calls and shapes their results.

pub mod error;
pub mod operation;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use operation::{ErrorKind, OperationDescriptor, Outcome};
pub use services::TreeService;
