pub mod lease;
pub mod model;
pub mod registry;

pub use lease::JobLease;
pub use model::JobRecord;
pub use registry::{JobRegistry, RegistryError};
