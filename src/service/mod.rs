//! Service layer
//!
//! Contains business logic separated from HTTP handlers.

mod provisioning;

pub use provisioning::{ExampleProvisioner, UserProvisioner};

#[cfg(test)]
pub use provisioning::MockUserProvisioner;
