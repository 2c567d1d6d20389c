//! User provisioning
//!
//! Hook run by the login webhook before the user is handed back to the
//! provider. A real deployment looks the user up (or creates it) in its own
//! store and returns the canonical record.

use axum::async_trait;

use crate::api::User;
use crate::error::AppError;

/// Policy hook applied to every freshly signed-in user
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProvisioner: Send + Sync {
    /// Return the user record the provider should bind to the session.
    ///
    /// Whatever `id` (or `address`) the returned user carries becomes the
    /// session address.
    async fn provision(&self, user: User) -> Result<User, AppError>;
}

/// Provisioner that tags every user with `foo = "bar"`
#[derive(Debug, Clone, Default)]
pub struct ExampleProvisioner;

#[async_trait]
impl UserProvisioner for ExampleProvisioner {
    async fn provision(&self, mut user: User) -> Result<User, AppError> {
        user.set_attribute("foo", "bar");
        tracing::info!(address = %user.id, "User provisioned");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn example_provisioner_adds_field_and_keeps_input() {
        let mut user = User::new("0x123");
        user.set_attribute("address", "0x123");

        let provisioned = ExampleProvisioner.provision(user).await.unwrap();

        assert_eq!(
            serde_json::to_value(&provisioned).unwrap(),
            json!({ "id": "0x123", "address": "0x123", "foo": "bar" })
        );
    }

    #[tokio::test]
    async fn example_provisioner_overwrites_existing_field() {
        let mut user = User::new("0x123");
        user.set_attribute("foo", "baz");

        let provisioned = ExampleProvisioner.provision(user).await.unwrap();
        assert_eq!(provisioned.attribute("foo"), Some(&json!("bar")));
    }
}
