//! Customer records: the owner side of the one-cart-per-user link.

use chrono::{DateTime, Utc};
use common::{CartId, CustomerId, UserId};
use serde::{Deserialize, Serialize};
use store::{DocumentQuery, DocumentStore, DocumentStoreExt, StoreError};

use crate::error::DomainError;

/// Collection holding customer documents.
pub const CUSTOMER_COLLECTION: &str = "customer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    #[serde(rename = "userID")]
    pub user_id: UserId,
    /// Set once the user's cart exists.
    #[serde(rename = "cartID", default)]
    pub cart_id: Option<CartId>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(user_id: UserId) -> Self {
        Self {
            id: CustomerId::generate(),
            user_id,
            cart_id: None,
            created_at: Utc::now(),
        }
    }
}

/// Registers and looks up customers.
#[derive(Clone)]
pub struct CustomerService<S> {
    store: S,
}

impl<S: DocumentStore> CustomerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a customer for `user_id`, returning the existing record if
    /// the user is already registered.
    #[tracing::instrument(skip(self))]
    pub async fn register(&self, user_id: &UserId) -> Result<Customer, DomainError> {
        if let Some(existing) = find_customer(&self.store, user_id).await? {
            return Ok(existing);
        }

        let customer = Customer::new(user_id.clone());
        match self
            .store
            .insert_entity(CUSTOMER_COLLECTION, customer.id.as_str(), &customer)
            .await
        {
            Ok(()) => {
                tracing::info!(customer_id = %customer.id, "customer registered");
                Ok(customer)
            }
            Err(StoreError::AlreadyExists { .. }) => find_customer(&self.store, user_id)
                .await?
                .ok_or_else(|| DomainError::not_found("customer", user_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads the customer record of a user.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_user(&self, user_id: &UserId) -> Result<Customer, DomainError> {
        find_customer(&self.store, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("customer", user_id))
    }
}

pub(crate) async fn find_customer<S: DocumentStore + ?Sized>(
    store: &S,
    user_id: &UserId,
) -> Result<Option<Customer>, DomainError> {
    Ok(store
        .find_one_entity(
            CUSTOMER_COLLECTION,
            DocumentQuery::new().eq("userID", user_id.as_str()),
        )
        .await?)
}

#[cfg(test)]
mod tests {
    use store::InMemoryDocumentStore;

    use super::*;

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let service = CustomerService::new(InMemoryDocumentStore::new());
        let user = UserId::new("u-1");

        let first = service.register(&user).await.unwrap();
        let second = service.register(&user).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(first.cart_id.is_none());
        assert_eq!(service.get_by_user(&user).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let service = CustomerService::new(InMemoryDocumentStore::new());
        let err = service.get_by_user(&UserId::new("ghost")).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
