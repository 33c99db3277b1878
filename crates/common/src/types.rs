use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a string-backed identifier newtype.
///
/// Identifiers are opaque strings on the wire: some are minted here (carts,
/// discounts, sales), others come from collaborators (catalogs, brands, users).
/// Wrapping each one keeps a `CatalogId` from being passed where a `VariantId`
/// is expected.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from an existing string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Creates a new random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().simple().to_string())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of the user who owns a cart (issued by the auth service).
    UserId
);
string_id!(
    /// Identifier of a customer record.
    CustomerId
);
string_id!(
    /// Identifier of a cart document.
    CartId
);
string_id!(
    /// Identifier of a single line inside a cart.
    CartItemId
);
string_id!(
    /// Identifier of a sellable catalog item.
    CatalogId
);
string_id!(
    /// Identifier of a variant (SKU) of a catalog item.
    VariantId
);
string_id!(
    /// Identifier of the seller that owns a catalog item.
    BrandId
);
string_id!(DiscountId);
string_id!(SaleId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let id1 = CartId::generate();
        let id2 = CartId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn string_conversion_preserves_value() {
        let id = CatalogId::new("cat-001");
        assert_eq!(id.as_str(), "cat-001");

        let id2: VariantId = "var-002".into();
        assert_eq!(id2.to_string(), "var-002");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = BrandId::new("brand-7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"brand-7\"");

        let back: BrandId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
