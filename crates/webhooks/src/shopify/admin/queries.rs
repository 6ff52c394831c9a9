//! GraphQL operation definitions for the Shopify Admin API.
//!
//! Each operation is a GraphQL document plus the serde types for its
//! variables and response, bound together through `graphql_client`'s
//! [`GraphQLQuery`] trait so `AdminClient::execute` can stay generic.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

/// Bind an operation module to a marker type implementing `GraphQLQuery`.
macro_rules! operation {
    ($(#[$meta:meta])* $name:ident => $module:ident) => {
        $(#[$meta])*
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $module::QUERY,
                    operation_name: stringify!($name),
                }
            }
        }
    };
}

// =============================================================================
// Shared response shapes
// =============================================================================

/// A `nodes`-style connection.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    pub nodes: Vec<T>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

/// A mutation `userErrors` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct UserError {
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// An object with only an `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    pub id: String,
}

// =============================================================================
// Order editing
// =============================================================================

operation!(
    /// Open an order edit session.
    OrderEditBegin => order_edit_begin
);

pub mod order_edit_begin {
    use super::{Connection, Deserialize, Node, Serialize, UserError};

    pub const QUERY: &str = r"
mutation OrderEditBegin($id: ID!) {
  orderEditBegin(id: $id) {
    calculatedOrder {
      id
      originalOrder { id }
      lineItems(first: 250) {
        nodes {
          id
          quantity
          sku
          variant { id sku }
          originalLineItem { id }
        }
      }
    }
    userErrors { field message }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub order_edit_begin: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub calculated_order: Option<CalculatedOrder>,
        #[serde(default)]
        pub user_errors: Vec<UserError>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CalculatedOrder {
        pub id: String,
        pub original_order: Option<Node>,
        #[serde(default)]
        pub line_items: Connection<CalculatedLineItem>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CalculatedLineItem {
        pub id: String,
        pub quantity: i64,
        pub sku: Option<String>,
        pub variant: Option<Variant>,
        pub original_line_item: Option<Node>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Variant {
        pub id: String,
        pub sku: Option<String>,
    }
}

operation!(
    /// Change the quantity of a calculated line item (0 removes it).
    OrderEditSetQuantity => order_edit_set_quantity
);

pub mod order_edit_set_quantity {
    use super::{Deserialize, Node, Serialize, UserError};

    pub const QUERY: &str = r"
mutation OrderEditSetQuantity($id: ID!, $lineItemId: ID!, $quantity: Int!, $restock: Boolean) {
  orderEditSetQuantity(id: $id, lineItemId: $lineItemId, quantity: $quantity, restock: $restock) {
    calculatedOrder { id }
    userErrors { field message }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub id: String,
        pub line_item_id: String,
        pub quantity: i64,
        pub restock: Option<bool>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub order_edit_set_quantity: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub calculated_order: Option<Node>,
        #[serde(default)]
        pub user_errors: Vec<UserError>,
    }
}

operation!(
    /// Add a product variant to the calculated order.
    OrderEditAddVariant => order_edit_add_variant
);

pub mod order_edit_add_variant {
    use super::{Connection, Deserialize, Serialize, UserError};

    pub const QUERY: &str = r"
mutation OrderEditAddVariant($id: ID!, $variantId: ID!, $quantity: Int!, $allowDuplicates: Boolean) {
  orderEditAddVariant(id: $id, variantId: $variantId, quantity: $quantity, allowDuplicates: $allowDuplicates) {
    calculatedOrder {
      id
      addedLineItems(first: 50) {
        nodes {
          id
          quantity
          sku
          variant { id sku }
        }
      }
    }
    userErrors { field message }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub id: String,
        pub variant_id: String,
        pub quantity: i64,
        pub allow_duplicates: Option<bool>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub order_edit_add_variant: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub calculated_order: Option<CalculatedOrder>,
        #[serde(default)]
        pub user_errors: Vec<UserError>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CalculatedOrder {
        pub id: String,
        #[serde(default)]
        pub added_line_items: Connection<AddedLineItem>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct AddedLineItem {
        pub id: String,
        pub quantity: i64,
        pub sku: Option<String>,
        pub variant: Option<Variant>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Variant {
        pub id: String,
        pub sku: Option<String>,
    }
}

operation!(
    /// Apply all staged changes to the order.
    OrderEditCommit => order_edit_commit
);

pub mod order_edit_commit {
    use super::{Connection, Deserialize, Node, Serialize, UserError};

    pub const QUERY: &str = r"
mutation OrderEditCommit($id: ID!, $notifyCustomer: Boolean, $staffNote: String) {
  orderEditCommit(id: $id, notifyCustomer: $notifyCustomer, staffNote: $staffNote) {
    order {
      id
      name
      lineItems(first: 250) {
        nodes { id }
      }
    }
    userErrors { field message }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub id: String,
        pub notify_customer: Option<bool>,
        pub staff_note: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub order_edit_commit: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub order: Option<Order>,
        #[serde(default)]
        pub user_errors: Vec<UserError>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Order {
        pub id: String,
        pub name: String,
        #[serde(default)]
        pub line_items: Connection<Node>,
    }
}

// =============================================================================
// Catalog
// =============================================================================

operation!(
    /// Search product variants with a query string (e.g. `sku:"ABC-M"`).
    SearchProductVariants => search_product_variants
);

pub mod search_product_variants {
    use super::{Connection, Deserialize, Serialize};

    pub const QUERY: &str = r"
query SearchProductVariants($query: String!, $first: Int!) {
  productVariants(first: $first, query: $query) {
    nodes {
      id
      sku
      title
      product { id title }
    }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub query: String,
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub product_variants: Connection<Variant>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Variant {
        pub id: String,
        pub sku: Option<String>,
        pub title: String,
        pub product: Option<Product>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Product {
        pub id: String,
        pub title: String,
    }
}

operation!(
    /// Search products by query string and return their variants.
    SearchProductsWithVariants => search_products_with_variants
);

pub mod search_products_with_variants {
    use super::{Connection, Deserialize, Serialize};

    pub const QUERY: &str = r"
query SearchProductsWithVariants($query: String!, $first: Int!) {
  products(first: $first, query: $query) {
    nodes {
      id
      title
      variants(first: 100) {
        nodes { id sku title }
      }
    }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub query: String,
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: Connection<Product>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Product {
        pub id: String,
        pub title: String,
        #[serde(default)]
        pub variants: Connection<Variant>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Variant {
        pub id: String,
        pub sku: Option<String>,
        pub title: String,
    }
}

operation!(
    /// Fetch the tags of the product that owns a variant.
    GetVariantProductTags => get_variant_product_tags
);

pub mod get_variant_product_tags {
    use super::{Deserialize, Serialize};

    pub const QUERY: &str = r"
query GetVariantProductTags($id: ID!) {
  productVariant(id: $id) {
    id
    product { id tags }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub product_variant: Option<Variant>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Variant {
        pub id: String,
        pub product: Option<Product>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Product {
        pub id: String,
        #[serde(default)]
        pub tags: Vec<String>,
    }
}

// =============================================================================
// Content (pages and metafields)
// =============================================================================

operation!(
    /// List online store pages.
    GetPages => get_pages
);

pub mod get_pages {
    use super::{Connection, Deserialize, Serialize};

    pub const QUERY: &str = r"
query GetPages($first: Int!) {
  pages(first: $first) {
    nodes { id title }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub pages: Connection<Page>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Page {
        pub id: String,
        pub title: String,
    }
}

operation!(
    /// Read one metafield of a page.
    GetPageMetafield => get_page_metafield
);

pub mod get_page_metafield {
    use super::{Deserialize, Serialize};

    pub const QUERY: &str = r"
query GetPageMetafield($id: ID!, $namespace: String!, $key: String!) {
  page(id: $id) {
    id
    metafield(namespace: $namespace, key: $key) {
      id
      namespace
      key
      value
      type
    }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub id: String,
        pub namespace: String,
        pub key: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub page: Option<Page>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Page {
        pub id: String,
        pub metafield: Option<Metafield>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Metafield {
        pub id: String,
        pub namespace: String,
        pub key: String,
        pub value: String,
        #[serde(rename = "type")]
        pub metafield_type: String,
    }
}

operation!(
    /// Create or update metafields.
    MetafieldsSet => metafields_set
);

pub mod metafields_set {
    use super::{Deserialize, Serialize, UserError};

    pub const QUERY: &str = r"
mutation MetafieldsSet($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) {
    metafields {
      id
      namespace
      key
      value
      type
    }
    userErrors { field message }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub metafields: Vec<MetafieldsSetInput>,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MetafieldsSetInput {
        pub owner_id: String,
        pub namespace: String,
        pub key: String,
        #[serde(rename = "type")]
        pub metafield_type: String,
        pub value: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub metafields_set: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        #[serde(default)]
        pub metafields: Option<Vec<Metafield>>,
        #[serde(default)]
        pub user_errors: Vec<UserError>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Metafield {
        pub id: String,
        pub namespace: String,
        pub key: String,
        pub value: String,
        #[serde(rename = "type")]
        pub metafield_type: String,
    }
}

/// Join `userErrors` into a single message (`field.path: message; ...`).
pub fn format_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| {
            let field = e.field.as_ref().map_or_else(String::new, |f| f.join("."));
            format!("{}: {}", field, e.message)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_uses_operation_name_and_camel_case_variables() {
        let body = OrderEditSetQuantity::build_query(order_edit_set_quantity::Variables {
            id: "gid://shopify/CalculatedOrder/1".to_string(),
            line_item_id: "gid://shopify/CalculatedLineItem/2".to_string(),
            quantity: 0,
            restock: Some(false),
        });
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["operationName"], "OrderEditSetQuantity");
        assert_eq!(json["variables"]["lineItemId"], "gid://shopify/CalculatedLineItem/2");
        assert_eq!(json["variables"]["quantity"], 0);
        assert!(
            json["query"]
                .as_str()
                .unwrap()
                .contains("mutation OrderEditSetQuantity")
        );
    }

    #[test]
    fn test_metafield_input_serializes_type() {
        let body = MetafieldsSet::build_query(metafields_set::Variables {
            metafields: vec![metafields_set::MetafieldsSetInput {
                owner_id: "gid://shopify/Page/1".to_string(),
                namespace: "custom".to_string(),
                key: "total_donations".to_string(),
                metafield_type: "number_decimal".to_string(),
                value: "10.00".to_string(),
            }],
        });
        let json = serde_json::to_value(&body).unwrap();
        let input = &json["variables"]["metafields"][0];

        assert_eq!(input["ownerId"], "gid://shopify/Page/1");
        assert_eq!(input["type"], "number_decimal");
    }

    #[test]
    fn test_begin_response_tolerates_missing_connections() {
        let data: order_edit_begin::ResponseData = serde_json::from_str(
            r#"{"orderEditBegin":{"calculatedOrder":{"id":"c1","originalOrder":null},"userErrors":[]}}"#,
        )
        .unwrap();
        let calc = data.order_edit_begin.unwrap().calculated_order.unwrap();
        assert!(calc.line_items.nodes.is_empty());
    }

    #[test]
    fn test_format_user_errors() {
        let errors = vec![
            UserError {
                field: Some(vec!["lineItemId".to_string()]),
                message: "is invalid".to_string(),
            },
            UserError {
                field: None,
                message: "Order is locked".to_string(),
            },
        ];
        assert_eq!(
            format_user_errors(&errors),
            "lineItemId: is invalid; : Order is locked"
        );
    }
}
