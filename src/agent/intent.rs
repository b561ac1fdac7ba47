use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum::{EnumString, IntoStaticStr};

/// One structured command recognized from free text. Parameter-carrying
/// variants hold everything the act stage needs, so dispatch is exhaustive
/// and adding a command is a compile-time-checked change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", content = "params", rename_all = "snake_case")]
pub enum Intent {
    ListProducts,
    ListByCategory {
        category: String,
    },
    GetStatistics,
    AddProduct {
        name: String,
        price: f64,
        category: String,
        in_stock: bool,
    },
    DiscountById {
        percent: u32,
        product_id: i64,
    },
    CreateOrder {
        product_id: i64,
        quantity: i64,
    },
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IntentKind {
    ListProducts,
    ListByCategory,
    GetStatistics,
    AddProduct,
    DiscountById,
    CreateOrder,
    Help,
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::ListProducts => IntentKind::ListProducts,
            Intent::ListByCategory { .. } => IntentKind::ListByCategory,
            Intent::GetStatistics => IntentKind::GetStatistics,
            Intent::AddProduct { .. } => IntentKind::AddProduct,
            Intent::DiscountById { .. } => IntentKind::DiscountById,
            Intent::CreateOrder { .. } => IntentKind::CreateOrder,
            Intent::Help => IntentKind::Help,
        }
    }

    /// Flat name=value view of the extracted parameters, as exposed in the
    /// public response.
    pub fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        match self {
            Intent::ListProducts | Intent::GetStatistics | Intent::Help => {}
            Intent::ListByCategory { category } => {
                params.insert("category".to_string(), json!(category));
            }
            Intent::AddProduct {
                name,
                price,
                category,
                in_stock,
            } => {
                params.insert("name".to_string(), json!(name));
                params.insert("price".to_string(), json!(price));
                params.insert("category".to_string(), json!(category));
                params.insert("in_stock".to_string(), json!(in_stock));
            }
            Intent::DiscountById {
                percent,
                product_id,
            } => {
                params.insert("percent".to_string(), json!(percent));
                params.insert("product_id".to_string(), json!(product_id));
            }
            Intent::CreateOrder {
                product_id,
                quantity,
            } => {
                params.insert("product_id".to_string(), json!(product_id));
                params.insert("quantity".to_string(), json!(quantity));
            }
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_name_is_snake_case() {
        let kind: &'static str = Intent::ListByCategory {
            category: "Электроника".to_string(),
        }
        .kind()
        .into();
        assert_eq!(kind, "list_by_category");
    }

    #[test]
    fn test_params_for_empty_intents() {
        assert!(Intent::Help.params().is_empty());
        assert!(Intent::ListProducts.params().is_empty());
        assert!(Intent::GetStatistics.params().is_empty());
    }

    #[test]
    fn test_params_for_add_product() {
        let intent = Intent::AddProduct {
            name: "мышка".to_string(),
            price: 1500.0,
            category: "электроника".to_string(),
            in_stock: true,
        };
        let params = intent.params();
        assert_eq!(params["price"], json!(1500.0));
        assert_eq!(params["in_stock"], json!(true));
    }
}
