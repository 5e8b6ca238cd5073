use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Fraction such as a margin rate or a concentration share (0.08 = 8%)
pub type Rate = Decimal;

/// Position size in whole contracts
pub type Lots = u32;

/// Canonical uppercase product symbol (e.g. "CU", "IF")
pub type Product = String;

/// Normalize a caller-supplied product symbol to its canonical uppercase form
pub fn normalize_product(product: &str) -> Product {
    product.trim().to_ascii_uppercase()
}

/// Deserialize a product-keyed map, normalizing every key
///
/// Two keys that normalize to the same product are rejected.
pub fn deserialize_product_map<'de, D, V>(deserializer: D) -> Result<BTreeMap<Product, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    let raw = BTreeMap::<String, V>::deserialize(deserializer)?;
    let mut map = BTreeMap::new();
    for (product, value) in raw {
        let product = normalize_product(&product);
        if map.contains_key(&product) {
            return Err(D::Error::custom(format!("duplicate entry for product {}", product)));
        }
        map.insert(product, value);
    }
    Ok(map)
}
