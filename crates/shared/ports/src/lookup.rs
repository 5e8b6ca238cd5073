use std::collections::HashMap;

use contango_core::{ContractDescriptor, Product};

/// Read access to contract descriptors by product symbol
///
/// The calculators depend on this port rather than on the registry so they
/// stay synchronous and can be tested against a plain map.
pub trait ContractLookup: Send + Sync {
    /// Descriptor for an uppercase product symbol
    fn descriptor(&self, product: &str) -> Option<ContractDescriptor>;

    fn contains(&self, product: &str) -> bool {
        self.descriptor(product).is_some()
    }
}

impl ContractLookup for HashMap<Product, ContractDescriptor> {
    fn descriptor(&self, product: &str) -> Option<ContractDescriptor> {
        self.get(&product.to_uppercase()).cloned()
    }
}
