use std::collections::HashMap;

use contango_core::{
    Category, ContractDescriptor, Exchange, Product, SymbolCase, VendorCode, VendorMarker,
    values::normalize_product,
};

/// One immutable generation of reference data
///
/// Readers hold an `Arc<Snapshot>`; a refresh builds a new snapshot and swaps
/// it in, so lookups never observe a half-applied update.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    by_product: HashMap<Product, ContractDescriptor>,
    /// canonical code -> product
    by_code: HashMap<String, Product>,
    /// (exchange, symbol exactly as listed) -> product
    by_listing: HashMap<(Exchange, String), Product>,
    case_rules: HashMap<Exchange, SymbolCase>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from table descriptors, assigning vendor index codes under the
    /// given case rules
    pub fn from_table(
        descriptors: impl IntoIterator<Item = ContractDescriptor>,
        vendor_tag: &str,
        case_rules: impl IntoIterator<Item = (Exchange, SymbolCase)>,
    ) -> Self {
        let mut snapshot = Self::new();
        for (exchange, case) in case_rules {
            snapshot.set_case_rule(exchange, case);
        }
        for descriptor in descriptors {
            let case = snapshot
                .case_rule(descriptor.exchange)
                .unwrap_or_else(|| descriptor.exchange.default_symbol_case());
            let listed = case.apply(&descriptor.product);
            let code = VendorCode::render(vendor_tag, VendorMarker::Index, descriptor.exchange, &listed);
            snapshot.insert(descriptor.with_canonical_code(code), &listed);
        }
        snapshot
    }

    /// Insert or replace a product together with the symbol its exchange lists it under
    pub fn insert(&mut self, descriptor: ContractDescriptor, listed_symbol: &str) {
        let product = descriptor.product.clone();
        if let Some(old) = self.by_product.get(&product) {
            self.by_code.remove(&old.canonical_code);
        }
        self.by_code
            .insert(descriptor.canonical_code.clone(), product.clone());
        self.by_listing
            .insert((descriptor.exchange, listed_symbol.to_string()), product.clone());
        self.by_product.insert(product, descriptor);
    }

    /// Copy every product of `previous` this snapshot lacks
    ///
    /// Carried products are re-listed under this snapshot's case rule for
    /// their exchange, so a rule learned from the new listing applies to them
    /// too. Returns how many entries were carried over.
    pub fn retain_missing_from(&mut self, previous: &Snapshot) -> usize {
        let previous_listings: HashMap<&Product, &str> = previous
            .by_listing
            .iter()
            .map(|((_, symbol), product)| (product, symbol.as_str()))
            .collect();

        let mut carried = 0;
        for (product, descriptor) in &previous.by_product {
            if self.by_product.contains_key(product) {
                continue;
            }
            let listed = match self.case_rule(descriptor.exchange) {
                Some(case) => case.apply(product),
                None => match previous_listings.get(product) {
                    Some(symbol) => symbol.to_string(),
                    None => descriptor.exchange.default_symbol_case().apply(product),
                },
            };
            let descriptor = match VendorCode::parse(&descriptor.canonical_code) {
                Some(code) => descriptor.clone().with_canonical_code(VendorCode::render(
                    code.tag,
                    code.marker,
                    descriptor.exchange,
                    &listed,
                )),
                None => descriptor.clone(),
            };
            self.insert(descriptor, &listed);
            carried += 1;
        }
        carried
    }

    pub fn descriptor(&self, product: &str) -> Option<&ContractDescriptor> {
        self.by_product.get(&normalize_product(product))
    }

    /// Product whose canonical code is exactly `code`
    pub fn product_for_code(&self, code: &str) -> Option<&Product> {
        self.by_code.get(code.trim())
    }

    /// Product listed on `exchange` under exactly `symbol` (case-sensitive)
    pub fn listing(&self, exchange: Exchange, symbol: &str) -> Option<&ContractDescriptor> {
        self.by_listing
            .get(&(exchange, symbol.to_string()))
            .and_then(|product| self.by_product.get(product))
    }

    pub fn case_rule(&self, exchange: Exchange) -> Option<SymbolCase> {
        self.case_rules.get(&exchange).copied()
    }

    pub fn set_case_rule(&mut self, exchange: Exchange, case: SymbolCase) {
        self.case_rules.insert(exchange, case);
    }

    /// Forget the rule so resolution falls back to trying both cases
    pub fn clear_case_rule(&mut self, exchange: Exchange) {
        self.case_rules.remove(&exchange);
    }

    pub fn contains(&self, product: &str) -> bool {
        self.descriptor(product).is_some()
    }

    pub fn len(&self) -> usize {
        self.by_product.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_product.is_empty()
    }

    /// Sorted product symbols
    pub fn products(&self) -> Vec<Product> {
        let mut products: Vec<_> = self.by_product.keys().cloned().collect();
        products.sort();
        products
    }

    pub fn by_exchange(&self, exchange: Exchange) -> Vec<ContractDescriptor> {
        self.sorted(|d| d.exchange == exchange)
    }

    pub fn by_category(&self, category: Category) -> Vec<ContractDescriptor> {
        self.sorted(|d| d.category == category)
    }

    /// Case-insensitive match on product, name or canonical code
    pub fn search(&self, keyword: &str) -> Vec<ContractDescriptor> {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.sorted(|d| {
            d.product.to_lowercase().contains(&needle)
                || d.name.to_lowercase().contains(&needle)
                || d.canonical_code.to_lowercase().contains(&needle)
        })
    }

    fn sorted(&self, filter: impl Fn(&ContractDescriptor) -> bool) -> Vec<ContractDescriptor> {
        let mut found: Vec<_> = self.by_product.values().filter(|d| filter(d)).cloned().collect();
        found.sort_by(|a, b| a.product.cmp(&b.product));
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::static_table;

    fn default_rules() -> Vec<(Exchange, SymbolCase)> {
        Exchange::ALL
            .iter()
            .map(|e| (*e, e.default_symbol_case()))
            .collect()
    }

    fn table_snapshot() -> Snapshot {
        Snapshot::from_table(static_table(), "KQ", default_rules())
    }

    #[test]
    fn test_canonical_codes_follow_case_rules() {
        let snapshot = table_snapshot();
        assert_eq!(snapshot.descriptor("CU").unwrap().canonical_code, "KQ.i@SHFE.cu");
        assert_eq!(snapshot.descriptor("cf").unwrap().canonical_code, "KQ.i@CZCE.CF");
        assert_eq!(snapshot.descriptor("IF").unwrap().canonical_code, "KQ.i@CFFEX.IF");
        assert_eq!(snapshot.product_for_code("KQ.i@SHFE.cu").unwrap(), "CU");
        assert!(snapshot.product_for_code("KQ.i@SHFE.CU").is_none());
    }

    #[test]
    fn test_listing_is_case_sensitive() {
        let snapshot = table_snapshot();
        assert_eq!(snapshot.listing(Exchange::Shfe, "cu").unwrap().product, "CU");
        assert!(snapshot.listing(Exchange::Shfe, "CU").is_none());
        assert!(snapshot.listing(Exchange::Dce, "cu").is_none());
    }

    #[test]
    fn test_queries() {
        let snapshot = table_snapshot();
        let cffex = snapshot.by_exchange(Exchange::Cffex);
        assert_eq!(
            cffex.iter().map(|d| d.product.as_str()).collect::<Vec<_>>(),
            vec!["IC", "IF", "IH", "IM", "T", "TF", "TS"]
        );
        assert!(snapshot
            .by_category(Category::PreciousMetals)
            .iter()
            .all(|d| d.product == "AU" || d.product == "AG"));
        assert!(snapshot.search("copper").iter().any(|d| d.product == "CU"));
        assert!(snapshot.search("copper").iter().any(|d| d.product == "BC"));
        assert!(snapshot.search("  ").is_empty());
    }

    #[test]
    fn test_retain_missing_keeps_previous_products() {
        let previous = table_snapshot();
        let mut next = Snapshot::new();
        let cu = previous.descriptor("CU").unwrap().clone();
        next.insert(cu, "cu");

        let carried = next.retain_missing_from(&previous);
        assert_eq!(carried, previous.len() - 1);
        assert_eq!(next.len(), previous.len());
        assert_eq!(next.listing(Exchange::Czce, "CF").unwrap().product, "CF");
    }

    #[test]
    fn test_retain_missing_relists_under_new_case_rule() {
        let previous = table_snapshot();
        assert_eq!(previous.listing(Exchange::Gfex, "LC").unwrap().product, "LC");

        let mut next = Snapshot::new();
        next.set_case_rule(Exchange::Gfex, SymbolCase::Lower);
        next.insert(previous.descriptor("SI").unwrap().clone(), "si");
        next.retain_missing_from(&previous);

        assert_eq!(next.listing(Exchange::Gfex, "lc").unwrap().product, "LC");
        assert!(next.listing(Exchange::Gfex, "LC").is_none());
        assert_eq!(next.descriptor("LC").unwrap().canonical_code, "KQ.i@GFEX.lc");
        assert_eq!(next.product_for_code("KQ.i@GFEX.lc").unwrap(), "LC");
        // No rule on the exchange: the previous listing is kept verbatim
        assert_eq!(next.listing(Exchange::Czce, "CF").unwrap().product, "CF");
    }

    #[test]
    fn test_insert_replaces_canonical_code() {
        let mut snapshot = table_snapshot();
        let cu = snapshot
            .descriptor("CU")
            .unwrap()
            .clone()
            .with_canonical_code("KQ.i@SHFE.CU");
        snapshot.insert(cu, "CU");
        assert!(snapshot.product_for_code("KQ.i@SHFE.cu").is_none());
        assert_eq!(snapshot.product_for_code("KQ.i@SHFE.CU").unwrap(), "CU");
    }
}
