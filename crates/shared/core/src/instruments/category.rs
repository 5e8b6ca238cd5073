use serde::{Deserialize, Serialize};
use std::fmt;

/// Product category as listed in the contract reference table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Copper, aluminium, zinc, nickel...
    BaseMetals,
    PreciousMetals,
    /// Crude, fuel oil, plastics, methanol...
    EnergyChemical,
    Agriculture,
    /// Equity index and treasury futures
    Financial,
    /// Steel, glass, rubber, silicon...
    Industrial,
    /// Discovered from the live source with no static classification
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BaseMetals => "base_metals",
            Category::PreciousMetals => "precious_metals",
            Category::EnergyChemical => "energy_chemical",
            Category::Agriculture => "agriculture",
            Category::Financial => "financial",
            Category::Industrial => "industrial",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
