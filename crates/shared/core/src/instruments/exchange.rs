use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six Chinese futures exchanges this layer knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    /// Shanghai Futures Exchange
    Shfe,
    /// Dalian Commodity Exchange
    Dce,
    /// Zhengzhou Commodity Exchange
    Czce,
    /// China Financial Futures Exchange
    Cffex,
    /// Shanghai International Energy Exchange
    Ine,
    /// Guangzhou Futures Exchange
    Gfex,
}

impl Exchange {
    pub const ALL: [Exchange; 6] = [
        Exchange::Shfe,
        Exchange::Dce,
        Exchange::Czce,
        Exchange::Cffex,
        Exchange::Ine,
        Exchange::Gfex,
    ];

    /// Exchange identifier as it appears in contract codes ("SHFE")
    pub fn code(&self) -> &'static str {
        match self {
            Exchange::Shfe => "SHFE",
            Exchange::Dce => "DCE",
            Exchange::Czce => "CZCE",
            Exchange::Cffex => "CFFEX",
            Exchange::Ine => "INE",
            Exchange::Gfex => "GFEX",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Exchange::Shfe => "Shanghai Futures Exchange",
            Exchange::Dce => "Dalian Commodity Exchange",
            Exchange::Czce => "Zhengzhou Commodity Exchange",
            Exchange::Cffex => "China Financial Futures Exchange",
            Exchange::Ine => "Shanghai International Energy Exchange",
            Exchange::Gfex => "Guangzhou Futures Exchange",
        }
    }

    /// Product-code casing the exchange is known to use in vendor codes.
    ///
    /// Only a starting point: the registry owns the authoritative rule and
    /// replaces it with whatever the live source reports.
    pub fn default_symbol_case(&self) -> SymbolCase {
        match self {
            Exchange::Shfe | Exchange::Dce | Exchange::Ine => SymbolCase::Lower,
            Exchange::Czce | Exchange::Cffex | Exchange::Gfex => SymbolCase::Upper,
        }
    }
}

impl FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SHFE" => Ok(Exchange::Shfe),
            "DCE" => Ok(Exchange::Dce),
            "CZCE" => Ok(Exchange::Czce),
            "CFFEX" => Ok(Exchange::Cffex),
            "INE" => Ok(Exchange::Ine),
            "GFEX" => Ok(Exchange::Gfex),
            other => Err(format!("Unknown exchange: {}", other)),
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Casing an exchange applies to the product code embedded in a contract code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolCase {
    /// shfe.cu, dce.a, ine.sc
    Lower,
    /// CZCE.CF, CFFEX.IF, GFEX.SI
    Upper,
}

impl SymbolCase {
    /// Render a symbol in this case
    pub fn apply(&self, symbol: &str) -> String {
        match self {
            SymbolCase::Lower => symbol.to_ascii_lowercase(),
            SymbolCase::Upper => symbol.to_ascii_uppercase(),
        }
    }

    /// Detect the case of a symbol. Mixed or letterless symbols have none.
    pub fn detect(symbol: &str) -> Option<SymbolCase> {
        let mut letters = symbol.chars().filter(|c| c.is_ascii_alphabetic()).peekable();
        letters.peek()?;
        let (mut lower, mut upper) = (false, false);
        for c in letters {
            lower |= c.is_ascii_lowercase();
            upper |= c.is_ascii_uppercase();
        }
        match (lower, upper) {
            (true, false) => Some(SymbolCase::Lower),
            (false, true) => Some(SymbolCase::Upper),
            _ => None,
        }
    }
}
