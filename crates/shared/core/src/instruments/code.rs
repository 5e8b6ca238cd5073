//! Contract code tokenizers
//!
//! Purely syntactic: these split a code into its parts without consulting
//! any reference data. Deciding whether the parts name a real product is
//! the resolver's job.
//!
//! | Dialect | Shape | Example |
//! |---------|-------|---------|
//! | Vendor | `TAG.i@EXCHANGE.symbol`, `TAG.m@EXCHANGE.symbol` | `KQ.i@SHFE.cu` |
//! | Legacy | `SYMBOL` + `99` / `888` / `YYMM` / `YMM` | `CU99`, `CU888`, `CU2403`, `TA601` |
//! | Exchange-prefixed | `EXCHANGE.` + legacy | `SHFE.cu2509`, `CZCE.CF99` |

use super::{ContractClass, DeliveryMonth, Exchange};

/// Longest product symbol accepted in legacy codes
const MAX_SYMBOL_LEN: usize = 4;

/// Suffix marking an index contract in legacy codes
const INDEX_SUFFIX: &str = "99";

/// Suffix marking a main-continuous contract in legacy codes
const MAIN_SUFFIX: &str = "888";

/// Continuous-contract marker inside a vendor code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendorMarker {
    /// `.i@`
    Index,
    /// `.m@`
    Main,
}

impl VendorMarker {
    pub fn letter(&self) -> char {
        match self {
            VendorMarker::Index => 'i',
            VendorMarker::Main => 'm',
        }
    }

    pub fn class(&self) -> ContractClass {
        match self {
            VendorMarker::Index => ContractClass::Index,
            VendorMarker::Main => ContractClass::Main,
        }
    }

    /// Marker for a continuous class; dated months have no vendor form
    pub fn for_class(class: &ContractClass) -> Option<Self> {
        match class {
            ContractClass::Index => Some(VendorMarker::Index),
            ContractClass::Main => Some(VendorMarker::Main),
            ContractClass::Specific(_) => None,
        }
    }
}

/// `KQ.i@SHFE.cu` split into its parts, symbol case preserved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorCode<'a> {
    pub tag: &'a str,
    pub marker: VendorMarker,
    pub exchange: &'a str,
    pub symbol: &'a str,
}

impl<'a> VendorCode<'a> {
    pub fn parse(code: &'a str) -> Option<Self> {
        let (head, tail) = code.split_once('@')?;
        let (tag, marker) = head.split_once('.')?;
        let (exchange, symbol) = tail.split_once('.')?;

        if !is_alphabetic(tag) || !is_alphabetic(exchange) || !is_alphabetic(symbol) {
            return None;
        }

        let marker = match marker {
            "i" | "I" => VendorMarker::Index,
            "m" | "M" => VendorMarker::Main,
            _ => return None,
        };

        Some(Self {
            tag,
            marker,
            exchange,
            symbol,
        })
    }

    /// Render a vendor code; the caller supplies the symbol already cased
    pub fn render(tag: &str, marker: VendorMarker, exchange: Exchange, symbol: &str) -> String {
        format!("{}.{}@{}.{}", tag, marker.letter(), exchange.code(), symbol)
    }
}

/// `CU2403` split into symbol and class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyCode<'a> {
    pub symbol: &'a str,
    pub class: ContractClass,
}

impl<'a> LegacyCode<'a> {
    /// Parse a symbol followed by a class suffix.
    ///
    /// A bare symbol (`CU`) is not a contract reference and yields `None`.
    pub fn parse(code: &'a str) -> Option<Self> {
        let split = code.find(|c: char| c.is_ascii_digit())?;
        let (symbol, digits) = code.split_at(split);

        if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LEN || !is_alphabetic(symbol) {
            return None;
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let class = match digits {
            INDEX_SUFFIX => ContractClass::Index,
            MAIN_SUFFIX => ContractClass::Main,
            month => ContractClass::Specific(DeliveryMonth::parse(month)?),
        };

        Some(Self { symbol, class })
    }

    /// Class suffix as written after the symbol
    pub fn suffix(class: &ContractClass) -> String {
        match class {
            ContractClass::Index => INDEX_SUFFIX.to_string(),
            ContractClass::Main => MAIN_SUFFIX.to_string(),
            ContractClass::Specific(month) => month.as_str().to_string(),
        }
    }

    pub fn render(symbol: &str, class: &ContractClass) -> String {
        format!("{}{}", symbol, Self::suffix(class))
    }
}

/// `SHFE.cu2509` split into exchange token and legacy remainder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeCode<'a> {
    pub exchange: &'a str,
    pub legacy: LegacyCode<'a>,
}

impl<'a> ExchangeCode<'a> {
    pub fn parse(code: &'a str) -> Option<Self> {
        let (exchange, rest) = code.split_once('.')?;
        if !is_alphabetic(exchange) {
            return None;
        }
        Some(Self {
            exchange,
            legacy: LegacyCode::parse(rest)?,
        })
    }

    pub fn render(exchange: Exchange, symbol: &str, class: &ContractClass) -> String {
        format!("{}.{}", exchange.code(), LegacyCode::render(symbol, class))
    }
}

/// Swap ASCII case letter by letter (cu -> CU, Cu -> cU)
pub fn flip_case(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

fn is_alphabetic(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphabetic())
}
