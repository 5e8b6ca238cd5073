use serde::{Deserialize, Serialize};
use std::fmt;

/// Which instrument of a product a contract code refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractClass {
    /// Continuous index proxy blending all listed months (CU99, KQ.i@SHFE.cu)
    Index,
    /// Continuous proxy for the most liquid month (CU888, KQ.m@SHFE.cu)
    Main,
    /// One literal delivery month (CU2403, CZCE.TA601)
    Specific(DeliveryMonth),
}

impl ContractClass {
    /// Dated contract from literal month digits.
    ///
    /// Returns `None` when the digits are not a valid `YYMM` or `YMM` month.
    pub fn specific(digits: &str) -> Option<Self> {
        DeliveryMonth::parse(digits).map(ContractClass::Specific)
    }

    pub fn is_continuous(&self) -> bool {
        !matches!(self, ContractClass::Specific(_))
    }
}

impl fmt::Display for ContractClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractClass::Index => f.write_str("index"),
            ContractClass::Main => f.write_str("main"),
            ContractClass::Specific(month) => write!(f, "month {}", month),
        }
    }
}

/// Delivery month digits exactly as the caller wrote them.
///
/// Four digits are `YYMM` (2403); three digits are the `YMM` form CZCE uses
/// (601). The digits are kept verbatim so outbound codes never rewrite the
/// year the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeliveryMonth(String);

impl DeliveryMonth {
    pub fn parse(digits: &str) -> Option<Self> {
        if !(3..=4).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let month: u32 = digits[digits.len() - 2..].parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self(digits.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeliveryMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DeliveryMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DeliveryMonth::parse(&value).ok_or_else(|| format!("Invalid delivery month: {}", value))
    }
}

impl From<DeliveryMonth> for String {
    fn from(month: DeliveryMonth) -> Self {
        month.0
    }
}
