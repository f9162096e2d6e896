//! Product name to ticker symbol resolution

use crate::core::error::RowError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SymbolMapping {
    /// Substring looked for in the broker's product description.
    pub product: String,
    pub symbol: String,
}

/// Ordered product-substring to ticker table. The first entry whose
/// `product` occurs in the description wins, so more specific names must
/// be listed before shorter names they contain.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct SymbolMap {
    entries: Vec<SymbolMapping>,
}

impl SymbolMap {
    pub fn new(entries: Vec<SymbolMapping>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolve(&self, description: &str) -> Result<&str, RowError> {
        self.entries
            .iter()
            .find(|entry| description.contains(entry.product.as_str()))
            .map(|entry| entry.symbol.as_str())
            .ok_or_else(|| RowError::UnresolvedSymbol {
                product: description.to_string(),
            })
    }
}

impl<P: Into<String>, S: Into<String>> FromIterator<(P, S)> for SymbolMap {
    fn from_iter<I: IntoIterator<Item = (P, S)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(product, symbol)| SymbolMapping {
                    product: product.into(),
                    symbol: symbol.into(),
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_substring() {
        let map: SymbolMap = [("TESLA", "TSLA"), ("APPLE INC", "AAPL")]
            .into_iter()
            .collect();
        assert_eq!(map.resolve("TESLA MOTORS INC").unwrap(), "TSLA");
        assert_eq!(map.resolve("APPLE INC - COMMON").unwrap(), "AAPL");
    }

    #[test]
    fn test_first_match_wins() {
        let map: SymbolMap = [("ALPHABET INC. - CLASS A", "GOOGL"), ("ALPHABET", "GOOG")]
            .into_iter()
            .collect();
        assert_eq!(map.resolve("ALPHABET INC. - CLASS A").unwrap(), "GOOGL");
        assert_eq!(map.resolve("ALPHABET INC. - CLASS C").unwrap(), "GOOG");

        let reversed: SymbolMap = [("ALPHABET", "GOOG"), ("ALPHABET INC. - CLASS A", "GOOGL")]
            .into_iter()
            .collect();
        assert_eq!(reversed.resolve("ALPHABET INC. - CLASS A").unwrap(), "GOOG");
    }

    #[test]
    fn test_unknown_product() {
        let map: SymbolMap = [("TESLA", "TSLA")].into_iter().collect();
        assert_eq!(
            map.resolve("ACME CORP"),
            Err(RowError::UnresolvedSymbol {
                product: "ACME CORP".to_string()
            })
        );
        assert!(SymbolMap::default().resolve("TESLA").is_err());
    }

    #[test]
    fn test_deserializes_from_ordered_list() {
        let yaml = r#"
- product: "NVIDIA CORPORATION"
  symbol: "NVDA"
- product: "NIO INC"
  symbol: "NIO"
"#;
        let map: SymbolMap = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.resolve("NIO INC-ADR").unwrap(), "NIO");
    }
}
