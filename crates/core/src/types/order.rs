//! Catalog ordering and order-status constants.

use serde::{Deserialize, Serialize};

/// Status assigned to a freshly checked-out order.
///
/// Order status is a free-form string; admins may transition it to arbitrary
/// values. Only the initial value is fixed.
pub const DEFAULT_ORDER_STATUS: &str = "created";

/// Sort order for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookOrder {
    PriceAsc,
    PriceDesc,
    YearAsc,
    YearDesc,
    TitleAsc,
    TitleDesc,
}

impl std::fmt::Display for BookOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::YearAsc => "year_asc",
            Self::YearDesc => "year_desc",
            Self::TitleAsc => "title_asc",
            Self::TitleDesc => "title_desc",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for BookOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "year_asc" => Ok(Self::YearAsc),
            "year_desc" => Ok(Self::YearDesc),
            "title_asc" => Ok(Self::TitleAsc),
            "title_desc" => Ok(Self::TitleDesc),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_roundtrip() {
        for order in [
            BookOrder::PriceAsc,
            BookOrder::PriceDesc,
            BookOrder::YearAsc,
            BookOrder::YearDesc,
            BookOrder::TitleAsc,
            BookOrder::TitleDesc,
        ] {
            let parsed: BookOrder = order.to_string().parse().unwrap();
            assert_eq!(parsed, order);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("price".parse::<BookOrder>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let order: BookOrder = serde_json::from_str("\"price_desc\"").unwrap();
        assert_eq!(order, BookOrder::PriceDesc);
    }
}
