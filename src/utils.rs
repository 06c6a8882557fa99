// Utility functions
use serde::de::{self, Deserializer, Visitor};
use std::fmt;

/// Generates a 128-bit random product id, hex encoded.
pub fn generate_product_id() -> String {
    let bytes: [u8; 16] = rand::random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Accepts a price given either as a string or as a JSON number.
pub fn price_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct PriceVisitor;

    impl<'de> Visitor<'de> for PriceVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a price string or number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(PriceVisitor)
}

/// Parses a store-local price string like "$1,299.00", "2,49 €" or "1.99/lb".
/// Returns None when no number can be found.
pub fn parse_price(raw: &str) -> Option<f64> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let number: String = raw[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    // "2,49" is a decimal comma, "1,299" or "1,299.00" are thousands separators
    let normalized = match (number.rfind(','), number.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => number.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => number.replace(',', ""),
        (Some(comma), None) if number.len() - comma - 1 == 2 => number.replace(',', "."),
        (Some(_), None) => number.replace(',', ""),
        _ => number,
    };

    normalized.trim_end_matches('.').parse::<f64>().ok()
}
