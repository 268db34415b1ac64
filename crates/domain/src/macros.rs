//! Macro for implementing Display and FromStr for wire enums
//!
//! The backend exchanges enums as upper-case identifiers (`"EXPENSE"`,
//! `"FOOD"`). This macro keeps the `Display` output identical to the wire
//! value and accepts any casing when parsing.
//!
//! # Example
//!
//! ```rust
//! use armageddon_domain::impl_wire_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Direction {
//!     In,
//!     Out,
//! }
//!
//! impl_wire_enum_conversions!(Direction {
//!     In => "IN",
//!     Out => "OUT",
//! });
//!
//! assert_eq!(Direction::In.to_string(), "IN");
//! assert_eq!("out".parse::<Direction>().unwrap(), Direction::Out);
//! ```

/// Implements Display and FromStr traits for wire enums
///
/// This macro generates:
/// - Display trait: writes the wire string verbatim
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their wire strings
#[macro_export]
macro_rules! impl_wire_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestKind {
        Income,
        Expense,
    }

    impl_wire_enum_conversions!(TestKind {
        Income => "INCOME",
        Expense => "EXPENSE",
    });

    #[test]
    fn test_display_uses_wire_value() {
        assert_eq!(TestKind::Income.to_string(), "INCOME");
        assert_eq!(TestKind::Expense.to_string(), "EXPENSE");
    }

    #[test]
    fn test_fromstr_any_case() {
        assert_eq!(TestKind::from_str("INCOME").unwrap(), TestKind::Income);
        assert_eq!(TestKind::from_str("expense").unwrap(), TestKind::Expense);
        assert_eq!(TestKind::from_str("ExPeNsE").unwrap(), TestKind::Expense);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = TestKind::from_str("transfer");
        assert!(result.unwrap_err().contains("Invalid TestKind: transfer"));
        assert!(TestKind::from_str("").is_err());
    }
}
