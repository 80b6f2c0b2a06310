//! Macro for implementing Display and FromStr for wire-level enums
//!
//! Calendar providers and the board platform exchange small string enums
//! (resource states, change types). This macro gives each one a single
//! case-insensitive mapping for both directions.
//!
//! # Example
//!
//! ```rust
//! use boardsync_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum DeliveryState {
//!     Queued,
//!     Delivered,
//! }
//!
//! impl_domain_status_conversions!(DeliveryState {
//!     Queued => "queued",
//!     Delivered => "delivered",
//! });
//!
//! assert_eq!("DELIVERED".parse::<DeliveryState>(), Ok(DeliveryState::Delivered));
//! ```

/// Implements Display and FromStr traits for string-backed enums
///
/// - Display writes the mapped string
/// - FromStr matches case-insensitively and reports the enum name on failure
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
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
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
