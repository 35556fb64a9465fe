//! Localizers: mapping target values to positions.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SampleError};
use crate::position::{Position, UNDEFINED};

/// How a localizer turns a target value into a position.
///
/// Absolute methods search for the target value itself. Relative methods
/// search for the target offset from the reference value captured on reset:
/// added to it going forward, subtracted from it going backward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LocalizationMethod {
    /// Search toward the arrival for the value.
    #[default]
    AbsoluteForward,
    /// Search toward the departure for the value.
    AbsoluteBackward,
    /// Search toward the arrival for `reference + value`.
    RelativeForward,
    /// Search toward the departure for `reference - value`.
    RelativeBackward,
}

impl LocalizationMethod {
    /// All methods, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::AbsoluteForward,
        Self::AbsoluteBackward,
        Self::RelativeForward,
        Self::RelativeBackward,
    ];

    /// Whether the method searches toward the arrival.
    pub fn is_forward(self) -> bool {
        matches!(self, Self::AbsoluteForward | Self::RelativeForward)
    }

    /// Whether the method offsets from the reference value.
    pub fn is_relative(self) -> bool {
        matches!(self, Self::RelativeForward | Self::RelativeBackward)
    }

    /// The canonical name of the method.
    pub fn name(self) -> &'static str {
        match self {
            Self::AbsoluteForward => "absolute-forward",
            Self::AbsoluteBackward => "absolute-backward",
            Self::RelativeForward => "relative-forward",
            Self::RelativeBackward => "relative-backward",
        }
    }
}

impl fmt::Display for LocalizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LocalizationMethod {
    type Err = SampleError;

    /// Parse a method name. Case and `-`, `_` or space separators are
    /// ignored, so `RelativeBackward` and `relative_backward` both parse.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|method| method.name().replace('-', "") == key)
            .ok_or_else(|| SampleError::unknown_method(s))
    }
}

/// Maps a target value to a position.
///
/// A localizer need not hold data itself; the positional reads default to
/// `false`, `0` and [`UNDEFINED`].
pub trait Localizer: Send + Sync {
    /// Re-establish the initial state.
    fn reset(&self) -> Result<()>;

    /// Set the localization method.
    fn set_method(&self, method: LocalizationMethod);

    /// The localization method.
    fn method(&self) -> LocalizationMethod;

    /// Whether `pval` can be localized.
    fn validate(&self, pval: f64) -> bool {
        let _ = pval;
        false
    }

    /// Locate a boolean value.
    fn locate_bool(&self, pval: bool) -> Result<Position> {
        let _ = pval;
        Ok(UNDEFINED)
    }

    /// Locate an integer value.
    fn locate_long(&self, pval: i64) -> Result<Position> {
        let _ = pval;
        Ok(UNDEFINED)
    }

    /// Locate a real value.
    fn locate_real(&self, pval: f64) -> Result<Position> {
        let _ = pval;
        Ok(UNDEFINED)
    }

    /// Read a boolean at `pos`.
    fn get_bool_at(&self, pos: Position) -> Result<bool> {
        let _ = pos;
        Ok(false)
    }

    /// Read an integer at `pos`.
    fn get_long_at(&self, pos: Position) -> Result<i64> {
        let _ = pos;
        Ok(0)
    }

    /// Read a real at `pos`.
    fn get_real_at(&self, pos: Position) -> Result<f64> {
        let _ = pos;
        Ok(UNDEFINED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_predicates() {
        assert!(LocalizationMethod::AbsoluteForward.is_forward());
        assert!(!LocalizationMethod::AbsoluteForward.is_relative());
        assert!(!LocalizationMethod::RelativeBackward.is_forward());
        assert!(LocalizationMethod::RelativeBackward.is_relative());
    }

    #[test]
    fn test_method_default() {
        assert_eq!(LocalizationMethod::default(), LocalizationMethod::AbsoluteForward);
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(
            "relative-forward".parse::<LocalizationMethod>(),
            Ok(LocalizationMethod::RelativeForward)
        );
        assert_eq!(
            "AbsoluteBackward".parse::<LocalizationMethod>(),
            Ok(LocalizationMethod::AbsoluteBackward)
        );
        assert_eq!(
            "relative_backward".parse::<LocalizationMethod>(),
            Ok(LocalizationMethod::RelativeBackward)
        );
        assert_eq!(
            "sideways".parse::<LocalizationMethod>(),
            Err(SampleError::unknown_method("sideways"))
        );
    }

    #[test]
    fn test_method_display_parses_back() {
        for method in LocalizationMethod::ALL {
            assert_eq!(method.to_string().parse::<LocalizationMethod>(), Ok(method));
        }
    }

    struct Empty;

    impl Localizer for Empty {
        fn reset(&self) -> Result<()> {
            Ok(())
        }

        fn set_method(&self, _method: LocalizationMethod) {}

        fn method(&self) -> LocalizationMethod {
            LocalizationMethod::default()
        }
    }

    #[test]
    fn test_localizer_defaults() {
        let empty = Empty;
        assert!(!empty.validate(0.0));
        assert!(empty.locate_real(1.0).unwrap().is_nan());
        assert!(empty.locate_long(1).unwrap().is_nan());
        assert!(empty.locate_bool(true).unwrap().is_nan());
        assert!(!empty.get_bool_at(0.0).unwrap());
        assert_eq!(empty.get_long_at(0.0).unwrap(), 0);
        assert!(empty.get_real_at(0.0).unwrap().is_nan());
    }
}
