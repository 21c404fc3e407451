//! Enumerations cross the boundary as their underlying integer.
//!
//! [`EnumValue`] ties a Rust enum to its declared width; [`flat_enum!`]
//! declares one with exact discriminants and the conversions both ways.
//! A raw value with no matching member is rejected, never coerced.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{value} is not a member of `{name}`")]
pub struct EnumError {
    pub name: &'static str,
    pub value: i128,
}

/// An enumeration with a fixed underlying integer width.
pub trait EnumValue: Sized + Copy {
    /// The integer type that crosses the boundary.
    type Raw: Copy + Into<i128>;

    const NAME: &'static str;

    fn to_raw(self) -> Self::Raw;

    fn from_raw(raw: Self::Raw) -> Result<Self, EnumError>;

    fn members() -> &'static [Self];
}

/// Declare a `#[repr]` enum with explicit discriminants and implement
/// [`EnumValue`] for it.
///
/// ```
/// flatbind_runtime::flat_enum! {
///     pub enum Level: i8 { Low = -1, High = 1 }
/// }
/// use flatbind_runtime::EnumValue;
/// assert_eq!(Level::from_raw(1), Ok(Level::High));
/// ```
#[macro_export]
macro_rules! flat_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $raw:ty { $($member:ident = $value:expr),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr($raw)]
        $vis enum $name {
            $($member = $value),+
        }

        impl $crate::enums::EnumValue for $name {
            type Raw = $raw;

            const NAME: &'static str = stringify!($name);

            fn to_raw(self) -> $raw {
                self as $raw
            }

            fn from_raw(raw: $raw) -> ::std::result::Result<Self, $crate::enums::EnumError> {
                $(
                    if raw == $value {
                        return Ok($name::$member);
                    }
                )+
                Err($crate::enums::EnumError {
                    name: stringify!($name),
                    value: raw.into(),
                })
            }

            fn members() -> &'static [Self] {
                &[$($name::$member),+]
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::flat_enum! {
        enum Tiny: i8 { Min = -128, Zero = 0, Max = 127 }
    }

    crate::flat_enum! {
        enum Flags: u16 { Empty = 0, All = 65535 }
    }

    crate::flat_enum! {
        enum Wide: i64 { Low = i64::MIN, High = i64::MAX }
    }

    #[test]
    fn extremes_round_trip() {
        for &m in Tiny::members() {
            assert_eq!(Tiny::from_raw(m.to_raw()), Ok(m));
        }
        for &m in Flags::members() {
            assert_eq!(Flags::from_raw(m.to_raw()), Ok(m));
        }
        assert_eq!(Wide::Low.to_raw(), i64::MIN);
        assert_eq!(Wide::from_raw(i64::MAX), Ok(Wide::High));
        assert_eq!(Flags::All.to_raw(), u16::MAX);
    }

    #[test]
    fn unknown_value_is_rejected() {
        let err = Tiny::from_raw(5).unwrap_err();
        assert_eq!(err, EnumError { name: "Tiny", value: 5 });
        assert_eq!(err.to_string(), "5 is not a member of `Tiny`");
    }
}
