//! The MIDI wire format talks in integers of unusual sizes: 4-bit channels, 7-bit data bytes,
//! 14-bit assembled values.
//! These wrappers make out-of-range values unrepresentable.

use crate::prelude::*;
use core::fmt;

/// Slightly restricted integers.
macro_rules! restricted_int {
    {$(#[$attr:meta])* $name:ident : $inner:tt => $bits:expr ;} => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default)]
        #[repr(transparent)]
        #[allow(non_camel_case_types)]
        pub struct $name($inner);
        impl From<$inner> for $name {
            /// Lossy conversion, loses the top bits.
            #[inline]
            fn from(raw: $inner) -> $name {
                $name::from_int_lossy(raw)
            }
        }
        impl From<$name> for $inner {
            #[inline]
            fn from(restricted: $name) -> $inner {restricted.0}
        }
        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
        impl $name {
            const MASK: $inner = (1 << $bits) - 1;

            /// The maximum value that this restricted integer can hold.
            #[inline]
            pub const fn max_value() -> $name {
                $name (Self::MASK)
            }

            /// Creates a restricted int from its non-restricted counterpart by masking off the
            /// extra bits.
            #[inline]
            pub const fn new(raw: $inner) -> $name {
                $name (raw & Self::MASK)
            }

            /// Creates a restricted int from its non-restricted counterpart by masking off the
            /// extra bits.
            #[inline]
            pub const fn from_int_lossy(raw: $inner) -> $name {
                $name (raw & Self::MASK)
            }

            /// Returns `Some` if the raw integer is within range of the restricted integer, and
            /// `None` otherwise.
            #[inline]
            pub fn try_from(raw: $inner) -> Option<$name> {
                if raw <= Self::MASK {
                    Some($name(raw))
                }else{
                    None
                }
            }

            /// Get the inner integer out of the wrapper.
            /// The inner integer is guaranteed to be in range of the restricted wrapper.
            #[inline]
            pub fn as_int(self) -> $inner {
                Into::into(self)
            }
        }
        impl PartialEq<$inner> for $name {
            fn eq(&self, rhs: &$inner) -> bool {
                self.as_int() == *rhs
            }
        }
        impl PartialEq<$name> for $inner {
            fn eq(&self, rhs: &$name) -> bool {
                *self == rhs.as_int()
            }
        }
    };
}
restricted_int! {
    /// A 14-bit integer type.
    ///
    /// Wraps the `u16` type and ensures that the top two bits are always zero.
    u14: u16 => 14;
}
restricted_int! {
    /// A 7-bit integer type, the range of a MIDI data byte.
    ///
    /// Wraps the `u8` type and ensures that the top bit is always zero.
    u7: u8 => 7;
}
restricted_int! {
    /// A 4-bit integer type, the range of a MIDI channel.
    ///
    /// Wraps the `u8` type and ensures that the top 4 bits are always zero.
    u4: u8 => 4;
}

impl u7 {
    /// Cast a slice of raw bytes to a slice of 7-bit data bytes, only if there are no
    /// out-of-range bytes.
    #[inline]
    pub fn slice_try_from_int(raw: &[u8]) -> Option<&[u7]> {
        for &int in raw {
            if int > Self::MASK {
                return None;
            }
        }
        unsafe { Some(Self::slice_from_int_unchecked(raw)) }
    }

    /// Cast a slice of raw bytes to a slice of 7-bit data bytes.
    ///
    /// The slice is truncated up to the first out-of-range byte, if there is any.
    #[inline]
    pub fn slice_from_int(raw: &[u8]) -> &[u7] {
        let first_oob = raw
            .iter()
            .position(|&b| b > Self::MASK)
            .unwrap_or(raw.len());
        unsafe { Self::slice_from_int_unchecked(&raw[..first_oob]) }
    }

    /// Cast a slice of raw bytes to a slice of 7-bit data bytes.
    ///
    /// # Safety
    ///
    /// The input slice must not contain any out-of-range bytes.
    #[inline]
    pub unsafe fn slice_from_int_unchecked(raw: &[u8]) -> &[u7] {
        &*(raw as *const [u8] as *const [u7])
    }

    /// Cast a slice of 7-bit data bytes to the corresponding raw bytes.
    ///
    /// All bytes are guaranteed to be within the data byte range.
    #[inline]
    pub fn slice_as_int(slice: &[u7]) -> &[u8] {
        unsafe { &*(slice as *const [u7] as *const [u8]) }
    }

    /// Narrow a raw data byte, masking the top bit away by default and rejecting it under the
    /// `strict` feature.
    #[inline]
    pub(crate) fn from_data_byte(raw: u8) -> StdResult<u7, &'static ErrorKind> {
        if cfg!(feature = "strict") {
            Self::try_from(raw).ok_or(err_malformed!("data byte with top bit set"))
        } else {
            Ok(Self::from_int_lossy(raw))
        }
    }
}
