//! Byte positions and byte lengths within a single line of source.
//!
//! A ZPM line is never longer than `u32::MAX` bytes in practice, so both are stored as
//! `u32` and widened to `usize` only when slicing.

macro_rules! byte_count {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name(u32);

        impl From<$name> for usize {
            fn from(value: $name) -> Self {
                value.0 as usize
            }
        }

        impl From<usize> for $name {
            fn from(value: usize) -> Self {
                Self(value as u32)
            }
        }
    };
}

byte_count!(
    /// Offset of a character from the start of the line.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
    SpanIndex
);

byte_count!(
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    SpanLength
);

impl std::ops::Add<SpanLength> for SpanIndex {
    type Output = Self;

    fn add(self, rhs: SpanLength) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Add<usize> for SpanIndex {
    type Output = Self;

    fn add(self, rhs: usize) -> Self::Output {
        self + SpanLength::from(rhs)
    }
}

impl std::ops::Sub<SpanIndex> for SpanIndex {
    type Output = SpanLength;

    fn sub(self, rhs: SpanIndex) -> Self::Output {
        SpanLength(self.0 - rhs.0)
    }
}
