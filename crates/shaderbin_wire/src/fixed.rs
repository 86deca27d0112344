//! Fixed-width little-endian scalars.

/// A plain scalar with a fixed little-endian encoding.
///
/// Implemented for the integer types the cache format uses. Encoding is
/// always little-endian regardless of the host.
pub trait Fixed: Copy {
    /// Encoded width in bytes.
    const SIZE: usize;

    /// Decodes a value from exactly [`Self::SIZE`] bytes.
    fn decode(bytes: &[u8]) -> Self;

    /// Appends the encoded value to `out`.
    fn encode(self, out: &mut Vec<u8>);
}

macro_rules! impl_fixed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Fixed for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn decode(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }

                fn encode(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_fixed!(u8, u16, u32, u64, i8, i16, i32, i64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_layout() {
        let mut out = Vec::new();
        0x0403_0201u32.encode(&mut out);
        assert_eq!(out, [1, 2, 3, 4]);
        assert_eq!(u32::decode(&out), 0x0403_0201);
    }

    #[test]
    fn signed_values() {
        let mut out = Vec::new();
        (-1i32).encode(&mut out);
        assert_eq!(out, [0xff; 4]);
        assert_eq!(i32::decode(&out), -1);
    }

    #[test]
    fn sizes() {
        assert_eq!(u8::SIZE, 1);
        assert_eq!(u16::SIZE, 2);
        assert_eq!(i64::SIZE, 8);
    }
}
