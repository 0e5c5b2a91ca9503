/// A fixed-width codec for values stored in a [`HashMap`](crate::HashMap).
///
/// The table never looks inside a payload: it only needs to know how many
/// bytes each value takes. `SIZE` fixes that width at compile time, so a
/// `HashMap<V>` can only ever be handed payloads of the right width.
///
/// `serialize` receives a buffer of exactly `SIZE` bytes and must fill all of
/// it. `deserialize` receives exactly `SIZE` bytes.
///
/// # Examples
///
/// ```rust
/// # use flat_multimap::Value;
/// #
/// #[derive(Debug, PartialEq)]
/// struct Sample {
///     step: i32,
///     last_seen: i64,
/// }
///
/// impl Value for Sample {
///     const SIZE: usize = 12;
///
///     fn serialize(&self, dst: &mut [u8]) {
///         dst[..4].copy_from_slice(&self.step.to_le_bytes());
///         dst[4..].copy_from_slice(&self.last_seen.to_le_bytes());
///     }
///
///     fn deserialize(src: &[u8]) -> Self {
///         Sample {
///             step: i32::deserialize(&src[..4]),
///             last_seen: i64::deserialize(&src[4..]),
///         }
///     }
/// }
///
/// let mut buf = [0u8; Sample::SIZE];
/// let sample = Sample { step: 3, last_seen: -9 };
/// sample.serialize(&mut buf);
/// assert_eq!(Sample::deserialize(&buf), sample);
/// ```
pub trait Value: Sized {
    /// Width of the serialized value in bytes.
    const SIZE: usize;

    /// Writes the value into `dst`, which is exactly `SIZE` bytes long.
    fn serialize(&self, dst: &mut [u8]);

    /// Reads a value back from `src`, which is exactly `SIZE` bytes long.
    fn deserialize(src: &[u8]) -> Self;
}

macro_rules! impl_value_le {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Value for $ty {
                const SIZE: usize = core::mem::size_of::<$ty>();

                #[inline(always)]
                fn serialize(&self, dst: &mut [u8]) {
                    dst.copy_from_slice(&self.to_le_bytes());
                }

                #[inline(always)]
                fn deserialize(src: &[u8]) -> Self {
                    let mut bytes = [0u8; core::mem::size_of::<$ty>()];
                    bytes.copy_from_slice(src);
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_value_le!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128, f32, f64);

impl<const N: usize> Value for [u8; N] {
    const SIZE: usize = N;

    #[inline(always)]
    fn serialize(&self, dst: &mut [u8]) {
        dst.copy_from_slice(self);
    }

    #[inline(always)]
    fn deserialize(src: &[u8]) -> Self {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(src);
        bytes
    }
}

/// Zero-width values. A `HashMap<()>` only counts how often each key was
/// inserted.
impl Value for () {
    const SIZE: usize = 0;

    #[inline(always)]
    fn serialize(&self, _dst: &mut [u8]) {}

    #[inline(always)]
    fn deserialize(_src: &[u8]) -> Self {}
}

impl<A: Value, B: Value> Value for (A, B) {
    const SIZE: usize = A::SIZE + B::SIZE;

    #[inline]
    fn serialize(&self, dst: &mut [u8]) {
        let (a, b) = dst.split_at_mut(A::SIZE);
        self.0.serialize(a);
        self.1.serialize(b);
    }

    #[inline]
    fn deserialize(src: &[u8]) -> Self {
        let (a, b) = src.split_at(A::SIZE);
        (A::deserialize(a), B::deserialize(b))
    }
}

impl<A: Value, B: Value, C: Value> Value for (A, B, C) {
    const SIZE: usize = A::SIZE + B::SIZE + C::SIZE;

    #[inline]
    fn serialize(&self, dst: &mut [u8]) {
        let (a, rest) = dst.split_at_mut(A::SIZE);
        let (b, c) = rest.split_at_mut(B::SIZE);
        self.0.serialize(a);
        self.1.serialize(b);
        self.2.serialize(c);
    }

    #[inline]
    fn deserialize(src: &[u8]) -> Self {
        let (a, rest) = src.split_at(A::SIZE);
        let (b, c) = rest.split_at(B::SIZE);
        (A::deserialize(a), B::deserialize(b), C::deserialize(c))
    }
}
