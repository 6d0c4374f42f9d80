//! Seam for the external compact codec used by protocol versions 133/134.

use crate::constants::{CAPABILITY_V1, CAPABILITY_V2, CAPABILITY_V3, CAPABILITY_V4};
use crate::error::BertError;
use crate::value::BertValue;

/// A codec that decodes the compact message versions.
///
/// The decoder only asks for a capability and then hands over the bytes that
/// follow the magic byte to one of the two entry points.
pub trait CompactCodec {
    /// Whether the codec can decode streams tagged with `capability`
    /// (`"v3"` or `"v4"`).
    fn supports(&self, capability: &str) -> bool;

    /// Fully validating decode.
    fn unpack(&self, bytes: &[u8]) -> Result<BertValue, BertError>;

    /// Decode that may trust the input to be well formed.
    fn unpack_unsafe(&self, bytes: &[u8]) -> Result<BertValue, BertError>;
}

impl<T: CompactCodec + ?Sized> CompactCodec for &T {
    fn supports(&self, capability: &str) -> bool {
        (**self).supports(capability)
    }

    fn unpack(&self, bytes: &[u8]) -> Result<BertValue, BertError> {
        (**self).unpack(bytes)
    }

    fn unpack_unsafe(&self, bytes: &[u8]) -> Result<BertValue, BertError> {
        (**self).unpack_unsafe(bytes)
    }
}

impl<T: CompactCodec + ?Sized> CompactCodec for Box<T> {
    fn supports(&self, capability: &str) -> bool {
        (**self).supports(capability)
    }

    fn unpack(&self, bytes: &[u8]) -> Result<BertValue, BertError> {
        (**self).unpack(bytes)
    }

    fn unpack_unsafe(&self, bytes: &[u8]) -> Result<BertValue, BertError> {
        (**self).unpack_unsafe(bytes)
    }
}

/// Codec used when none is configured: supports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompactCodec;

impl CompactCodec for NoCompactCodec {
    fn supports(&self, _capability: &str) -> bool {
        false
    }

    fn unpack(&self, _bytes: &[u8]) -> Result<BertValue, BertError> {
        Err(BertError::Codec("no compact codec configured".to_owned()))
    }

    fn unpack_unsafe(&self, bytes: &[u8]) -> Result<BertValue, BertError> {
        self.unpack(bytes)
    }
}

/// Whether messages tagged with `capability` can be decoded given `codec`.
///
/// `v1` and `v2` are handled natively; `v3` and `v4` depend on the codec.
pub fn supports<C: CompactCodec + ?Sized>(capability: &str, codec: &C) -> bool {
    match capability {
        CAPABILITY_V1 | CAPABILITY_V2 => true,
        CAPABILITY_V3 | CAPABILITY_V4 => codec.supports(capability),
        _ => false,
    }
}
