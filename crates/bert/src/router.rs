//! Magic-byte dispatch: the public decode entry points.

use bert_buffers::Reader;
use tracing::debug;

use crate::codec::{supports, CompactCodec};
use crate::constants::ProtocolVersion;
use crate::decoder::BertDecoder;
use crate::error::BertError;
use crate::value::BertValue;

impl<C: CompactCodec> BertDecoder<C> {
    /// Decodes one complete message.
    ///
    /// The first byte selects the protocol version: 131 and 132 are read
    /// natively, 133 and 134 are handed to the compact codec once it reports
    /// the matching capability. Bytes after the top-level term are ignored.
    pub fn decode(&mut self, input: &[u8]) -> Result<BertValue, BertError> {
        self.reset_depth();
        let mut reader = Reader::new(input);
        let magic = reader.try_u8()?;
        let version = ProtocolVersion::from_byte(magic).ok_or(BertError::InvalidMagic(magic))?;
        debug!(?version, len = input.len(), "decode");

        let Some(capability) = version.required_capability() else {
            let value = self.read_term(&mut reader)?;
            if !reader.is_empty() {
                debug!(trailing = reader.size(), "ignoring bytes after term");
            }
            return Ok(value);
        };

        if !supports(capability, &self.codec) {
            debug!(capability, "compact codec unavailable");
            return Err(BertError::UnsupportedVersion {
                version: magic,
                capability,
            });
        }
        match version {
            ProtocolVersion::CompactV1 => self.codec.unpack_unsafe(reader.rest()),
            _ => self.codec.unpack(reader.rest()),
        }
    }
}

/// Decodes `input` with default options and no compact codec.
pub fn decode(input: &[u8]) -> Result<BertValue, BertError> {
    BertDecoder::default().decode(input)
}

/// Decodes `input` with default options, delegating versions 133/134 to
/// `codec`.
pub fn decode_with<C: CompactCodec>(input: &[u8], codec: C) -> Result<BertValue, BertError> {
    BertDecoder::with_codec(Default::default(), codec).decode(input)
}
