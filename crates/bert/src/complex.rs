//! Tuples and the `{bert, ...}` complex types.
//!
//! A tuple whose first element is the atom `bert` encodes one of:
//!
//! | Form | Arity | Payload |
//! |---|---|---|
//! | `{bert, nil}` | 2 | |
//! | `{bert, true}` / `{bert, false}` | 2 | |
//! | `{bert, time, Mega, Secs, Micro}` | 5 | three integers |
//! | `{bert, regex, Source, Options}` | 4 | binary, list of atoms |
//! | `{bert, dict, Pairs}` | 3 | list (or nil) of 2-tuples |

use bert_buffers::Reader;
use indexmap::IndexMap;
use tracing::trace;

use crate::codec::CompactCodec;
use crate::constants::{BertTag, WRAPPER_ATOM};
use crate::decoder::BertDecoder;
use crate::error::BertError;
use crate::value::{BertValue, Regex, RegexFlags, Timestamp};

fn ensure_arity(form: &'static str, actual: u32, expected: u32) -> Result<(), BertError> {
    if actual != expected {
        return Err(BertError::ArityMismatch {
            form,
            expected,
            actual,
        });
    }
    Ok(())
}

fn type_check(expected: &'static str, found: &BertValue) -> BertError {
    BertError::TypeCheckFailure {
        expected,
        found: found.kind(),
    }
}

impl<C: CompactCodec> BertDecoder<C> {
    pub(crate) fn read_tuple(
        &mut self,
        reader: &mut Reader<'_>,
        arity: u32,
    ) -> Result<BertValue, BertError> {
        if arity == 0 {
            return Ok(BertValue::Tuple(Vec::new()));
        }

        let first = self.read_term(reader)?;
        if matches!(&first, BertValue::Atom(atom) if atom.is(WRAPPER_ATOM)) {
            // Complex forms take more stack per level and count twice.
            return self.descend(|decoder| decoder.read_complex(reader, arity));
        }

        let mut items = Vec::with_capacity((arity as usize).min(reader.size() + 1));
        items.push(first);
        for _ in 1..arity {
            items.push(self.read_term(reader)?);
        }
        Ok(BertValue::Tuple(items))
    }

    fn read_complex(&mut self, reader: &mut Reader<'_>, arity: u32) -> Result<BertValue, BertError> {
        let kind = self.read_term(reader)?;
        let name = match kind {
            BertValue::Atom(atom) => atom,
            other => return Err(type_check("atom", &other)),
        };
        trace!(form = %name, arity, "complex type");

        match name.as_bytes() {
            b"nil" | b"null" => {
                ensure_arity("nil", arity, 2)?;
                Ok(BertValue::Null)
            }
            b"true" => {
                ensure_arity("true", arity, 2)?;
                Ok(BertValue::Bool(true))
            }
            b"false" => {
                ensure_arity("false", arity, 2)?;
                Ok(BertValue::Bool(false))
            }
            b"time" => {
                ensure_arity("time", arity, 5)?;
                self.read_time(reader).map(BertValue::Timestamp)
            }
            b"regex" => {
                ensure_arity("regex", arity, 4)?;
                self.read_regex(reader).map(BertValue::Regex)
            }
            b"dict" => {
                ensure_arity("dict", arity, 3)?;
                self.read_dict(reader)
            }
            other => Err(BertError::InvalidComplexType(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }

    fn read_integer(&mut self, reader: &mut Reader<'_>) -> Result<i64, BertError> {
        let value = self.read_term(reader)?;
        value.as_i64().ok_or_else(|| type_check("integer", &value))
    }

    fn read_time(&mut self, reader: &mut Reader<'_>) -> Result<Timestamp, BertError> {
        let megasecs = self.read_integer(reader)?;
        let secs = self.read_integer(reader)?;
        let micros = self.read_integer(reader)?;
        Timestamp::from_parts(megasecs, secs, micros).ok_or(BertError::TypeCheckFailure {
            expected: "time within i64 seconds",
            found: "integer",
        })
    }

    fn read_regex(&mut self, reader: &mut Reader<'_>) -> Result<Regex, BertError> {
        let source = self.read_term(reader)?;
        let options = self.read_term(reader)?;

        let pattern = source
            .as_text()
            .ok_or_else(|| type_check("string", &source))?
            .to_vec();
        let options = options.as_list().ok_or_else(|| type_check("list", &options))?;

        let mut flags = RegexFlags::NONE;
        for (name, flag) in [
            (&b"caseless"[..], RegexFlags::CASELESS),
            (&b"extended"[..], RegexFlags::EXTENDED),
            (&b"multiline"[..], RegexFlags::MULTILINE),
        ] {
            if options
                .iter()
                .any(|opt| opt.as_atom().is_some_and(|atom| atom.is(name)))
            {
                flags.insert(flag);
            }
        }
        Ok(Regex { pattern, flags })
    }

    /// Dict payload: `Nil`, or `List` of `SmallTuple(2)` pairs plus a tail
    /// byte. Pair headers are matched byte for byte, so a pair written as a
    /// large tuple is rejected.
    fn read_dict(&mut self, reader: &mut Reader<'_>) -> Result<BertValue, BertError> {
        let byte = reader.try_u8()?;
        let length = match BertTag::from_byte(byte) {
            Some(BertTag::List) => reader.try_u32()? as usize,
            Some(BertTag::Nil) => return Ok(BertValue::Dict(IndexMap::new())),
            _ => return Err(BertError::InvalidDictSpec(byte)),
        };

        // Smallest pair: tuple header plus two one-byte terms.
        let mut map = IndexMap::with_capacity(length.min(reader.size() / 4));
        for _ in 0..length {
            reader.check(2)?;
            let tag = reader.try_u8()?;
            let arity = reader.try_u8()?;
            if tag != BertTag::SmallTuple as u8 || arity != 2 {
                return Err(BertError::InvalidDictEntry);
            }
            let key = self.read_term(reader)?;
            let value = self.read_term(reader)?;
            map.insert(key, value);
        }
        reader.try_u8()?;
        Ok(BertValue::Dict(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DecodeOptions;

    fn read(bytes: &[u8]) -> Result<BertValue, BertError> {
        BertDecoder::default().read_term(&mut Reader::new(bytes))
    }

    const BERT: [u8; 7] = [100, 0, 4, b'b', b'e', b'r', b't'];

    fn tagged(arity: u8, name: &str, payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![104, arity];
        bytes.extend_from_slice(&BERT);
        bytes.extend_from_slice(&[100, 0, name.len() as u8]);
        bytes.extend_from_slice(name.as_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn empty_tuple_reads_nothing_more() {
        let bytes = [104, 0, 97, 1];
        let mut reader = Reader::new(&bytes);
        let value = BertDecoder::default().read_term(&mut reader);
        assert_eq!(value, Ok(BertValue::Tuple(vec![])));
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn plain_tuple_keeps_first_element() {
        let bytes = [104, 3, 100, 0, 1, b'a', 97, 1, 97, 2];
        assert_eq!(
            read(&bytes),
            Ok(BertValue::Tuple(vec![
                BertValue::atom("a"),
                BertValue::SmallInt(1),
                BertValue::SmallInt(2),
            ]))
        );
    }

    #[test]
    fn single_wrapper_atom_needs_a_name() {
        let mut bytes = vec![104, 1];
        bytes.extend_from_slice(&BERT);
        assert!(matches!(read(&bytes), Err(BertError::UnexpectedEof { .. })));
    }

    #[test]
    fn name_must_be_an_atom() {
        let mut bytes = vec![104, 2];
        bytes.extend_from_slice(&BERT);
        bytes.extend_from_slice(&[97, 1]);
        assert_eq!(
            read(&bytes),
            Err(BertError::TypeCheckFailure {
                expected: "atom",
                found: "small_int"
            })
        );
    }

    #[test]
    fn arity_is_checked_per_form() {
        assert_eq!(
            read(&tagged(3, "nil", &[])),
            Err(BertError::ArityMismatch {
                form: "nil",
                expected: 2,
                actual: 3
            })
        );
        assert!(matches!(
            read(&tagged(4, "time", &[])),
            Err(BertError::ArityMismatch { form: "time", expected: 5, .. })
        ));
        assert!(matches!(
            read(&tagged(2, "dict", &[])),
            Err(BertError::ArityMismatch { form: "dict", expected: 3, .. })
        ));
    }

    #[test]
    fn complex_forms_count_an_extra_level() {
        let bytes = tagged(2, "true", &[]);
        let mut plain = vec![104, 2, 100, 0, 1, b'a'];
        plain.extend_from_slice(&[100, 0, 4, b't', b'r', b'u', b'e']);

        let mut shallow = BertDecoder::new(DecodeOptions::new().with_max_depth(2));
        assert!(shallow.read_term(&mut Reader::new(&plain)).is_ok());
        assert_eq!(
            shallow.read_term(&mut Reader::new(&bytes)),
            Err(BertError::DepthLimitExceeded(2))
        );

        let mut deeper = BertDecoder::new(DecodeOptions::new().with_max_depth(3));
        assert_eq!(deeper.read_term(&mut Reader::new(&bytes)), Ok(BertValue::Bool(true)));
    }

    #[test]
    fn null_is_an_alias_for_nil() {
        assert_eq!(read(&tagged(2, "null", &[])), Ok(BertValue::Null));
    }

    #[test]
    fn unknown_form() {
        assert_eq!(
            read(&tagged(2, "pid", &[])),
            Err(BertError::InvalidComplexType("pid".to_owned()))
        );
    }

    #[test]
    fn time_rejects_non_integers() {
        let payload = [97, 1, 97, 2, 106];
        assert_eq!(
            read(&tagged(5, "time", &payload)),
            Err(BertError::TypeCheckFailure {
                expected: "integer",
                found: "list"
            })
        );
    }

    #[test]
    fn time_accepts_bignum_components() {
        // mega as a small bignum 1, secs as int, micros as small int
        let payload = [110, 1, 0, 1, 98, 0, 7, 0xa1, 0x20, 97, 250];
        assert_eq!(
            read(&tagged(5, "time", &payload)),
            Ok(BertValue::Timestamp(Timestamp {
                secs: 1_500_000,
                micros: 250
            }))
        );
    }

    #[test]
    fn regex_type_checks() {
        // source is an atom
        let payload = [100, 0, 1, b'a', 106];
        assert_eq!(
            read(&tagged(4, "regex", &payload)),
            Err(BertError::TypeCheckFailure {
                expected: "string",
                found: "atom"
            })
        );
        // options is a binary
        let payload = [109, 0, 0, 0, 1, b'a', 109, 0, 0, 0, 0];
        assert_eq!(
            read(&tagged(4, "regex", &payload)),
            Err(BertError::TypeCheckFailure {
                expected: "list",
                found: "binary"
            })
        );
    }

    #[test]
    fn regex_accepts_nil_options_and_unicode_source() {
        let payload = [113, 0, 0, 0, 2, b'a', b'b', 106];
        assert_eq!(
            read(&tagged(4, "regex", &payload)),
            Ok(BertValue::Regex(Regex {
                pattern: b"ab".to_vec(),
                flags: RegexFlags::NONE
            }))
        );
    }

    #[test]
    fn dict_spec_must_be_list_or_nil() {
        assert_eq!(
            read(&tagged(3, "dict", &[109, 0, 0, 0, 0])),
            Err(BertError::InvalidDictSpec(109))
        );
    }

    #[test]
    fn dict_pairs_must_be_small_two_tuples() {
        // {k, v, extra} as a 3-tuple
        let payload = [108, 0, 0, 0, 1, 104, 3, 97, 1, 97, 2, 97, 3, 106];
        assert_eq!(read(&tagged(3, "dict", &payload)), Err(BertError::InvalidDictEntry));

        // a 2-tuple written with the large tuple header
        let payload = [108, 0, 0, 0, 1, 105, 0, 0, 0, 2, 97, 1, 97, 2, 106];
        assert_eq!(read(&tagged(3, "dict", &payload)), Err(BertError::InvalidDictEntry));
    }

    #[test]
    fn dict_last_write_wins() {
        let payload = [
            108, 0, 0, 0, 3, //
            104, 2, 97, 1, 97, 10, //
            104, 2, 97, 2, 97, 20, //
            104, 2, 97, 1, 97, 30, //
            106,
        ];
        let value = read(&tagged(3, "dict", &payload)).unwrap();
        let BertValue::Dict(map) = value else {
            panic!("expected dict, got {value:?}");
        };
        assert_eq!(map.len(), 2);
        assert_eq!(map[&BertValue::SmallInt(1)], BertValue::SmallInt(30));
        assert_eq!(map.get_index(0).map(|(k, _)| k), Some(&BertValue::SmallInt(1)));
    }

    #[test]
    fn nil_dict_consumes_only_the_nil_tag() {
        let mut bytes = tagged(3, "dict", &[106]);
        let expected_end = bytes.len();
        bytes.extend_from_slice(&[97, 7]);
        let mut reader = Reader::new(&bytes);
        let value = BertDecoder::default().read_term(&mut reader);
        assert_eq!(value, Ok(BertValue::Dict(IndexMap::new())));
        assert_eq!(reader.position(), expected_end);
    }
}
