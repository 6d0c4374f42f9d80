use std::thread;

use bert::{decode, BertDecoder, BertError, BertValue, DecodeOptions};

const STACK_SIZE: usize = 2 * 1024 * 1024;

const BERT: [u8; 7] = [100, 0, 4, b'b', b'e', b'r', b't'];
const DICT: [u8; 7] = [100, 0, 4, b'd', b'i', b'c', b't'];

/// `levels` nested `{bert, dict, [{1, <next>}]}` around a small int.
fn nested_dicts(levels: usize) -> Vec<u8> {
    let mut bytes = vec![131];
    for _ in 0..levels {
        bytes.extend_from_slice(&[104, 3]);
        bytes.extend_from_slice(&BERT);
        bytes.extend_from_slice(&DICT);
        bytes.extend_from_slice(&[108, 0, 0, 0, 1, 104, 2, 97, 1]);
    }
    bytes.extend_from_slice(&[97, 0]);
    bytes.extend(std::iter::repeat(106).take(levels));
    bytes
}

/// `levels` nested single-element lists around a small int.
fn nested_lists(levels: usize) -> Vec<u8> {
    let mut bytes = vec![131];
    for _ in 0..levels {
        bytes.extend_from_slice(&[108, 0, 0, 0, 1]);
    }
    bytes.extend_from_slice(&[97, 0]);
    bytes.extend(std::iter::repeat(106).take(levels));
    bytes
}

fn on_small_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    thread::Builder::new()
        .stack_size(STACK_SIZE)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

#[test]
fn limits_default_depth_stops_deep_dicts_on_small_stack() {
    for levels in [300, 512, 2000] {
        let bytes = nested_dicts(levels);
        let result = on_small_stack(move || decode(&bytes));
        assert_eq!(
            result,
            Err(BertError::DepthLimitExceeded(DecodeOptions::DEFAULT_MAX_DEPTH)),
            "{levels} levels"
        );
    }
}

#[test]
fn limits_default_depth_stops_deep_lists_on_small_stack() {
    let bytes = nested_lists(10_000);
    let result = on_small_stack(move || decode(&bytes));
    assert_eq!(
        result,
        Err(BertError::DepthLimitExceeded(DecodeOptions::DEFAULT_MAX_DEPTH))
    );
}

#[test]
fn limits_nesting_under_default_depth_decodes() {
    // each dict level costs two depth units: the tuple and its value
    let bytes = nested_dicts(DecodeOptions::DEFAULT_MAX_DEPTH / 2 - 1);
    let result = on_small_stack(move || decode(&bytes).map(|_| ()));
    assert_eq!(result, Ok(()));

    let bytes = nested_lists(DecodeOptions::DEFAULT_MAX_DEPTH - 1);
    let result = on_small_stack(move || decode(&bytes).map(|_| ()));
    assert_eq!(result, Ok(()));
}

#[test]
fn limits_atom_table_stays_bounded_across_messages() {
    let mut decoder = BertDecoder::new(DecodeOptions::default());
    for i in 0..10_000 {
        let name = format!("atom{i}");
        let mut message = vec![131, 100, 0, name.len() as u8];
        message.extend_from_slice(name.as_bytes());
        let value = decoder.decode(&message).unwrap();
        assert_eq!(value, BertValue::atom(&name));
        assert!(decoder.atoms().len() <= DecodeOptions::DEFAULT_MAX_ATOMS);
    }
    assert!(!decoder.atoms().is_empty());
}

#[test]
fn limits_atom_table_respects_custom_limit() {
    let mut decoder = BertDecoder::new(DecodeOptions::new().with_max_atoms(8));
    for i in 0..100u8 {
        decoder.decode(&[131, 100, 0, 1, i]).unwrap();
        assert!(decoder.atoms().len() <= 8);
    }
}
