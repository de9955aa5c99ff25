use crate::value::{
    Value,
    compare::{canonical_float, sorted_entries},
};
use xxhash_rust::xxh3::Xxh3;

/// Stable XXH3 seed used by canonical value hashing.
pub(crate) const VALUE_HASH_SEED: u64 = 0;

/// Value-hash format version byte fed ahead of every digest.
pub(crate) const VALUE_HASH_VERSION: u8 = 1;

///
/// StableHash
///
/// StableHash is the fixed-width hash identifier used by grouping and
/// distinct key materialization paths.
///

pub type StableHash = u64;

fn feed_u8(h: &mut Xxh3, x: u8) {
    h.update(&[x]);
}
fn feed_u64(h: &mut Xxh3, x: u64) {
    h.update(&x.to_be_bytes());
}
fn feed_i64(h: &mut Xxh3, x: i64) {
    h.update(&x.to_be_bytes());
}
fn feed_len(h: &mut Xxh3, len: usize) {
    feed_u64(h, len as u64);
}

/// Hash one value under the canonical equality contract.
#[must_use]
pub fn stable_hash_value(value: &Value) -> StableHash {
    let mut h = Xxh3::with_seed(VALUE_HASH_SEED);
    feed_u8(&mut h, VALUE_HASH_VERSION);
    write_to_hasher(value, &mut h);

    h.digest()
}

/// Hash an ordered tuple of values (one grouping key).
#[must_use]
pub fn stable_hash_values(values: &[Value]) -> StableHash {
    let mut h = Xxh3::with_seed(VALUE_HASH_SEED);
    feed_u8(&mut h, VALUE_HASH_VERSION);
    feed_len(&mut h, values.len());
    for value in values {
        write_to_hasher(value, &mut h);
    }

    h.digest()
}

fn write_to_hasher(value: &Value, h: &mut Xxh3) {
    feed_u8(h, value.canonical_tag().to_u8());

    match value {
        Value::Bool(b) => feed_u8(h, u8::from(*b)),
        Value::Float(v) => feed_u64(h, canonical_float(*v).to_bits()),
        Value::Int(v) => feed_i64(h, *v),
        Value::List(items) => {
            feed_len(h, items.len());
            for item in items {
                write_to_hasher(item, h);
            }
        }
        // Hash entries under canonical order so hashing agrees with
        // canonical map equality regardless of insertion order.
        Value::Map(entries) => {
            let ordered = sorted_entries(entries);
            feed_len(h, ordered.len());
            for (key, value) in ordered {
                feed_u8(h, 0xFD);
                write_to_hasher(key, h);
                feed_u8(h, 0xFE);
                write_to_hasher(value, h);
            }
        }
        Value::Null => {}
        Value::Text(s) => {
            feed_len(h, s.len());
            h.update(s.as_bytes());
        }
    }
}
