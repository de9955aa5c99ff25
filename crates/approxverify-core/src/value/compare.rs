use crate::value::Value;
use std::cmp::Ordering;

/// Total canonical comparator used by grouping keys and map lookups.
///
/// Ordering rules:
/// 1. Canonical variant rank
/// 2. Variant-specific comparison for same-ranked values
///
/// Mixed-variant comparisons are rank-only and must remain deterministic.
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = left.canonical_tag().cmp(&right.canonical_tag());
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

fn canonical_cmp_same_rank(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Float(a), Value::Float(b)) => canonical_float(*a).total_cmp(&canonical_float(*b)),
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::List(a), Value::List(b)) => canonical_cmp_list(a, b),
        (Value::Map(a), Value::Map(b)) => canonical_cmp_map(a, b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

fn canonical_cmp_list(left: &[Value], right: &[Value]) -> Ordering {
    for (l, r) in left.iter().zip(right.iter()) {
        let cmp = canonical_cmp(l, r);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}

// Maps compare as sorted entry lists so insertion order never affects equality.
fn canonical_cmp_map(left: &[(Value, Value)], right: &[(Value, Value)]) -> Ordering {
    let left = sorted_entries(left);
    let right = sorted_entries(right);

    for ((lk, lv), (rk, rv)) in left.iter().zip(right.iter()) {
        let cmp = canonical_cmp(lk, rk).then_with(|| canonical_cmp(lv, rv));
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}

pub(super) fn sorted_entries(entries: &[(Value, Value)]) -> Vec<&(Value, Value)> {
    let mut ordered = entries.iter().collect::<Vec<_>>();
    ordered.sort_by(|(lk, lv), (rk, rv)| canonical_cmp(lk, rk).then_with(|| canonical_cmp(lv, rv)));

    ordered
}

/// Collapse `-0.0` into `0.0` and every NaN payload into one quiet NaN.
#[must_use]
pub(super) const fn canonical_float(value: f64) -> f64 {
    if value.is_nan() {
        f64::NAN
    } else if value == 0.0 {
        0.0
    } else {
        value
    }
}
