//! Helpers for reading fields out of dynamically decoded chain values.

use subxt::ext::scale_value::{Composite, Primitive, Value, ValueDef};

/// Extract an unsigned integer from a primitive value
pub fn as_u128<T>(val: &Value<T>) -> Option<u128> {
    match &val.value {
        ValueDef::Primitive(Primitive::U128(n)) => Some(*n),
        // Newtype wrappers such as `TwinId(u32)` decode as a one-field composite
        ValueDef::Composite(Composite::Unnamed(values)) if values.len() == 1 => {
            as_u128(&values[0])
        }
        _ => None,
    }
}

pub fn as_u64<T>(val: &Value<T>) -> Option<u64> {
    as_u128(val).and_then(|n| u64::try_from(n).ok())
}

pub fn as_u32<T>(val: &Value<T>) -> Option<u32> {
    as_u128(val).and_then(|n| u32::try_from(n).ok())
}

/// Depth-first search for the first field called `name`.
pub fn find_field<'a, T>(val: &'a Value<T>, name: &str) -> Option<&'a Value<T>> {
    match &val.value {
        ValueDef::Composite(composite) => find_in_composite(composite, name),
        ValueDef::Variant(variant) => find_in_composite(&variant.values, name),
        _ => None,
    }
}

/// Same as [`find_field`] but starting from a composite, which is how event
/// fields are handed back by subxt.
pub fn find_in_composite<'a, T>(composite: &'a Composite<T>, name: &str) -> Option<&'a Value<T>> {
    match composite {
        Composite::Named(fields) => {
            if let Some((_, value)) = fields.iter().find(|(field, _)| field == name) {
                return Some(value);
            }
            fields.iter().find_map(|(_, value)| find_field(value, name))
        }
        Composite::Unnamed(values) => values.iter().find_map(|value| find_field(value, name)),
    }
}

/// Find a named numeric field anywhere inside `val`.
pub fn find_u32<T>(val: &Value<T>, name: &str) -> Option<u32> {
    find_field(val, name).and_then(as_u32)
}
