//! Typed extraction from `Properties.GetAll` result bags.

use std::collections::HashMap;

use zbus::zvariant::{OwnedValue, Value};

use crate::error::{InspectError, Result};

pub type PropBag = HashMap<String, OwnedValue>;

fn take(bag: &mut PropBag, key: &'static str) -> Result<OwnedValue> {
    bag.remove(key).ok_or(InspectError::MissingProperty(key))
}

pub fn take_str(bag: &mut PropBag, key: &'static str) -> Result<String> {
    let value = take(bag, key)?;
    match &*value {
        Value::Str(s) => Ok(s.to_string()),
        _ => Err(InspectError::PropertyType(key)),
    }
}

pub fn take_bool(bag: &mut PropBag, key: &'static str) -> Result<bool> {
    let value = take(bag, key)?;
    match &*value {
        Value::Bool(b) => Ok(*b),
        _ => Err(InspectError::PropertyType(key)),
    }
}

pub fn take_u32(bag: &mut PropBag, key: &'static str) -> Result<u32> {
    let value = take(bag, key)?;
    match &*value {
        Value::U32(n) => Ok(*n),
        _ => Err(InspectError::PropertyType(key)),
    }
}

pub fn take_u64(bag: &mut PropBag, key: &'static str) -> Result<u64> {
    let value = take(bag, key)?;
    match &*value {
        Value::U64(n) => Ok(*n),
        _ => Err(InspectError::PropertyType(key)),
    }
}

/// Extract an `a(ss)` property, e.g. the path specs of a path unit.
pub fn take_string_pairs(bag: &mut PropBag, key: &'static str) -> Result<Vec<(String, String)>> {
    let value = take(bag, key)?;
    let array = match &*value {
        Value::Array(array) => array,
        _ => return Err(InspectError::PropertyType(key)),
    };

    let mut pairs = Vec::with_capacity(array.len());
    for item in array.iter() {
        let fields = match item {
            Value::Structure(s) => s.fields(),
            _ => return Err(InspectError::PropertyType(key)),
        };
        match fields {
            [Value::Str(a), Value::Str(b)] => pairs.push((a.to_string(), b.to_string())),
            _ => return Err(InspectError::PropertyType(key)),
        }
    }
    Ok(pairs)
}

/// Convert a single `Properties.Get` result.
pub fn value_u64(value: OwnedValue, key: &'static str) -> Result<u64> {
    match &*value {
        Value::U64(n) => Ok(*n),
        _ => Err(InspectError::PropertyType(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag_with(key: &str, value: Value<'_>) -> PropBag {
        let mut bag = PropBag::new();
        bag.insert(key.to_owned(), value.try_to_owned().unwrap());
        bag
    }

    #[test]
    fn scalars_extract_by_wire_type() {
        let mut bag = bag_with("Result", Value::from("exit-code"));
        assert_eq!(take_str(&mut bag, "Result").unwrap(), "exit-code");

        let mut bag = bag_with("Accept", Value::from(true));
        assert!(take_bool(&mut bag, "Accept").unwrap());

        let mut bag = bag_with("NConnections", Value::from(3u32));
        assert_eq!(take_u32(&mut bag, "NConnections").unwrap(), 3);

        let mut bag = bag_with("NextElapseUSecRealtime", Value::from(42u64));
        assert_eq!(take_u64(&mut bag, "NextElapseUSecRealtime").unwrap(), 42);
    }

    #[test]
    fn absent_key_is_a_missing_property() {
        let mut bag = PropBag::new();
        match take_str(&mut bag, "Where") {
            Err(InspectError::MissingProperty("Where")) => {}
            other => panic!("expected missing property, got {:?}", other),
        }
    }

    #[test]
    fn wrong_wire_type_is_rejected() {
        let mut bag = bag_with("Where", Value::from(7u64));
        match take_str(&mut bag, "Where") {
            Err(InspectError::PropertyType("Where")) => {}
            other => panic!("expected property type error, got {:?}", other),
        }
    }
}
