//! Aggregate wire syntax
//!
//! Arrays travel as `[item,item]` and objects as `{key:item,key:item}`,
//! where every item is tagged wire text. Because items are percent-encoded,
//! a plain split on the delimiters is exact.

use alloc::string::String;
use alloc::vec::Vec;

use crate::{percent_decode, WireError, WireValue};

/// Split array text into its items.
pub fn split_array(raw: &str) -> Result<Vec<WireValue>, WireError> {
    let inner = strip_delimiters(raw, '[', ']')?;
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    Ok(inner
        .split(',')
        .map(|item| WireValue::parse(item.trim()))
        .collect())
}

/// Split object text into `(decoded key, item)` pairs, in wire order.
pub fn split_object(raw: &str) -> Result<Vec<(String, WireValue)>, WireError> {
    let inner = strip_delimiters(raw, '{', '}')?;
    if inner.is_empty() {
        return Ok(Vec::new());
    }

    let mut members = Vec::new();
    for member in inner.split(',') {
        let member = member.trim();
        let (key, item) = member.split_once(':').ok_or_else(|| WireError::MissingKey {
            text: String::from(member),
        })?;
        let key = percent_decode(key.trim())?;
        if key.is_empty() {
            return Err(WireError::MissingKey {
                text: String::from(member),
            });
        }
        members.push((key, WireValue::parse(item.trim())));
    }
    Ok(members)
}

fn strip_delimiters(raw: &str, open: char, close: char) -> Result<&str, WireError> {
    raw.trim()
        .strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
        .map(str::trim)
        .ok_or_else(|| WireError::Unbalanced {
            text: String::from(raw),
            open,
            close,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WireKind;

    #[test]
    fn array_items_are_tagged() {
        let items = split_array(" [number:1, reference:c0-e2,string:a%2Cb] ").unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].kind(), WireKind::Number);
        assert_eq!(items[1].reference_id(), Some("c0-e2"));
        assert_eq!(items[2].decoded().as_deref(), Ok("a,b"));
    }

    #[test]
    fn empty_aggregates() {
        assert!(split_array("[]").unwrap().is_empty());
        assert!(split_object("{ }").unwrap().is_empty());
    }

    #[test]
    fn object_members_keep_order() {
        let members = split_object("{name:string:Ada,next:reference:c0-e1}").unwrap();
        assert_eq!(members[0].0, "name");
        assert_eq!(members[0].1.raw(), "Ada");
        assert_eq!(members[1].0, "next");
        assert_eq!(members[1].1.kind(), WireKind::Reference);
    }

    #[test]
    fn unbalanced_and_keyless() {
        assert!(matches!(split_array("[1,2"), Err(WireError::Unbalanced { .. })));
        assert!(matches!(split_object("{novalue}"), Err(WireError::MissingKey { .. })));
    }
}
