//! Per-call wire value sets

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::WireValue;

/// All wire values delivered for one call.
///
/// Values are keyed by the id the caller assigned (`c0-param0`, `c0-e3`, ...).
/// Parameters are additionally indexed by the number their id ends in, so
/// the order lines arrive in does not matter. Lookups borrow and never
/// consume, so one parameter's conversion cannot disturb another's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WireBatch {
    values: HashMap<String, WireValue>,
    // (index, id), sorted by index
    params: Vec<(usize, String)>,
}

impl WireBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a line-oriented call body: one `id=tagged-text` per line.
    ///
    /// Ids ending in `-param<N>` are parameter `N`; everything else is a
    /// plain value. Blank lines and lines without `=` are skipped.
    pub fn parse_lines(body: &str) -> Self {
        let mut batch = Self::new();
        for line in body.lines() {
            let line = line.trim();
            let Some((id, tagged)) = line.split_once('=') else {
                continue;
            };
            let id = id.trim();
            if id.is_empty() {
                continue;
            }
            let value = WireValue::parse(tagged);
            if Self::param_index(id).is_some() {
                batch.push_param(id, value);
            } else {
                batch.insert(id, value);
            }
        }
        batch
    }

    /// Store a non-parameter value (an aggregate element). Returns the value
    /// previously stored under `id`, if any.
    pub fn insert(&mut self, id: impl Into<String>, value: WireValue) -> Option<WireValue> {
        self.values.insert(id.into(), value)
    }

    /// Store a value and register it as the parameter its id names.
    ///
    /// Returns `false` if the id carries no parameter index; the value is
    /// then stored as a plain value. A later id for an index already taken
    /// replaces the earlier one.
    pub fn push_param(&mut self, id: impl Into<String>, value: WireValue) -> bool {
        let id = id.into();
        let Some(index) = Self::param_index(&id) else {
            self.values.insert(id, value);
            return false;
        };
        self.values.insert(id.clone(), value);
        match self.params.binary_search_by_key(&index, |(i, _)| *i) {
            Ok(pos) => self.params[pos].1 = id,
            Err(pos) => self.params.insert(pos, (index, id)),
        }
        true
    }

    pub fn get(&self, id: &str) -> Option<&WireValue> {
        self.values.get(id)
    }

    /// Id and value of parameter `index`, if the call supplied it.
    pub fn param(&self, index: usize) -> Option<(&str, &WireValue)> {
        let pos = self
            .params
            .binary_search_by_key(&index, |(i, _)| *i)
            .ok()?;
        let id = self.params[pos].1.as_str();
        self.values.get(id).map(|value| (id, value))
    }

    /// Parameter ids by ascending index. Indexes may have gaps.
    pub fn param_ids(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(_, id)| id.as_str())
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The conventional id of parameter `index` in call `call`.
    pub fn param_id(call: usize, index: usize) -> String {
        let mut id = String::from("c");
        id.push_str(&call.to_string());
        id.push_str("-param");
        id.push_str(&index.to_string());
        id
    }

    /// The parameter index an id names: `c0-param2` is parameter 2.
    pub fn param_index(id: &str) -> Option<usize> {
        let (_, digits) = id.rsplit_once("-param")?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}
