use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde_json::{Map, Value};

use crate::foundation::error::{SkinError, SkinResult};

/// Typed, validated access to a strategy's option map.
///
/// `null` counts as unset. Every failure is a configuration error naming the
/// strategy and the offending key.
#[derive(Clone, Copy, Debug)]
pub struct OptionReader<'a> {
    strategy: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> OptionReader<'a> {
    /// Rejects keys not listed in `declared`.
    pub fn new(
        strategy: &'static str,
        map: &'a Map<String, Value>,
        declared: &[&str],
    ) -> SkinResult<Self> {
        if let Some(key) = map.keys().find(|k| !declared.contains(&k.as_str())) {
            return Err(SkinError::config(format!(
                "strategy \"{strategy}\": unrecognized option \"{key}\" (expected one of: {})",
                declared.join(", ")
            )));
        }
        Ok(Self { strategy, map })
    }

    fn value(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn invalid(&self, key: &str, msg: impl std::fmt::Display) -> SkinError {
        SkinError::config(format!(
            "strategy \"{}\": invalid option \"{key}\": {msg}",
            self.strategy
        ))
    }

    pub fn bool(&self, key: &str, default: bool) -> SkinResult<bool> {
        match self.value(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(self.invalid(key, format!("expected a boolean, got {other}"))),
        }
    }

    pub fn opt_int(&self, key: &str, range: RangeInclusive<i64>) -> SkinResult<Option<i64>> {
        let Some(v) = self.value(key) else {
            return Ok(None);
        };
        let n = v
            .as_i64()
            .ok_or_else(|| self.invalid(key, format!("expected an integer, got {v}")))?;
        if !range.contains(&n) {
            return Err(self.invalid(
                key,
                format!("{n} is outside {}..={}", range.start(), range.end()),
            ));
        }
        Ok(Some(n))
    }

    pub fn int(&self, key: &str, default: i64, range: RangeInclusive<i64>) -> SkinResult<i64> {
        Ok(self.opt_int(key, range)?.unwrap_or(default))
    }

    /// Integers are accepted; numeric strings are not.
    pub fn opt_float(&self, key: &str, range: RangeInclusive<f64>) -> SkinResult<Option<f64>> {
        let Some(v) = self.value(key) else {
            return Ok(None);
        };
        let n = match v {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
        .ok_or_else(|| self.invalid(key, format!("expected a number, got {v}")))?;
        if !range.contains(&n) {
            return Err(self.invalid(
                key,
                format!("{n} is outside {}..={}", range.start(), range.end()),
            ));
        }
        Ok(Some(n))
    }

    pub fn float(&self, key: &str, default: f64, range: RangeInclusive<f64>) -> SkinResult<f64> {
        Ok(self.opt_float(key, range)?.unwrap_or(default))
    }

    pub fn opt_enumeration(
        &self,
        key: &str,
        allowed: &[&'static str],
    ) -> SkinResult<Option<&'static str>> {
        let Some(v) = self.value(key) else {
            return Ok(None);
        };
        let s = v
            .as_str()
            .ok_or_else(|| self.invalid(key, format!("expected a string, got {v}")))?;
        allowed
            .iter()
            .find(|a| **a == s)
            .copied()
            .map(Some)
            .ok_or_else(|| {
                self.invalid(
                    key,
                    format!("\"{s}\" is not one of: {}", allowed.join(", ")),
                )
            })
    }

    pub fn enumeration(
        &self,
        key: &str,
        default: &'static str,
        allowed: &[&'static str],
    ) -> SkinResult<&'static str> {
        Ok(self.opt_enumeration(key, allowed)?.unwrap_or(default))
    }

    /// Scalars are accepted as strings (`000000` may arrive as a number).
    pub fn opt_string(&self, key: &str) -> SkinResult<Option<String>> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(other) => Err(self.invalid(key, format!("expected a string, got {other}"))),
        }
    }

    pub fn string(&self, key: &str, default: &str) -> SkinResult<String> {
        Ok(self.opt_string(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// A flat object of scalar values.
    pub fn string_map(&self, key: &str) -> SkinResult<BTreeMap<String, String>> {
        let Some(v) = self.value(key) else {
            return Ok(BTreeMap::new());
        };
        let Value::Object(obj) = v else {
            // An empty list is how an unset token table round-trips through YAML.
            if v.as_array().is_some_and(Vec::is_empty) {
                return Ok(BTreeMap::new());
            }
            return Err(self.invalid(key, format!("expected a map, got {v}")));
        };
        obj.iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k.clone(), s.clone())),
                Value::Number(n) => Ok((k.clone(), n.to_string())),
                Value::Bool(b) => Ok((k.clone(), b.to_string())),
                other => Err(self.invalid(key, format!("entry \"{k}\" is not a scalar: {other}"))),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/options.rs"]
mod tests;
