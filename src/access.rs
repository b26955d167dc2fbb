// src/access.rs
//! Total accessors over untyped JSON.
//!
//! Submission metadata comes from upstream with no enforced schema: any key
//! may be absent, `null`, or of an unexpected type. These helpers collapse all
//! of those cases into "nothing here" so callers can chain lookups without
//! branching on shape at every level.

use serde_json::Value;

static NULL: Value = Value::Null;

pub trait ValueExt {
    /// Member `key` of an object, or `null` for anything else.
    fn field(&self, key: &str) -> &Value;

    /// Elements of an array, or an empty slice for anything else.
    fn items(&self) -> &[Value];

    /// `Some` only for a non-empty string.
    fn non_empty_str(&self) -> Option<&str>;

    /// A strictly positive dimension (width/height). Floats are rounded.
    fn dimension(&self) -> Option<u32>;

    /// Python-style truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
    fn is_truthy(&self) -> bool;
}

impl ValueExt for Value {
    fn field(&self, key: &str) -> &Value {
        match self {
            Value::Object(map) => map.get(key).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    fn items(&self) -> &[Value] {
        self.as_array().map(Vec::as_slice).unwrap_or(&[])
    }

    fn non_empty_str(&self) -> Option<&str> {
        self.as_str().filter(|s| !s.is_empty())
    }

    fn dimension(&self) -> Option<u32> {
        if let Some(n) = self.as_u64() {
            return u32::try_from(n).ok().filter(|n| *n > 0);
        }
        let f = self.as_f64()?;
        if f.is_finite() && f >= 0.5 && f <= u32::MAX as f64 {
            Some(f.round() as u32)
        } else {
            None
        }
    }

    fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
        }
    }
}
