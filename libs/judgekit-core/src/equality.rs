//! Structural equality over JSON-shaped values.
//!
//! `deep_equal` is the reference definition. Every generated program carries a
//! native transliteration (the `*_SNIPPET` constants) because the comparison
//! runs inside the user's runtime, not here. All of them must agree on:
//!
//! - numbers compare by value (`1 == 1.0`), booleans are not numbers
//! - sequences are order-sensitive
//! - maps ignore key order but need identical key sets
//! - values of different kinds are never equal; null only equals null

use serde_json::Value;

pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return x == y;
            }
            if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                return x == y;
            }
            match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| deep_equal(x, y)))
        }
        _ => false,
    }
}

pub const JAVASCRIPT_SNIPPET: &str = r#"function judgeDeepEqual(a, b) {
  if (a === b) return true;
  if (a == null || b == null) return false;
  if (Array.isArray(a) !== Array.isArray(b)) return false;
  if (Array.isArray(a)) {
    if (a.length !== b.length) return false;
    for (let i = 0; i < a.length; i++) {
      if (!judgeDeepEqual(a[i], b[i])) return false;
    }
    return true;
  }
  if (typeof a === 'object' && typeof b === 'object') {
    const keysA = Object.keys(a);
    const keysB = Object.keys(b);
    if (keysA.length !== keysB.length) return false;
    for (const key of keysA) {
      if (!Object.prototype.hasOwnProperty.call(b, key)) return false;
      if (!judgeDeepEqual(a[key], b[key])) return false;
    }
    return true;
  }
  return false;
}"#;

pub const PYTHON_SNIPPET: &str = r#"def _judge_kind(value):
    if value is None:
        return 'null'
    if isinstance(value, bool):
        return 'bool'
    if isinstance(value, (int, float)):
        return 'number'
    if isinstance(value, str):
        return 'text'
    if isinstance(value, (list, tuple)):
        return 'sequence'
    if isinstance(value, dict):
        return 'map'
    return 'other'


def _judge_deep_equal(a, b):
    if a is b:
        return True
    kind = _judge_kind(a)
    if kind != _judge_kind(b):
        return False
    if kind == 'sequence':
        if len(a) != len(b):
            return False
        return all(_judge_deep_equal(x, y) for x, y in zip(a, b))
    if kind == 'map':
        if set(a.keys()) != set(b.keys()):
            return False
        return all(_judge_deep_equal(a[k], b[k]) for k in a)
    return a == b"#;

/// Operates on Gson trees so user return values are compared after `toJsonTree`.
pub const JAVA_SNIPPET: &str = r#"    static boolean judgeIsNull(JsonElement value) {
        return value == null || value.isJsonNull();
    }

    static boolean judgeDeepEqual(JsonElement a, JsonElement b) {
        if (a == b) return true;
        if (judgeIsNull(a) || judgeIsNull(b)) return judgeIsNull(a) && judgeIsNull(b);
        if (a.isJsonArray() && b.isJsonArray()) {
            JsonArray left = a.getAsJsonArray();
            JsonArray right = b.getAsJsonArray();
            if (left.size() != right.size()) return false;
            for (int i = 0; i < left.size(); i++) {
                if (!judgeDeepEqual(left.get(i), right.get(i))) return false;
            }
            return true;
        }
        if (a.isJsonObject() && b.isJsonObject()) {
            JsonObject left = a.getAsJsonObject();
            JsonObject right = b.getAsJsonObject();
            if (left.entrySet().size() != right.entrySet().size()) return false;
            for (Map.Entry<String, JsonElement> entry : left.entrySet()) {
                if (!right.has(entry.getKey())) return false;
                if (!judgeDeepEqual(entry.getValue(), right.get(entry.getKey()))) return false;
            }
            return true;
        }
        if (a.isJsonPrimitive() && b.isJsonPrimitive()) {
            JsonPrimitive left = a.getAsJsonPrimitive();
            JsonPrimitive right = b.getAsJsonPrimitive();
            if (left.isNumber() && right.isNumber()) {
                return left.getAsBigDecimal().compareTo(right.getAsBigDecimal()) == 0;
            }
            if (left.isBoolean() && right.isBoolean()) {
                return left.getAsBoolean() == right.getAsBoolean();
            }
            if (left.isString() && right.isString()) {
                return left.getAsString().equals(right.getAsString());
            }
        }
        return false;
    }"#;

pub const CPP_SNIPPET: &str = r#"bool judge_deep_equal(const json& a, const json& b) {
    if (a.is_null() || b.is_null()) return a.is_null() && b.is_null();
    if (a.is_number() && b.is_number()) return a == b;
    if (a.type() != b.type()) return false;
    if (a.is_array()) {
        if (a.size() != b.size()) return false;
        for (std::size_t i = 0; i < a.size(); i++) {
            if (!judge_deep_equal(a[i], b[i])) return false;
        }
        return true;
    }
    if (a.is_object()) {
        if (a.size() != b.size()) return false;
        for (auto it = a.begin(); it != a.end(); ++it) {
            auto other = b.find(it.key());
            if (other == b.end() || !judge_deep_equal(it.value(), *other)) return false;
        }
        return true;
    }
    return a == b;
}"#;
