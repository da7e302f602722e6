use serde_json::{Map, Value};

/// JSON-shaped configuration: site defaults with per-block overrides merged on top.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkmapConfig(Value);

impl Default for MarkmapConfig {
    fn default() -> Self {
        Self::empty_object()
    }
}

impl MarkmapConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Object(map) => map.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }

    fn lookup(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.lookup(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.lookup(dotted_path)?.as_bool()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.lookup(dotted_path)?.as_f64()
    }

    pub fn get_i64(&self, dotted_path: &str) -> Option<i64> {
        self.lookup(dotted_path)?.as_i64()
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        // Configs are objects; coerce anything else so this never panics on user input.
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}
