use std::collections::{BTreeMap, HashMap};

use tera::{Filter, Value};
use url::form_urlencoded;

/// URL-safe identifier derived from a title or name: lowercased, runs of
/// non-word characters collapsed to a single hyphen, leading and trailing
/// hyphens stripped.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c);
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Tera filter rebuilding a query string from the current request's
/// parameters. The `drop` argument lists keys to remove; every other keyword
/// argument overrides or adds a parameter. Used by the pagination include to
/// build page links that preserve filters.
pub struct CleanQuerystring;

impl Filter for CleanQuerystring {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let current = value
            .as_object()
            .ok_or_else(|| tera::Error::msg("clean_querystring expects a map of parameters"))?;
        let mut params: BTreeMap<String, String> = current
            .iter()
            .map(|(key, value)| (key.clone(), value_to_string(value)))
            .collect();

        if let Some(drop) = args.get("drop") {
            let keys = drop
                .as_array()
                .ok_or_else(|| tera::Error::msg("clean_querystring: drop must be an array"))?;
            for key in keys {
                if let Some(key) = key.as_str() {
                    params.remove(key);
                }
            }
        }
        for (key, value) in args {
            if key == "drop" {
                continue;
            }
            params.insert(key.clone(), value_to_string(value));
        }

        let mut encoded = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &params {
            encoded.append_pair(key, value);
        }
        Ok(Value::String(encoded.finish()))
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
