use crate::context::{Container, ContextEntry, ParsedContext, TypeValue};
use crate::error::{JsonLdError, Result};
use crate::iri;
use crate::remote::RemoteContexts;
use serde_json::{json, Map, Value as JsonValue};

/// Expand a compact IRI, returning the IRI together with the term definition
/// that produced it.
///
/// Lookup order: exact term, `prefix:suffix`, then `@vocab` (when `vocab` is
/// true) or `@base`. Keywords resolve to themselves; anything else is
/// returned unchanged with no definition.
pub fn details(
    compact_iri: &str,
    context: &ParsedContext,
    vocab: bool,
) -> (String, Option<ContextEntry>) {
    if let Some(entry) = context.get(compact_iri) {
        let iri = entry
            .id
            .clone()
            .or_else(|| entry.reverse.clone())
            .unwrap_or_else(|| compact_iri.to_string());
        return (iri, Some(entry.clone()));
    }

    if let Some((prefix, suffix)) = iri::parse_prefix(compact_iri) {
        if let Some(entry) = context.get(&prefix) {
            if let Some(prefix_iri) = &entry.id {
                return (format!("{}{}", prefix_iri, suffix), Some(entry.clone()));
            }
        }
    }

    let default = if vocab {
        context.vocab.as_ref()
    } else {
        context.base.as_ref()
    };
    if let Some(default) = default {
        if !iri::any_iri(compact_iri) && !compact_iri.starts_with('@') {
            let full = format!("{}{}", default, compact_iri);
            let entry = ContextEntry {
                id: Some(full.clone()),
                ..Default::default()
            };
            return (full, Some(entry));
        }
    }

    if compact_iri.starts_with('@') {
        let entry = ContextEntry {
            id: Some(compact_iri.to_string()),
            ..Default::default()
        };
        (compact_iri.to_string(), Some(entry))
    } else {
        (compact_iri.to_string(), None)
    }
}

/// Expand a single IRI
pub fn iri(compact_iri: &str, context: &ParsedContext, vocab: bool) -> String {
    details(compact_iri, context, vocab).0
}

/// Expand a document.
///
/// An object input yields the expanded node object; an array input, or a
/// document consisting only of `@context` and `@graph`, yields an array of
/// expanded nodes.
pub fn node(doc: &JsonValue, context: &ParsedContext, remote: &RemoteContexts) -> Result<JsonValue> {
    let expansion = Expansion { remote };

    if let JsonValue::Object(map) = doc {
        let only_graph = map.contains_key("@graph")
            && map.keys().all(|k| k == "@context" || k == "@graph");
        if only_graph {
            let active = match map.get("@context") {
                Some(lc) => ParsedContext::parse_with_remote(Some(context), lc, remote)?,
                None => context.clone(),
            };
            return expansion.node(&map["@graph"], &active, &[json!("@graph")]);
        }
    }

    expansion.node(doc, context, &[])
}

struct Expansion<'r> {
    remote: &'r RemoteContexts,
}

impl Expansion<'_> {
    fn node(&self, value: &JsonValue, context: &ParsedContext, idx: &[JsonValue]) -> Result<JsonValue> {
        match value {
            JsonValue::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.node(item, context, &push_idx(idx, json!(i))))
                .collect::<Result<Vec<_>>>()
                .map(JsonValue::Array),

            JsonValue::Object(map) => {
                let active = match map.get("@context") {
                    Some(lc) => ParsedContext::parse_with_remote(Some(context), lc, self.remote)?,
                    None => context.clone(),
                };
                self.object(map, &active, idx).map(JsonValue::Object)
            }

            _ => Ok(value.clone()),
        }
    }

    fn object(
        &self,
        map: &Map<String, JsonValue>,
        context: &ParsedContext,
        idx: &[JsonValue],
    ) -> Result<Map<String, JsonValue>> {
        let type_key = context.type_key.as_str();
        let id_key = context.id_key.as_str();

        let mut result = Map::new();
        let mut typed = context.clone();

        if let Some(type_val) = map.get(type_key).or_else(|| map.get("@type")) {
            let originals: Vec<&str> = match type_val {
                JsonValue::String(s) => vec![s.as_str()],
                JsonValue::Array(items) => items.iter().filter_map(|v| v.as_str()).collect(),
                _ => vec![],
            };

            let types: Vec<JsonValue> = originals
                .iter()
                .map(|t| json!(iri(t, context, true)))
                .collect();

            // type-scoped contexts apply to the node's other properties
            for t in &originals {
                if let Some(scoped) = context.get(t).and_then(|e| e.context.as_deref()) {
                    typed = typed.scoped(scoped);
                }
            }

            if !types.is_empty() {
                result.insert("@type".to_string(), JsonValue::Array(types));
            }
        }

        for (k, v) in map {
            if k == "@context" || k == type_key || k == "@type" {
                continue;
            }

            let key_idx = push_idx(idx, json!(k));
            let (expanded_key, entry) = details(k, &typed, true);

            if expanded_key == "@graph" {
                result.insert("@graph".to_string(), self.node(v, &typed, &key_idx)?);
                continue;
            }

            if expanded_key == "@id" || k == id_key {
                if let JsonValue::String(s) = v {
                    result.insert("@id".to_string(), json!(iri(s, &typed, false)));
                }
                continue;
            }

            let values = self.value(v, entry.as_ref(), &typed, &key_idx)?;
            if values.is_empty() {
                continue;
            }

            match result.get_mut(&expanded_key) {
                Some(JsonValue::Array(existing)) => existing.extend(values),
                _ => {
                    result.insert(expanded_key, JsonValue::Array(values));
                }
            }
        }

        Ok(result)
    }

    /// Expand a property value into its array of expanded values.
    fn value(
        &self,
        value: &JsonValue,
        entry: Option<&ContextEntry>,
        context: &ParsedContext,
        idx: &[JsonValue],
    ) -> Result<Vec<JsonValue>> {
        let type_val = entry.and_then(|e| e.type_.as_ref());
        let has_container =
            |c: Container| entry.and_then(|e| e.container.as_ref()).is_some_and(|cs| cs.contains(&c));

        match value {
            JsonValue::Null => Ok(vec![]),

            JsonValue::Bool(_) | JsonValue::Number(_) => {
                let mut obj = Map::new();
                obj.insert("@value".to_string(), value.clone());
                if let Some(TypeValue::Iri(t)) = type_val {
                    obj.insert("@type".to_string(), json!(t));
                }
                Ok(vec![JsonValue::Object(obj)])
            }

            JsonValue::String(s) => {
                if type_val == Some(&TypeValue::Id) {
                    return Ok(vec![json!({"@id": iri(s, context, false)})]);
                }

                let mut obj = Map::new();
                obj.insert("@value".to_string(), json!(s));

                // type coercion wins over any default language
                if let Some(TypeValue::Iri(t)) = type_val {
                    obj.insert("@type".to_string(), json!(t));
                    return Ok(vec![JsonValue::Object(obj)]);
                }

                let lang = entry
                    .and_then(|e| e.language.as_ref())
                    .map(|l| l.as_ref())
                    .unwrap_or(context.language.as_ref());
                if let Some(lang) = lang {
                    obj.insert("@language".to_string(), json!(lang));
                }
                Ok(vec![JsonValue::Object(obj)])
            }

            JsonValue::Array(items) => {
                let mut results = Vec::new();
                for (i, item) in items.iter().enumerate() {
                    let item_idx = push_idx(idx, json!(i));
                    match item {
                        JsonValue::Array(_) => {
                            return Err(JsonLdError::NestedSequence { idx: item_idx })
                        }
                        JsonValue::Object(m) if !m.contains_key("@value") => {
                            results.push(self.node(item, &nested_context(entry, context), &item_idx)?)
                        }
                        _ => results.extend(self.value(item, entry, context, &item_idx)?),
                    }
                }

                if has_container(Container::List) {
                    return Ok(vec![json!({ "@list": results })]);
                }
                Ok(results)
            }

            JsonValue::Object(map) => {
                if type_val == Some(&TypeValue::Json) {
                    return Ok(vec![json!({"@value": value, "@type": "@json"})]);
                }

                if let Some(list) = single_keyword(map, "@list") {
                    let items = self.value(list, entry, context, &push_idx(idx, json!("@list")))?;
                    return Ok(vec![json!({ "@list": items })]);
                }

                if let Some(set) = single_keyword(map, "@set") {
                    return self.value(set, entry, context, &push_idx(idx, json!("@set")));
                }

                if map.contains_key("@value") {
                    return value_object(map, entry, context);
                }

                if has_container(Container::Language) {
                    return Ok(language_map(map));
                }

                Ok(vec![self.node(value, &nested_context(entry, context), idx)?])
            }
        }
    }
}

fn push_idx(idx: &[JsonValue], next: JsonValue) -> Vec<JsonValue> {
    let mut out = idx.to_vec();
    out.push(next);
    out
}

/// Term-scoped contexts apply to the nested node they introduce.
fn nested_context(entry: Option<&ContextEntry>, context: &ParsedContext) -> ParsedContext {
    match entry.and_then(|e| e.context.as_deref()) {
        Some(scoped) => context.scoped(scoped),
        None => context.clone(),
    }
}

/// `{"@list": ...}` / `{"@set": ...}`, optionally with an `@index`.
fn single_keyword<'a>(map: &'a Map<String, JsonValue>, keyword: &str) -> Option<&'a JsonValue> {
    let inner = map.get(keyword)?;
    let extra = map.len() - 1;
    (extra == 0 || (extra == 1 && map.contains_key("@index"))).then_some(inner)
}

fn value_object(
    map: &Map<String, JsonValue>,
    entry: Option<&ContextEntry>,
    context: &ParsedContext,
) -> Result<Vec<JsonValue>> {
    let val = map.get("@value").cloned().unwrap_or(JsonValue::Null);

    let own_type = map
        .get("@type")
        .and_then(|t| t.as_str())
        .map(|t| iri(t, context, true));
    let own_lang = map
        .get("@language")
        .and_then(|l| l.as_str())
        .map(str::to_string);

    if own_type.is_some() && own_lang.is_some() {
        return Err(JsonLdError::LanguageWithType);
    }

    let type_iri = match (own_type, &own_lang) {
        (Some(t), _) => Some(t),
        (None, Some(_)) => None,
        (None, None) => match entry.and_then(|e| e.type_.as_ref()) {
            Some(TypeValue::Iri(t)) => Some(t.clone()),
            Some(TypeValue::Id) => Some("@id".to_string()),
            _ => None,
        },
    };
    // the default language only applies to untyped values
    let lang = match type_iri {
        Some(_) => None,
        None => own_lang.or_else(|| context.language.clone()),
    };

    if type_iri.as_deref() == Some("@id") {
        let id = val.as_str().map(|s| iri(s, context, false)).unwrap_or_default();
        return Ok(vec![json!({ "@id": id })]);
    }

    let mut obj = Map::new();
    obj.insert("@value".to_string(), val);
    if let Some(t) = type_iri {
        obj.insert("@type".to_string(), json!(t));
    } else if let Some(l) = lang {
        obj.insert("@language".to_string(), json!(l));
    }
    Ok(vec![JsonValue::Object(obj)])
}

fn language_map(map: &Map<String, JsonValue>) -> Vec<JsonValue> {
    let mut results = Vec::new();
    for (lang, v) in map {
        let values: Vec<&JsonValue> = match v {
            JsonValue::Array(items) => items.iter().collect(),
            _ => vec![v],
        };
        for val in values {
            let text = match val {
                JsonValue::Object(m) => m.get("@value").and_then(|v| v.as_str()),
                _ => val.as_str(),
            };
            if let Some(text) = text {
                results.push(json!({"@value": text, "@language": lang}));
            }
        }
    }
    results
}
