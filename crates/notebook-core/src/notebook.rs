//! Canonical text form of notebook documents.
//!
//! The document model itself is opaque here: a notebook is any JSON value.
//! These functions only move it to and from the on-disk text form, which is
//! nbformat's layout (sorted keys, one-space indentation, trailing newline).

use serde::Serialize;
use serde_json::{Map, Value, json};

/// Serialize a notebook document to its canonical text form.
pub fn stringify(notebook: &Value) -> String {
    let sorted = sort_keys(notebook);
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    // Writing a Value into a Vec cannot fail.
    if sorted.serialize(&mut serializer).is_err() {
        return notebook.to_string();
    }
    let mut text = String::from_utf8(buf).unwrap_or_else(|_| notebook.to_string());
    text.push('\n');
    text
}

/// Parse notebook text back into a document.
pub fn parse(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(text)
}

/// A valid empty nbformat 4 notebook.
pub fn empty() -> Value {
    json!({
        "cells": [],
        "metadata": {},
        "nbformat": 4,
        "nbformat_minor": 5
    })
}

// Maps keep insertion order when serde_json's preserve_order feature is on,
// so sort explicitly.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (key, value) in entries {
                sorted.insert(key.clone(), sort_keys(value));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
