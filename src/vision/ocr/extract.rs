// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction from raw engine output
//!
//! Engines hand back loosely shaped trees: PaddleOCR style
//! `[box, (text, confidence)]` lists, result dictionaries with `rec_texts`,
//! or plain strings. [`extract_texts`] walks any of these and returns the
//! text lines in the order they were found.

use serde_json::Value;

/// Walk an engine result and collect every non-empty, trimmed text leaf.
///
/// Recognised shapes, checked in order for each list node:
/// - `[text, number]`: a text/confidence pair, the text is taken
/// - `[_, [text, ...], ...]`: a box followed by a text pair, only the text is taken
/// - `[_, [node, ...], ...]`: a box followed by nested results, the nested list is walked
/// - anything else: every element is walked
///
/// Mapping values are walked in insertion order. Numbers, booleans and
/// nulls carry no text.
pub fn extract_texts(result: &Value) -> Vec<String> {
    let mut texts = Vec::new();
    walk(result, &mut texts);
    texts
}

fn walk(node: &Value, texts: &mut Vec<String>) {
    match node {
        Value::String(s) => push_trimmed(s, texts),
        Value::Array(items) => walk_list(items, texts),
        Value::Object(map) => {
            for value in map.values() {
                walk(value, texts);
            }
        }
        Value::Number(_) | Value::Bool(_) | Value::Null => {}
    }
}

fn walk_list(items: &[Value], texts: &mut Vec<String>) {
    if let [Value::String(text), Value::Number(_)] = items {
        push_trimmed(text, texts);
        return;
    }

    if items.len() >= 2 {
        if let Value::Array(second) = &items[1] {
            match second.first() {
                Some(Value::String(text)) => push_trimmed(text, texts),
                _ => {
                    for item in second {
                        walk(item, texts);
                    }
                }
            }
            return;
        }
    }

    for item in items {
        walk(item, texts);
    }
}

fn push_trimmed(s: &str, texts: &mut Vec<String>) {
    let trimmed = s.trim();
    if !trimmed.is_empty() {
        texts.push(trimmed.to_string());
    }
}
