//! Dotted-path operations over nested `toml::Table`s.
//!
//! Each store layer is one table. Layers are combined with [`deep_merge`],
//! written with [`set_path`] and read with [`get_path`].

use toml::{Table, Value};

/// Deep-merge `overlay` on top of `base`.
/// If both sides have a Table for the same key, recurse.
/// Otherwise, `overlay`'s value wins.
pub fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, overlay_val) in overlay {
        match (base.remove(&key), overlay_val) {
            (Some(Value::Table(base_tbl)), Value::Table(overlay_tbl)) => {
                base.insert(key, Value::Table(deep_merge(base_tbl, overlay_tbl)));
            }
            (_, overlay_val) => {
                base.insert(key, overlay_val);
            }
        }
    }
    base
}

/// Write `value` at `dotted_key`, creating intermediate tables.
///
/// An intermediate segment that currently holds a scalar is replaced by a
/// table, so the newest write always lands.
pub fn set_path(table: &mut Table, dotted_key: &str, value: Value) {
    let (path, leaf) = split_key(dotted_key);
    let mut current = table;

    if let Some(path) = path {
        for segment in path.split('.') {
            let slot = current
                .entry(segment)
                .or_insert_with(|| Value::Table(Table::new()));
            if !slot.is_table() {
                *slot = Value::Table(Table::new());
            }
            let Value::Table(next) = slot else {
                unreachable!("slot was just made a table");
            };
            current = next;
        }
    }

    current.insert(leaf.to_string(), value);
}

/// Navigate a table by dotted key path (e.g. `"database.url"`).
pub fn get_path<'a>(table: &'a Table, dotted_key: &str) -> Option<&'a Value> {
    let (path, leaf) = split_key(dotted_key);

    let tbl = match path {
        Some(path) => {
            let mut current = table;
            for segment in path.split('.') {
                current = current.get(segment)?.as_table()?;
            }
            current
        }
        None => table,
    };

    tbl.get(leaf)
}

/// Outcome of walking one table along a dotted key.
#[derive(Debug, PartialEq)]
pub enum Lookup<'a> {
    Found(&'a Value),
    /// A segment before the leaf holds a scalar, hiding the key in any
    /// table below this one.
    Shadowed,
    Missing,
}

/// Like [`get_path`], but tells a key hidden behind a scalar apart from a
/// key that is simply absent.
pub fn lookup<'a>(table: &'a Table, dotted_key: &str) -> Lookup<'a> {
    let (path, leaf) = split_key(dotted_key);

    let mut current = table;
    if let Some(path) = path {
        for segment in path.split('.') {
            match current.get(segment) {
                Some(Value::Table(next)) => current = next,
                Some(_) => return Lookup::Shadowed,
                None => return Lookup::Missing,
            }
        }
    }

    match current.get(leaf) {
        Some(v) => Lookup::Found(v),
        None => Lookup::Missing,
    }
}

/// Collect every leaf path in `table` as a dotted key, in sorted order.
///
/// Tables are recursed into and never reported themselves, except an empty
/// table, which is a leaf.
pub fn leaf_keys(table: &Table) -> Vec<String> {
    let mut keys = Vec::new();
    collect_keys(table, "", &mut keys);
    keys.sort();
    keys
}

fn collect_keys(table: &Table, prefix: &str, keys: &mut Vec<String>) {
    for (name, value) in table {
        let dotted = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            Value::Table(sub) if !sub.is_empty() => collect_keys(sub, &dotted, keys),
            _ => keys.push(dotted),
        }
    }
}

fn split_key(dotted_key: &str) -> (Option<&str>, &str) {
    match dotted_key.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, dotted_key),
    }
}
