//! JSON entity export.
//!
//! Flattens per-record extraction results into independent collections,
//! one JSON array per entity kind; each entry carries its `wos_id` so the
//! collections can be re-joined downstream.

use serde_json::{Map, Value, json};

use woskit_core::{
    ExtractError, Record, extract_addresses, extract_authors, extract_conferences,
    extract_funding, extract_pub_info, extract_publisher, extract_references,
};

/// Entity kinds accepted by `--entities`.
pub const ALL_ENTITIES: &[&str] = &[
    "pub_info",
    "authors",
    "addresses",
    "publishers",
    "funding",
    "conferences",
    "references",
];

/// Build the export object for the selected entity kinds.
///
/// Records whose publication-info extraction fails fatally are dropped
/// from `pub_info` and reported back; the other entity lists do not
/// depend on the doctype and still include those records.
pub fn export_entities(records: &[Record], entities: &[String]) -> (Value, Vec<ExtractError>) {
    let mut out = Map::new();
    let mut failures = Vec::new();

    for entity in entities {
        let value = match entity.as_str() {
            "pub_info" => {
                let mut infos = Vec::with_capacity(records.len());
                for record in records {
                    match extract_pub_info(record) {
                        Ok(info) => infos.push(info),
                        Err(e) => failures.push(e),
                    }
                }
                json!(infos)
            }
            "authors" => {
                let all: Vec<_> = records.iter().flat_map(extract_authors).collect();
                json!(all)
            }
            "addresses" => {
                let all: Vec<_> = records.iter().flat_map(extract_addresses).collect();
                json!(all)
            }
            "publishers" => {
                let all: Vec<_> = records.iter().flat_map(extract_publisher).collect();
                json!(all)
            }
            "funding" => {
                let all: Vec<_> = records.iter().map(extract_funding).collect();
                json!(all)
            }
            "conferences" => {
                // Records with the "no conferences" sentinel contribute
                // nothing here, rather than an empty placeholder.
                let all: Vec<_> = records
                    .iter()
                    .filter_map(extract_conferences)
                    .flatten()
                    .collect();
                json!(all)
            }
            "references" => {
                let all: Vec<_> = records.iter().flat_map(extract_references).collect();
                json!(all)
            }
            _ => continue,
        };
        out.insert(entity.clone(), value);
    }

    (Value::Object(out), failures)
}
