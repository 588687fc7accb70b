//! Projection of extracted records into the RIS tag vocabulary.
//!
//! The serializer emits fields in whatever order an entry carries them, so
//! the canonical tag order is fixed here, at construction time.

use woskit_core::{ExtractError, Record, extract_authors, extract_pub_info};

/// A field value: one string, or an ordered sequence (author lists).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RisValue {
    Scalar(String),
    List(Vec<String>),
}

/// One record's worth of RIS fields, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct RisEntry {
    fields: Vec<(&'static str, RisValue)>,
}

impl RisEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tag: &'static str, value: impl Into<String>) {
        self.fields.push((tag, RisValue::Scalar(value.into())));
    }

    pub fn push_list(&mut self, tag: &'static str, values: Vec<String>) {
        self.fields.push((tag, RisValue::List(values)));
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &RisValue)> {
        self.fields.iter().map(|(tag, value)| (*tag, value))
    }

    /// First value carried under `tag`, if any.
    pub fn get(&self, tag: &str) -> Option<&RisValue> {
        self.fields
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, value)| value)
    }
}

/// Map one record into a RIS entry with the canonical tag order
/// `AU AF TI AB SO LA DT DE ID PY PD UT [DI]`.
///
/// `DT` combines the publication type and document type; `DI` takes the
/// primary doi identifier, falls back to the crossref doi, and is omitted
/// entirely when neither is present. Fails only when the record's
/// extraction fails fatally (missing doctype).
pub fn to_ris_entry(record: &Record) -> Result<RisEntry, ExtractError> {
    let info = extract_pub_info(record)?;

    let authors = extract_authors(record);
    let mut short_names = Vec::with_capacity(authors.len());
    let mut full_names = Vec::with_capacity(authors.len());
    for author in &authors {
        short_names.push(format!("{}, {}", author.last_name, author.first_name));
        full_names.push(author.full_name.clone());
    }

    let mut entry = RisEntry::new();
    entry.push_list("AU", short_names);
    entry.push_list("AF", full_names);
    entry.push("TI", info.item);
    entry.push("AB", info.abstract_text);
    entry.push("SO", info.source);
    entry.push("LA", info.language);
    entry.push("DT", format!("{} {}", info.pubtype, info.doctype));
    entry.push("DE", info.keywords);
    entry.push("ID", info.keywords_plus);
    entry.push("PY", info.pubyear);
    entry.push("PD", info.sortdate);
    entry.push("UT", info.wos_id);
    if let Some(doi) = info
        .identifiers
        .get("doi")
        .or_else(|| info.identifiers.get("xref_doi"))
    {
        entry.push("DI", doi.clone());
    }

    Ok(entry)
}

/// Map a sequence of records into RIS entries.
///
/// A record whose extraction fails fatally is skipped; its error is
/// returned alongside the entries so sibling records still serialize.
pub fn to_ris_entries(records: &[Record]) -> (Vec<RisEntry>, Vec<ExtractError>) {
    let mut entries = Vec::with_capacity(records.len());
    let mut failures = Vec::new();
    for record in records {
        match to_ris_entry(record) {
            Ok(entry) => entries.push(entry),
            Err(e) => failures.push(e),
        }
    }
    (entries, failures)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"<REC>
<UID>WOS:000000000000001</UID>
<static_data>
  <summary>
    <pub_info pubtype="Journal" pubyear="2009" sortdate="2009-10-01"/>
    <titles count="2">
      <title type="source">JOURNAL OF APPLIED ECOLOGY</title>
      <title type="item">Modelling species distributions</title>
    </titles>
    <names count="2">
      <name role="author" seq_no="1">
        <full_name>Smith, Jane A.</full_name>
        <first_name>Jane</first_name>
        <last_name>Smith</last_name>
      </name>
      <name role="author" seq_no="2">
        <full_name>Doe, John B.</full_name>
        <first_name>John</first_name>
        <last_name>Doe</last_name>
      </name>
    </names>
    <doctypes count="1"><doctype>Article</doctype></doctypes>
  </summary>
  <fullrecord_metadata>
    <languages count="1"><language type="primary">English</language></languages>
    <keywords count="1"><keyword>ecology</keyword></keywords>
  </fullrecord_metadata>
</static_data>
<dynamic_data>
  <cluster_related>
    <identifiers>
      <identifier type="doi" value="10.1111/primary"/>
      <identifier type="xref_doi" value="10.1111/fallback"/>
    </identifiers>
  </cluster_related>
</dynamic_data>
</REC>"#;

    fn record(xml: &str) -> Record {
        Record::parse(xml).unwrap()
    }

    #[test]
    fn test_canonical_tag_order() {
        let entry = to_ris_entry(&record(RECORD)).unwrap();
        let tags: Vec<&str> = entry.fields().map(|(tag, _)| tag).collect();
        assert_eq!(
            tags,
            vec!["AU", "AF", "TI", "AB", "SO", "LA", "DT", "DE", "ID", "PY", "PD", "UT", "DI"]
        );
    }

    #[test]
    fn test_author_lists() {
        let entry = to_ris_entry(&record(RECORD)).unwrap();
        assert_eq!(
            entry.get("AU"),
            Some(&RisValue::List(vec![
                "Smith, Jane".to_string(),
                "Doe, John".to_string(),
            ]))
        );
        assert_eq!(
            entry.get("AF"),
            Some(&RisValue::List(vec![
                "Smith, Jane A.".to_string(),
                "Doe, John B.".to_string(),
            ]))
        );
    }

    #[test]
    fn test_doctype_combines_into_dt() {
        let entry = to_ris_entry(&record(RECORD)).unwrap();
        assert_eq!(
            entry.get("DT"),
            Some(&RisValue::Scalar("Journal Article".to_string()))
        );
    }

    #[test]
    fn test_di_prefers_primary_doi() {
        let entry = to_ris_entry(&record(RECORD)).unwrap();
        assert_eq!(
            entry.get("DI"),
            Some(&RisValue::Scalar("10.1111/primary".to_string()))
        );
    }

    #[test]
    fn test_di_falls_back_to_xref_doi() {
        let xml = RECORD.replace(r#"<identifier type="doi" value="10.1111/primary"/>"#, "");
        let entry = to_ris_entry(&record(&xml)).unwrap();
        assert_eq!(
            entry.get("DI"),
            Some(&RisValue::Scalar("10.1111/fallback".to_string()))
        );
    }

    #[test]
    fn test_di_omitted_when_no_doi() {
        let xml = RECORD
            .replace(r#"<identifier type="doi" value="10.1111/primary"/>"#, "")
            .replace(r#"<identifier type="xref_doi" value="10.1111/fallback"/>"#, "");
        let entry = to_ris_entry(&record(&xml)).unwrap();
        assert!(entry.get("DI").is_none());
        let tags: Vec<&str> = entry.fields().map(|(tag, _)| tag).collect();
        assert_eq!(tags.last(), Some(&"UT"));
    }

    #[test]
    fn test_absent_fields_render_empty_not_missing() {
        let entry = to_ris_entry(&record(
            "<REC><UID>WOS:X</UID><static_data><summary>\
             <doctypes><doctype>Article</doctype></doctypes>\
             </summary></static_data></REC>",
        ))
        .unwrap();
        assert_eq!(entry.get("TI"), Some(&RisValue::Scalar(String::new())));
        assert_eq!(entry.get("AB"), Some(&RisValue::Scalar(String::new())));
        assert_eq!(entry.get("AU"), Some(&RisValue::List(Vec::new())));
        assert_eq!(entry.get("DT"), Some(&RisValue::Scalar(" Article".to_string())));
    }

    #[test]
    fn test_fatal_record_skipped_siblings_survive() {
        let good = record(RECORD);
        let bad = record("<REC><UID>WOS:BAD</UID><static_data><summary/></static_data></REC>");
        let (entries, failures) = to_ris_entries(&[bad, good]);
        assert_eq!(entries.len(), 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(
            entries[0].get("UT"),
            Some(&RisValue::Scalar("WOS:000000000000001".to_string()))
        );
        match &failures[0] {
            ExtractError::MissingDoctype { wos_id } => assert_eq!(wos_id, "WOS:BAD"),
        }
    }
}
