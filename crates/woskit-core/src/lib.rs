//! Record segmentation and field extraction for Web of Science XML exports.
//!
//! A WoS export is not one well-formed document but a stream of independent
//! `<REC>…</REC>` fragments surrounded by noise. [`segment`] isolates and
//! parses the fragments one at a time, so a single malformed record never
//! aborts the rest of the stream. [`extract`] then projects each parsed
//! record into a field-complete publication summary plus the auxiliary
//! entity lists (authors, addresses, publishers, funding, conferences,
//! cited references), with every missing sub-structure defaulting to an
//! empty value.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

pub mod extract;
pub mod segment;

// Re-export for convenience
pub use extract::{
    extract_addresses, extract_authors, extract_conferences, extract_funding,
    extract_identifiers, extract_keywords, extract_pub_info, extract_publisher,
    extract_references, extract_wos_id,
};
pub use segment::{RecordBlocks, ScanProgress, SegmentError, read_records, read_xml, read_xml_str};

/// One well-formed record parsed out of a WoS XML stream.
///
/// Owns the record's element tree; extraction reads it without mutating.
#[derive(Debug, Clone)]
pub struct Record {
    doc: woskit_xml::Document,
}

impl Record {
    /// Parse a single record block into a tree.
    pub fn parse(block: &str) -> Result<Self, woskit_xml::XmlError> {
        Ok(Self {
            doc: woskit_xml::Document::parse(block)?,
        })
    }

    /// The record's root element (`<REC>`).
    pub fn root(&self) -> &woskit_xml::Element {
        self.doc.root()
    }
}

#[derive(Error, Debug)]
pub enum ExtractError {
    /// The record has no document-type node. No safe default exists here:
    /// downstream tag naming is derived from the node itself, so this one
    /// absence is fatal for the record (all other absences default).
    #[error("record {wos_id:?} has no doctype node")]
    MissingDoctype { wos_id: String },
}

/// Field-complete publication summary for one record.
///
/// Every field is always present after extraction; absent source data
/// leaves the empty string (or an empty identifier map), never a gap.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PubInfo {
    pub wos_id: String,
    pub sortdate: String,
    pub has_abstract: String,
    pub pubtype: String,
    pub pubyear: String,
    pub pubmonth: String,
    pub issue: String,
    /// Source (journal/proceedings) title.
    pub source: String,
    /// Item (article) title.
    pub item: String,
    pub language: String,
    pub heading: String,
    pub subheading: String,
    pub doctype: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Author keywords, `"; "`-joined.
    pub keywords: String,
    /// Editorially assigned Keywords Plus, `"; "`-joined.
    pub keywords_plus: String,
    /// Identifier type → value (doi, issn, …). Later duplicates of a type
    /// overwrite earlier ones.
    pub identifiers: HashMap<String, String>,
}

/// One author name entry, tagged with the owning record's id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Author {
    pub wos_id: String,
    pub seq_no: String,
    pub role: String,
    /// Cross-reference into the record's address list.
    pub addr_no: String,
    /// Disambiguation id.
    pub dais_id: String,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
}

/// One affiliation address entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Address {
    pub wos_id: String,
    pub addr_no: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip: String,
    pub full_address: String,
    /// Organization names, `"; "`-joined.
    pub organizations: String,
    /// Sub-organization names, `"; "`-joined.
    pub suborganizations: String,
}

/// One publisher entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Publisher {
    pub wos_id: String,
    pub display_name: String,
    pub full_name: String,
    pub full_address: String,
    pub city: String,
}

/// Funding acknowledgement for one record. Always produced, with empty
/// strings when the record carries no funding data.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Funding {
    pub wos_id: String,
    pub funding_text: String,
    /// Grant agency names, `"; "`-joined.
    pub funding_agency: String,
}

/// One conference entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Conference {
    pub wos_id: String,
    pub conf_title: String,
    pub conf_date: String,
    pub conf_start: String,
    pub conf_end: String,
    pub conf_city: String,
    pub conf_state: String,
    /// Sponsor names, `"; "`-joined.
    pub conf_sponsor: String,
    pub conf_host: String,
}

/// One entry from a record's cited-reference list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CitedReference {
    pub wos_id: String,
    pub uid: String,
    pub cited_author: String,
    pub year: String,
    pub page: String,
    pub volume: String,
    pub cited_title: String,
    pub cited_work: String,
    pub doi: String,
}
