//! Field extraction from parsed WoS records.
//!
//! Every sub-extractor is an independent, read-only projection of one
//! record. The uniform policy: look up the expected sub-structure, and on
//! absence substitute the empty string (scalars) or skip (list items);
//! absences never propagate as errors. The single exception is the missing
//! document-type node, which is fatal for the record (see
//! [`ExtractError::MissingDoctype`]). Repeated items (keywords,
//! organizations, sponsors, grant agencies) join with `"; "`; the empty
//! case yields an empty string, not a lone empty item.

use std::collections::HashMap;

use woskit_xml::Element;

use crate::{
    Address, Author, CitedReference, Conference, ExtractError, Funding, PubInfo, Publisher, Record,
};

/// Text of the element at `path`, or empty if the path matches nothing.
fn text_or_default(elem: &Element, path: &str) -> String {
    elem.find(path).map(|e| e.text()).unwrap_or_default()
}

/// Value of the attribute, or empty if absent.
fn attr_or_default(elem: &Element, name: &str) -> String {
    elem.attr(name).unwrap_or_default().to_string()
}

/// `"; "`-joined text of an element's direct children.
fn join_children(elem: &Element) -> String {
    elem.children()
        .map(|child| child.text())
        .collect::<Vec<_>>()
        .join("; ")
}

/// The record's unique identifier, or empty if absent.
pub fn extract_wos_id(record: &Record) -> String {
    text_or_default(record.root(), "UID")
}

/// Extract the field-complete publication summary.
///
/// The one fallible extractor: a record without a doctype node fails with
/// [`ExtractError::MissingDoctype`]. Every other absence defaults.
pub fn extract_pub_info(record: &Record) -> Result<PubInfo, ExtractError> {
    let root = record.root();
    let wos_id = extract_wos_id(record);

    let mut info = PubInfo {
        wos_id: wos_id.clone(),
        ..PubInfo::default()
    };

    if let Some(pub_info) = root.find("static_data/summary/pub_info") {
        info.sortdate = attr_or_default(pub_info, "sortdate");
        info.has_abstract = attr_or_default(pub_info, "has_abstract");
        info.pubtype = attr_or_default(pub_info, "pubtype");
        info.pubyear = attr_or_default(pub_info, "pubyear");
        info.pubmonth = attr_or_default(pub_info, "pubmonth");
        info.issue = attr_or_default(pub_info, "issue");
    }

    for title in root.find_all("static_data/summary/titles/title") {
        match title.attr("type") {
            Some("source") => info.source = title.text(),
            Some("item") => info.item = title.text(),
            _ => {}
        }
    }

    info.language = text_or_default(root, "static_data/fullrecord_metadata/languages/language");
    info.heading = text_or_default(
        root,
        "static_data/fullrecord_metadata/category_info/headings/heading",
    );
    info.subheading = text_or_default(
        root,
        "static_data/fullrecord_metadata/category_info/subheadings/subheading",
    );

    let doctype = root
        .find("static_data/summary/doctypes/doctype")
        .ok_or_else(|| ExtractError::MissingDoctype {
            wos_id: wos_id.clone(),
        })?;
    info.doctype = doctype.text();

    let paragraphs =
        root.find_all("static_data/fullrecord_metadata/abstracts/abstract/abstract_text/p");
    info.abstract_text = paragraphs
        .iter()
        .map(|p| p.text())
        .collect::<Vec<_>>()
        .join(" ");

    let (keywords, keywords_plus) = extract_keywords(record);
    info.keywords = keywords;
    info.keywords_plus = keywords_plus;

    info.identifiers = extract_identifiers(record);

    Ok(info)
}

/// Author keywords and Keywords Plus, each `"; "`-joined or empty.
pub fn extract_keywords(record: &Record) -> (String, String) {
    let root = record.root();
    let keywords = root
        .find_all("static_data/fullrecord_metadata/keywords/keyword")
        .iter()
        .map(|k| k.text())
        .collect::<Vec<_>>()
        .join("; ");
    let keywords_plus = root
        .find_all("static_data/item/keywords_plus/keyword")
        .iter()
        .map(|k| k.text())
        .collect::<Vec<_>>()
        .join("; ");
    (keywords, keywords_plus)
}

/// Identifier type → value (doi, issn, …) from the cluster identifier
/// lists. A later entry with a duplicate type overwrites the earlier one.
pub fn extract_identifiers(record: &Record) -> HashMap<String, String> {
    let mut ids = HashMap::new();
    for group in record
        .root()
        .find_all("dynamic_data/cluster_related/identifiers")
    {
        for ident in group.children() {
            if let Some(kind) = ident.attr("type") {
                ids.insert(kind.to_string(), attr_or_default(ident, "value"));
            }
        }
    }
    ids
}

/// One entry per name node in the record's summary name list.
pub fn extract_authors(record: &Record) -> Vec<Author> {
    let wos_id = extract_wos_id(record);
    let Some(names) = record.root().find("static_data/summary/names") else {
        return Vec::new();
    };
    names
        .children()
        .map(|name| Author {
            wos_id: wos_id.clone(),
            seq_no: attr_or_default(name, "seq_no"),
            role: attr_or_default(name, "role"),
            addr_no: attr_or_default(name, "addr_no"),
            dais_id: attr_or_default(name, "dais_id"),
            full_name: text_or_default(name, "full_name"),
            first_name: text_or_default(name, "first_name"),
            last_name: text_or_default(name, "last_name"),
        })
        .collect()
}

/// One entry per address node. An address missing its spec node yields a
/// fully defaulted entry rather than aborting the record.
pub fn extract_addresses(record: &Record) -> Vec<Address> {
    let wos_id = extract_wos_id(record);
    let mut addresses = Vec::new();
    for address in record
        .root()
        .find_all("static_data/fullrecord_metadata/addresses/address_name")
    {
        let mut entry = Address {
            wos_id: wos_id.clone(),
            ..Address::default()
        };
        if let Some(spec) = address.find("address_spec") {
            entry.addr_no = attr_or_default(spec, "addr_no");
            entry.city = text_or_default(spec, "city");
            entry.state = text_or_default(spec, "state");
            entry.country = text_or_default(spec, "country");
            entry.zip = text_or_default(spec, "zip");
            entry.full_address = text_or_default(spec, "full_address");
            if let Some(organizations) = spec.find("organizations") {
                entry.organizations = join_children(organizations);
            }
            if let Some(suborganizations) = spec.find("suborganizations") {
                entry.suborganizations = join_children(suborganizations);
            }
        }
        addresses.push(entry);
    }
    addresses
}

/// One entry per publisher node, with name and address details defaulted
/// when the intermediate nodes are absent.
pub fn extract_publisher(record: &Record) -> Vec<Publisher> {
    let wos_id = extract_wos_id(record);
    record
        .root()
        .find_all("static_data/summary/publishers/publisher")
        .into_iter()
        .map(|publisher| {
            let mut entry = Publisher {
                wos_id: wos_id.clone(),
                ..Publisher::default()
            };
            if let Some(name) = publisher.find("names/name") {
                entry.display_name = text_or_default(name, "display_name");
                entry.full_name = text_or_default(name, "full_name");
            }
            if let Some(addr) = publisher.find("address_spec") {
                entry.full_address = text_or_default(addr, "full_address");
                entry.city = text_or_default(addr, "city");
            }
            entry
        })
        .collect()
}

/// Funding text and `"; "`-joined grant agencies. Always returns an entry;
/// a record with no funding data yields empty strings.
pub fn extract_funding(record: &Record) -> Funding {
    let root = record.root();
    let funding_text = root
        .find("static_data/fullrecord_metadata/fund_ack/fund_text")
        .map(|fund_text| {
            fund_text
                .find_all("p")
                .iter()
                .map(|p| p.text())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    let mut agencies = Vec::new();
    for grant in root.find_all("static_data/fullrecord_metadata/fund_ack/grants/grant") {
        if let Some(agency) = grant.find("grant_agency") {
            agencies.push(agency.text());
        }
    }

    Funding {
        wos_id: extract_wos_id(record),
        funding_text,
        funding_agency: agencies.join("; "),
    }
}

/// One entry per conference node.
///
/// A record with zero conference nodes returns `None`, the distinguished
/// "no conferences" sentinel, not an empty list. Callers can tell "this
/// record has no conferences" apart from an empty collection.
pub fn extract_conferences(record: &Record) -> Option<Vec<Conference>> {
    let wos_id = extract_wos_id(record);
    let conferences: Vec<Conference> = record
        .root()
        .find_all("static_data/summary/conferences/conference")
        .into_iter()
        .map(|conference| {
            let date = conference.find("conf_dates/conf_date");
            Conference {
                wos_id: wos_id.clone(),
                conf_title: text_or_default(conference, "conf_titles/conf_title"),
                conf_date: date.map(|d| d.text()).unwrap_or_default(),
                conf_start: date.map(|d| attr_or_default(d, "conf_start")).unwrap_or_default(),
                conf_end: date.map(|d| attr_or_default(d, "conf_end")).unwrap_or_default(),
                conf_city: text_or_default(conference, "conf_locations/conf_location/conf_city"),
                conf_state: text_or_default(conference, "conf_locations/conf_location/conf_state"),
                conf_sponsor: conference
                    .find_all("sponsors/sponsor")
                    .iter()
                    .map(|s| s.text())
                    .collect::<Vec<_>>()
                    .join("; "),
                conf_host: text_or_default(conference, "conf_locations/conf_location/conf_host"),
            }
        })
        .collect();

    if conferences.is_empty() {
        None
    } else {
        Some(conferences)
    }
}

/// One entry per cited-reference node.
pub fn extract_references(record: &Record) -> Vec<CitedReference> {
    let wos_id = extract_wos_id(record);
    record
        .root()
        .find_all("static_data/fullrecord_metadata/references/reference")
        .into_iter()
        .map(|reference| CitedReference {
            wos_id: wos_id.clone(),
            uid: text_or_default(reference, "uid"),
            cited_author: text_or_default(reference, "citedAuthor"),
            year: text_or_default(reference, "year"),
            page: text_or_default(reference, "page"),
            volume: text_or_default(reference, "volume"),
            cited_title: text_or_default(reference, "citedTitle"),
            cited_work: text_or_default(reference, "citedWork"),
            doi: text_or_default(reference, "doi"),
        })
        .collect()
}
