//! Line-oriented RIS text rendering and file output.

use std::path::{Path, PathBuf};

use crate::{RisEntry, RisError, RisValue};

/// Two-line header marking WoS-sourced RIS output.
const HEADER: &str = "FN Clarivate Analytics Web of Science\nVR 1.0\n";

/// Terminator line closing each record block.
const END_OF_RECORD: &str = "ER\n\n";

/// Render entries into the tagged text format.
///
/// Fields are emitted in each entry's own order. List values drop blank
/// entries and the `", "` placeholder produced by authors with neither
/// name part, then join with a newline plus three-space indent so
/// continuation lines align under the tag.
pub fn to_ris_text(entries: &[RisEntry]) -> String {
    let mut out = String::from(HEADER);
    for entry in entries {
        for (tag, value) in entry.fields() {
            match value {
                RisValue::Scalar(v) => {
                    out.push_str(tag);
                    out.push(' ');
                    out.push_str(v);
                    out.push('\n');
                }
                RisValue::List(items) => {
                    let kept: Vec<&str> = items
                        .iter()
                        .map(String::as_str)
                        .filter(|item| !item.is_empty() && *item != ", ")
                        .collect();
                    out.push_str(tag);
                    out.push(' ');
                    out.push_str(&kept.join("\n   "));
                    out.push('\n');
                }
            }
        }
        out.push_str(END_OF_RECORD);
    }
    out
}

/// Write rendered text to `<stem><ext>`.
///
/// Refuses to clobber an existing file unless `overwrite` is set. Returns
/// the path actually written.
pub fn write_file(
    text: &str,
    stem: &Path,
    ext: &str,
    overwrite: bool,
) -> Result<PathBuf, RisError> {
    let mut name = stem.as_os_str().to_os_string();
    name.push(ext);
    let target = PathBuf::from(name);

    if target.exists() && !overwrite {
        return Err(RisError::AlreadyExists(target));
    }
    std::fs::write(&target, text)?;
    Ok(target)
}
