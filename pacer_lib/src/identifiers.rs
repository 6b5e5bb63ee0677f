//! Case and document identifiers embedded in ECF links.

use regex::Regex;

/// Reads the PACER case id out of a docket link.
///
/// Handles `DktRpt.pl?178502`, `iqquerymenu.pl?178502` and
/// `...?caseid=178502` forms.
pub fn pacer_case_id_from_docket_url(url: &str) -> Option<String> {
    let re = Regex::new(r"(?:[?&](?:caseid|case_id)=|\?)(\d+)").ok()?;
    let caps = re.captures(url)?;
    Some(caps.get(1)?.as_str().to_string())
}

/// Reads the PACER document number out of a `/doc1/` link.
///
/// The fourth digit flags whether the link shows attachments; it is forced
/// to `0` so the same document always yields the same number.
pub fn pacer_document_number_from_doc1_url(url: &str) -> Option<String> {
    if url.contains("show_case_doc") {
        return None;
    }
    let path = url.split('?').next()?.trim_end_matches('/');
    let last = path.rsplit('/').next()?;
    if last.len() < 4 || !last.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}0{}", &last[..3], &last[4..]))
}
