//! Per-court tables for the written opinions report.

use url::Url;

/// Courts that do not provide a written opinions report at all.
pub const UNSUPPORTED_COURTS: &[&str] = &["casb", "innb", "mieb", "miwb", "ohsb"];

/// Courts whose ECF certificates fail verification and must be fetched
/// with relaxed TLS.
pub const RELAXED_TLS_COURTS: &[&str] = &[
    "casb", "ganb", "innb", "mieb", "miwb", "nmib", "nvb", "ohsb", "prb", "tnwb", "vib",
];

/// Extracts the court id from an ECF URL such as
/// `https://ecf.ohnd.uscourts.gov/cgi-bin/WrtOpRpt.pl`.
///
/// Returns `None` for hosts that are not `<prefix>.<court>.uscourts.gov`.
pub fn court_id_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 4 || !host.ends_with(".uscourts.gov") {
        return None;
    }
    let court = labels[labels.len() - 3];
    if court.is_empty() {
        return None;
    }
    Some(court.to_string())
}
