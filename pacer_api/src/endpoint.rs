//! Maps a court id to its written opinions report URL.

use url::Url;

use crate::Error;

/// Path of the report script for `court_id`. Northern Ohio prefixes the
/// script name; every other court uses the plain name.
pub fn report_path(court_id: &str) -> &'static str {
    if court_id == "ohnd" {
        "/cgi-bin/OHND_WrtOpRpt.pl"
    } else {
        "/cgi-bin/WrtOpRpt.pl"
    }
}

/// Where report URLs point.
#[derive(Clone, Debug, Default)]
pub enum EndpointResolver {
    /// `https://ecf.<court>.uscourts.gov/...`
    #[default]
    Production,
    /// Every court resolves against one base URL. Used for testing with wiremock.
    BaseUrl(String),
}

impl EndpointResolver {
    pub fn with_base_url(base_url: &str) -> Self {
        Self::BaseUrl(base_url.trim_end_matches('/').to_string())
    }

    /// Returns the report URL for `court_id`. The id is not validated here.
    pub fn report_url(&self, court_id: &str) -> Result<Url, Error> {
        let raw = match self {
            Self::Production => {
                format!("https://ecf.{}.uscourts.gov{}", court_id, report_path(court_id))
            }
            Self::BaseUrl(base) => format!("{}{}", base, report_path(court_id)),
        };
        Url::parse(&raw).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidUrl(raw)
        })
    }
}
