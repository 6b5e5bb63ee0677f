//! HTTP client for the written opinions report.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;
use reqwest::cookie::Jar;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

use crate::{
    courts::court_id_from_url,
    query::{format_day, report_form},
    types::{FailedDay, RawReportResponse, ReportBatch, SessionToken},
    ClientConfig, DayFailurePolicy, EndpointResolver, Error, ReportQuery, SessionCredential,
};

type DayOutcome = (NaiveDate, Result<RawReportResponse, Error>);

/// HTTP client for the written opinions report.
///
/// Holds only immutable configuration. Every [`Client::dispatch`] opens its
/// own [`Session`] with a fresh cookie jar, so one `Client` can serve many
/// unrelated queries concurrently.
pub struct Client {
    config: ClientConfig,
    endpoints: EndpointResolver,
}

/// One authenticated conversation with a court's report endpoint.
#[derive(Clone)]
pub struct Session {
    court_id: String,
    report_url: Url,
    http: reqwest::Client,
}

impl Session {
    pub fn court_id(&self) -> &str {
        &self.court_id
    }

    pub fn report_url(&self) -> &Url {
        &self.report_url
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl Client {
    /// Creates a client pointing at the production ECF hosts.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            endpoints: EndpointResolver::Production,
        }
    }

    /// Creates a client that sends every court to `base_url`. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, config: ClientConfig) -> Self {
        Self {
            config,
            endpoints: EndpointResolver::with_base_url(base_url),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds a session for `court_id`: cookie jar seeded with `credential`,
    /// the configured user agent, and the court's TLS policy.
    pub fn open_session(
        &self,
        court_id: &str,
        credential: Option<&SessionCredential>,
    ) -> Result<Session, Error> {
        let report_url = self.endpoints.report_url(court_id)?;
        let jar = Arc::new(Jar::default());
        if let Some(credential) = credential {
            jar.add_cookie_str(&credential.to_cookie_string(), &report_url);
        }
        let verify = self.config.verify_tls(court_id);
        if !verify {
            tracing::debug!("TLS verification disabled for {}", court_id);
        }
        let http = reqwest::Client::builder()
            .user_agent(self.config.user_agent.as_str())
            .cookie_provider(jar)
            .danger_accept_invalid_certs(!verify)
            .build()
            .map_err(|source| Error::ClientBuild {
                court_id: court_id.to_string(),
                source,
            })?;
        Ok(Session {
            court_id: court_id.to_string(),
            report_url,
            http,
        })
    }

    /// Loads the report page and pulls the form token out of it.
    pub async fn acquire_token(&self, session: &Session) -> Result<SessionToken, Error> {
        let url = session.report_url.to_string();
        tracing::info!("Getting written report token from {}", url);
        let resp = session
            .http
            .get(session.report_url.clone())
            .timeout(self.config.token_timeout())
            .send()
            .await
            .map_err(|source| {
                tracing::error!("Failed to get token page: {}", source);
                Error::TokenRequest {
                    url: url.clone(),
                    source,
                }
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|source| {
            tracing::error!("Failed to read token page body: {}", source);
            Error::TokenRequest {
                url: url.clone(),
                source,
            }
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Token page failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        extract_token(&body).ok_or_else(|| {
            tracing::error!("No report token on {}", url);
            Error::TokenNotFound { url }
        })
    }

    /// Runs one report query: token handshake, then one form submission per day.
    ///
    /// Unsupported courts return an empty batch without touching the network.
    /// Responses come back in date order whatever order they were fetched in.
    pub async fn dispatch(&self, query: &ReportQuery) -> Result<ReportBatch, Error> {
        let court_id = query.court_id.as_str();
        if query.start > query.end {
            return Err(Error::InvalidQuery(format!(
                "start date {} is after end date {}",
                query.start, query.end
            )));
        }
        if self.config.is_unsupported(court_id) {
            tracing::warn!(
                "Cannot get written opinions report from '{}'. It is not provided by the court.",
                court_id
            );
            return Ok(ReportBatch::empty(court_id));
        }

        let session = self.open_session(court_id, query.credential.as_ref())?;
        let token = self.acquire_token(&session).await?;
        let days = query.days();

        let outcomes = if self.config.max_concurrent_days <= 1 || days.len() <= 1 {
            self.fetch_sequential(&session, &token, &days).await?
        } else {
            self.fetch_concurrent(&session, &token, &days).await?
        };

        let mut batch = ReportBatch::empty(court_id);
        for (day, outcome) in outcomes {
            match outcome {
                Ok(resp) => batch.responses.push(resp),
                Err(error) => {
                    tracing::warn!("Skipping {} for {}: {}", day, court_id, error);
                    batch.failed_days.push(FailedDay { day, error });
                }
            }
        }
        Ok(batch)
    }

    async fn fetch_sequential(
        &self,
        session: &Session,
        token: &SessionToken,
        days: &[NaiveDate],
    ) -> Result<Vec<DayOutcome>, Error> {
        let mut outcomes = Vec::with_capacity(days.len());
        for &day in days {
            let result = post_day(session, token, day, self.config.report_timeout()).await;
            outcomes.push((day, self.settle(result)?));
        }
        Ok(outcomes)
    }

    async fn fetch_concurrent(
        &self,
        session: &Session,
        token: &SessionToken,
        days: &[NaiveDate],
    ) -> Result<Vec<DayOutcome>, Error> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_days));
        let mut join_set = JoinSet::new();

        for (idx, &day) in days.iter().enumerate() {
            let sem = Arc::clone(&semaphore);
            let session = session.clone();
            let token = token.clone();
            let timeout = self.config.report_timeout();
            join_set.spawn(async move {
                let _permit = sem.acquire_owned().await;
                (idx, day, post_day(&session, &token, day, timeout).await)
            });
        }

        let mut slots: Vec<Option<DayOutcome>> = days.iter().map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            let (idx, day, result) = match joined {
                Ok(done) => done,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(_) => continue,
            };
            match self.settle(result) {
                Ok(outcome) => slots[idx] = Some((day, outcome)),
                Err(e) => {
                    join_set.abort_all();
                    return Err(e);
                }
            }
        }

        Ok(slots.into_iter().flatten().collect())
    }

    /// Applies the day failure policy: under `Abort` a failed day becomes the
    /// dispatch error; under `Tolerate` it is kept in its slot.
    fn settle(
        &self,
        result: Result<RawReportResponse, Error>,
    ) -> Result<Result<RawReportResponse, Error>, Error> {
        match (result, self.config.day_failure) {
            (Err(e), DayFailurePolicy::Abort) => Err(e),
            (result, _) => Ok(result),
        }
    }
}

async fn post_day(
    session: &Session,
    token: &SessionToken,
    day: NaiveDate,
    timeout: Duration,
) -> Result<RawReportResponse, Error> {
    let mut url = session.report_url.clone();
    url.set_query(Some(token.as_str()));
    let d = format_day(day);
    tracing::info!(
        "Querying written opinions report for '{}' between {} and {}",
        session.court_id,
        d,
        d
    );

    let resp = session
        .http
        .post(url)
        .multipart(report_form(day))
        .timeout(timeout)
        .send()
        .await
        .map_err(|source| transport_error(session, day, source))?;

    let status = resp.status().as_u16();
    let source_url = resp.url().clone();
    let html_body = resp
        .text()
        .await
        .map_err(|source| transport_error(session, day, source))?;

    let court_id = court_id_from_url(&source_url).unwrap_or_else(|| {
        tracing::debug!(
            "No court id in response URL {}, using {}",
            source_url,
            session.court_id
        );
        session.court_id.clone()
    });

    Ok(RawReportResponse {
        source_url,
        court_id,
        day,
        status,
        html_body,
    })
}

fn transport_error(session: &Session, day: NaiveDate, source: reqwest::Error) -> Error {
    tracing::error!(
        "Report request for {} on {} failed: {}",
        session.court_id,
        day,
        source
    );
    Error::Transport {
        court_id: session.court_id.clone(),
        day,
        source,
    }
}

/// Finds the form token, the query string of the form's action URL:
///
/// ```text
/// <form enctype="multipart/form-data" method="POST" action="../cgi-bin/WrtOpRpt.pl?196235599000508-L_1_0-1">
/// ```
///
/// Relative, root-relative and absolute actions are all accepted.
pub fn extract_token(html: &str) -> Option<SessionToken> {
    let re = Regex::new(r#"/cgi-bin/(?:OHND_)?WrtOpRpt\.pl\?([^"]+)""#).ok()?;
    let caps = re.captures(html)?;
    let token = caps.get(1)?.as_str();
    Some(SessionToken::new(token))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_from_form_action() {
        let html = r#"<form enctype="multipart/form-data" method="POST" action="../cgi-bin/WrtOpRpt.pl?196235599000508-L_1_0-1">"#;
        assert_eq!(
            extract_token(html),
            Some(SessionToken::new("196235599000508-L_1_0-1"))
        );
    }

    #[test]
    fn token_from_ohnd_form_action() {
        let html = r#"<FORM METHOD=POST action="../cgi-bin/OHND_WrtOpRpt.pl?777-L_9_0-1" name="f">"#;
        assert_eq!(extract_token(html), Some(SessionToken::new("777-L_9_0-1")));
    }

    #[test]
    fn token_stops_at_closing_quote() {
        let html = r#"<form action="../cgi-bin/WrtOpRpt.pl?abc-L_1_0-1"><input name="x" value="y"></form>"#;
        assert_eq!(extract_token(html).unwrap().as_str(), "abc-L_1_0-1");
    }

    #[test]
    fn token_from_root_relative_action() {
        let html = r#"<form method="POST" action="/cgi-bin/WrtOpRpt.pl?196235599000508-L_1_0-1">"#;
        assert_eq!(
            extract_token(html),
            Some(SessionToken::new("196235599000508-L_1_0-1"))
        );
    }

    #[test]
    fn token_from_absolute_action() {
        let html = r#"<form method="POST" action="https://ecf.nysd.uscourts.gov/cgi-bin/OHND_WrtOpRpt.pl?55-L_1_0-1">"#;
        assert_eq!(extract_token(html), Some(SessionToken::new("55-L_1_0-1")));
    }

    #[test]
    fn token_missing() {
        assert_eq!(extract_token("<html><body>Login</body></html>"), None);
        assert_eq!(
            extract_token(r#"<form action="../cgi-bin/DktRpt.pl?123">"#),
            None
        );
    }

    #[test]
    fn truncate_long_body() {
        let body = "x".repeat(2500);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
        assert_eq!(out.len(), 2000 + "...[truncated]".len());
    }
}
