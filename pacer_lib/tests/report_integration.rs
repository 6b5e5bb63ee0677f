use std::time::Duration;

use chrono::NaiveDate;
use pacer_lib::{
    DayFailurePolicy, FreeDocumentsClient, FreeDocumentsError, Phase, ReportQuery, RetryConfig,
    RowError, Settings,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPORT_PATH: &str = "/cgi-bin/WrtOpRpt.pl";

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fast_retry_settings() -> Settings {
    Settings {
        retry: RetryConfig {
            max_retries: 2,
            base_delay_ms: 10,
            max_delay_ms: 20,
        },
        ..Settings::default()
    }
}

async fn mount_token_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("report_form.html")))
        .mount(server)
        .await;
}

async fn mount_day(server: &MockServer, filed: &str, fixture: &str) {
    Mock::given(method("POST"))
        .and(path(REPORT_PATH))
        .and(body_string_contains(filed))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture(fixture)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn five_column_report_end_to_end() {
    let server = MockServer::start().await;
    mount_token_page(&server).await;
    mount_day(&server, "12/31/2017", "report_five_column.html").await;

    let settings = Settings::default();
    let client = FreeDocumentsClient::with_base_url(&server.uri(), &settings);
    let query = ReportQuery::single_day("dcd", date(2017, 12, 31));
    let report = client.query(&query).await.unwrap();

    assert_eq!(report.court_id, "dcd");
    assert!(report.is_complete());
    assert_eq!(report.records.len(), 2);

    let first = &report.records[0];
    assert_eq!(first.court_id, "dcd");
    assert_eq!(first.pacer_case_id, "178502");
    assert_eq!(first.docket_number, "1:16-cv-00745-ESH");
    assert_eq!(
        first.case_name,
        "NATIONAL VETERANS LEGAL SERVICES PROGRAM et al v. USA"
    );
    assert_eq!(first.case_date, date(2017, 12, 31));
    assert_eq!(first.pacer_document_number, "04506253433");
    assert_eq!(first.document_number, "75");
    assert_eq!(first.nature_of_suit.as_deref(), Some("890"));

    // Blank case cell carries the identity of the row above.
    let second = &report.records[1];
    assert_eq!(second.identity(), first.identity());
    assert_eq!(second.document_number, "76");
    assert_eq!(second.pacer_document_number, "04506253440");

    // Third row has no document link and is reported, not returned.
    assert_eq!(report.skipped_rows.len(), 1);
    assert_eq!(report.skipped_rows[0].reason, RowError::MissingDocumentLink);
    assert_eq!(report.skipped_rows[0].day, date(2017, 12, 31));

    let json = serde_json::to_value(&report.records).unwrap();
    assert_eq!(json[0]["case_date"], "2017-12-31");
    assert_eq!(json[0]["cause"], "28:1346 Tort Claim");
}

#[tokio::test]
async fn multi_day_report_skips_empty_days() {
    let server = MockServer::start().await;
    mount_token_page(&server).await;
    mount_day(&server, "01/01/2024", "report_empty.html").await;
    mount_day(&server, "01/02/2024", "report_four_column.html").await;
    mount_day(&server, "01/03/2024", "report_empty.html").await;

    let settings = Settings::default();
    let client = FreeDocumentsClient::with_base_url(&server.uri(), &settings);
    let query = ReportQuery::new("hib", date(2024, 1, 1), date(2024, 1, 3)).unwrap();
    let report = client.query(&query).await.unwrap();

    assert_eq!(report.records.len(), 1);
    let rec = &report.records[0];
    assert_eq!(rec.docket_number, "14-90018");
    assert_eq!(rec.case_name, "Stewart v. Kauanui");
    assert_eq!(rec.pacer_case_id, "118910");
    assert_eq!(rec.nature_of_suit, None);
    assert_eq!(rec.cause, None);
    assert!(report.skipped_rows.is_empty());
}

#[tokio::test]
async fn token_failure_is_retried_with_fresh_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("busy"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_token_page(&server).await;
    mount_day(&server, "01/02/2024", "report_four_column.html").await;

    let client = FreeDocumentsClient::with_base_url(&server.uri(), &fast_retry_settings());
    let query = ReportQuery::single_day("hib", date(2024, 1, 2));
    let report = client.query(&query).await.unwrap();
    assert_eq!(report.records.len(), 1);

    let gets = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "GET")
        .count();
    assert_eq!(gets, 2);
}

#[tokio::test]
async fn token_failure_gives_up_after_max_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let client = FreeDocumentsClient::with_base_url(&server.uri(), &fast_retry_settings());
    let query = ReportQuery::single_day("hib", date(2024, 1, 2));
    let err = client.query(&query).await.unwrap_err();
    assert_eq!(err.phase(), Phase::Token);
    assert_eq!(err.court_id(), Some("hib"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn parse_failure_is_not_retried() {
    let server = MockServer::start().await;
    mount_token_page(&server).await;
    Mock::given(method("POST"))
        .and(path(REPORT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>no marker</html>"))
        .mount(&server)
        .await;

    let client = FreeDocumentsClient::with_base_url(&server.uri(), &fast_retry_settings());
    let query = ReportQuery::single_day("hib", date(2024, 1, 2));
    let err = client.query(&query).await.unwrap_err();
    match err {
        FreeDocumentsError::Parse { court_id, day, .. } => {
            assert_eq!(court_id, "hib");
            assert_eq!(day, date(2024, 1, 2));
        }
        other => panic!("expected parse error, got {:?}", other),
    }

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn unsupported_court_returns_empty_report() {
    let server = MockServer::start().await;
    let client = FreeDocumentsClient::with_base_url(&server.uri(), &Settings::default());
    let query = ReportQuery::single_day("casb", date(2024, 1, 2));
    let report = client.query(&query).await.unwrap();
    assert!(report.records.is_empty());
    assert!(report.is_complete());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn tolerated_day_failure_is_reported() {
    let server = MockServer::start().await;
    mount_token_page(&server).await;
    mount_day(&server, "01/01/2024", "report_four_column.html").await;
    Mock::given(method("POST"))
        .and(path(REPORT_PATH))
        .and(body_string_contains("01/02/2024"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(load_fixture("report_empty.html"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut settings = Settings::default();
    settings.client.report_timeout_secs = 1;
    settings.client.day_failure = DayFailurePolicy::Tolerate;
    let client = FreeDocumentsClient::with_base_url(&server.uri(), &settings);
    let query = ReportQuery::new("hib", date(2024, 1, 1), date(2024, 1, 2)).unwrap();
    let report = client.query(&query).await.unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.failed_days, vec![date(2024, 1, 2)]);
    assert!(!report.is_complete());
}
