//! Client lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP through `UreqTransport`. Validates that request
//! building, the ureq transport and response parsing agree with the server.

use std::sync::Arc;

use covid_core::{ApiError, ApiVariant, Changes, ClientConfig, Covid19, RankBy};
use mock_server::{Dataset, Db};
use tokio::sync::RwLock;

/// Serve `db` on a random local port and return the base URL.
fn start_server(db: Db) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, db).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn config(base_url: &str, source: &str) -> ClientConfig {
    ClientConfig::for_variant(ApiVariant::Mirror)
        .with_base_url(base_url)
        .with_data_source(source)
}

#[test]
fn client_lifecycle() {
    // Step 1: start mock server with a handle we can edit.
    let db: Db = Arc::new(RwLock::new(Dataset::sample()));
    let base_url = start_server(db.clone());

    // Step 2: an unlisted source is refused at construction.
    let err = Covid19::new(&config(&base_url, "who")).unwrap_err();
    assert!(matches!(err, ApiError::Configuration { .. }), "got {err:?}");

    // Step 3: a listed source is accepted.
    let mut client = Covid19::new(&config(&base_url, "csbs")).unwrap();
    assert_eq!(client.data_source(), "csbs");
    assert_eq!(client.base_url(), base_url);
    assert_eq!(client.get_latest_changes(), Changes::default());

    // Step 4: totals match the dataset.
    let latest = client.get_latest().unwrap();
    let expected = Dataset::totals(&Dataset::sample().locations);
    assert_eq!(latest.confirmed, expected.confirmed);
    assert_eq!(latest.deaths, expected.deaths);
    assert_eq!(latest.recovered, expected.recovered);

    // Step 5: ranking.
    let ranked = client.get_locations(false, Some("deaths")).unwrap();
    let deaths: Vec<u64> = ranked.iter().map(|l| l.latest.deaths).collect();
    assert_eq!(deaths, vec![12_428, 8_464, 33, 31, 0]);
    let err = client.get_locations(false, Some("active")).unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(_)));

    // Step 6: timelines pass through untouched.
    let with_timelines = client
        .get_locations_ranked(true, Some(RankBy::Confirmed))
        .unwrap();
    assert_eq!(with_timelines[0].country(), Some("Italy"));
    let timelines = with_timelines[0].timelines().expect("timelines requested");
    assert_eq!(timelines["confirmed"]["latest"], 105_792);
    assert!(client.get_locations(false, None).unwrap()[0].timelines().is_none());

    // Step 7: filters.
    let canada = client.get_location_by_country_code("CA", false).unwrap();
    assert_eq!(canada.len(), 2);
    let spain = client.get_location_by_country("Spain", false).unwrap();
    assert_eq!(spain[0].id(), Some(1));
    assert!(client.get_location_by_country_code("XX", false).unwrap().is_empty());

    // Step 8: by id.
    let chad = client.get_location_by_id(4, false).unwrap();
    assert_eq!(chad.country_code(), Some("TD"));
    assert_eq!(chad.extra["last_updated"], "2020-04-01T00:00:00Z");
    let err = client.get_location_by_id(99, false).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Step 9: one refresh, still no changes.
    let first = client.get_all(false).unwrap().clone();
    assert_eq!(first.locations.len(), 5);
    assert_eq!(client.get_latest_changes(), Changes::default());

    // Step 10: server data moves, second refresh reports the delta.
    {
        let mut dataset = db.blocking_write();
        dataset.locations[4].latest.confirmed += 10;
        dataset.locations[0].latest.recovered += 4;
    }
    client.get_all(false).unwrap();
    assert_eq!(client.previous(), Some(&first));
    assert_eq!(
        client.get_latest_changes(),
        Changes { confirmed: 10, deaths: 0, recovered: 4 }
    );

    // Step 11: the source disappears server-side; calls fail with NotFound
    // and the snapshots stay as they were.
    db.blocking_write().sources.retain(|s| s != "csbs");
    let err = client.get_all(false).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
    assert_eq!(client.previous(), Some(&first));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let err = Covid19::new(&config(&format!("http://{addr}"), "jhu")).unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert!(err.is_transport());
}
