use dispatch_config::{TripRequest, load_requests_csv};
use std::fs;
use tempfile::tempdir;

#[test]
fn loads_rows_sorted_by_tick() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trips.csv");
    fs::write(
        &path,
        "tick,station,controller,origin,destination\n3,2,1,12,1\n0,1,1,1,8\n0,3,1,4,9\n",
    )
    .unwrap();

    let rows = load_requests_csv(&path).expect("load");
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        TripRequest {
            tick: 0,
            station: 1,
            controller: 1,
            origin: 1,
            destination: 8
        }
    );
    // Same tick keeps file order.
    assert_eq!(rows[1].station, 3);
    assert_eq!(rows[2].tick, 3);
}

#[test]
fn rejects_wrong_headers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trips.csv");
    fs::write(&path, "tick,origin,destination\n0,1,8\n").unwrap();

    let err = load_requests_csv(&path).expect_err("headers must match");
    assert!(format!("{err}").contains("must have headers"));
}

#[test]
fn reports_row_number_of_bad_row() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trips.csv");
    fs::write(
        &path,
        "tick,station,controller,origin,destination\n0,1,1,1,8\n1,1,1,up,8\n",
    )
    .unwrap();

    let err = load_requests_csv(&path).expect_err("bad row");
    assert!(format!("{err}").contains("invalid CSV row 3"), "got: {err}");
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_requests_csv(&dir.path().join("nope.csv")).expect_err("missing");
    assert!(format!("{err}").contains("open requests CSV"));
}
