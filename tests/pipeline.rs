use run_report::reports::unique_people;
use run_report::types::FIELD_MILES_RUN;
use run_report::{
    calculate_metrics, generate_dashboard_summary, parse_csv_file, parse_csv_str, DataWarning,
    ErrorKind,
};

const SAMPLE: &str = "date,person,miles run
2024-01-01,Alice,5.2
2024-01-02,Bob,3.8
2024-01-02,Alice,4.5
";

#[test]
fn end_to_end_sample() {
    let result = parse_csv_str(SAMPLE);
    assert!(result.success);
    assert_eq!(result.data.len(), 3);

    let summary = generate_dashboard_summary(&result.data);
    assert_eq!(summary.overall_metrics.run_count, 3);
    assert!((summary.overall_metrics.total_distance - 13.5).abs() < 1e-9);
    assert_eq!(summary.unique_people, vec!["Alice", "Bob"]);
    assert_eq!(summary.person_stats[0].person, "Alice");
    assert!((summary.person_stats[0].metrics.total_distance - 9.7).abs() < 1e-9);

    assert_eq!(summary.chart_data.len(), 2);
    assert_eq!(summary.chart_data[0].iso_date, "2024-01-01");
    assert_eq!(summary.chart_data[1].iso_date, "2024-01-02");
    assert_eq!(summary.chart_data[1].distances["Alice"], 4.5);
    assert_eq!(summary.chart_data[1].distances["Bob"], 3.8);
    assert!(!summary.chart_data[0].distances.contains_key("Bob"));
}

#[test]
fn partition_sums_to_whole() {
    let csv = "Date,Person,Miles_Run
2024-02-01,Cara,2.25
2024-02-01,Dev,7
2024-02-03,Cara,1.5
2024-02-04,Eli,0
2024-02-05,Dev,10.125
";
    let result = parse_csv_str(csv);
    assert!(result.success);
    let summary = generate_dashboard_summary(&result.data);
    let sum: f64 = summary
        .person_stats
        .iter()
        .map(|s| s.metrics.total_distance)
        .sum();
    assert!((sum - summary.overall_metrics.total_distance).abs() < 1e-9);
    let m = &summary.overall_metrics;
    assert!((m.average_distance * m.run_count as f64 - m.total_distance).abs() < 1e-9);
    assert_eq!(m.min_distance, 0.0);
    assert_eq!(m.max_distance, 10.125);
}

#[test]
fn empty_record_set_metrics() {
    let m = calculate_metrics(&[]);
    assert_eq!(m.run_count, 0);
    assert_eq!(m.average_distance, 0.0);
    assert!(m.date_range.start.is_none() && m.date_range.end.is_none());

    let summary = generate_dashboard_summary(&[]);
    assert!(summary.person_stats.is_empty());
    assert!(summary.chart_data.is_empty());
    assert_eq!(summary.total_records, 0);
}

#[test]
fn header_variants_resolve() {
    for header in ["Miles_Run", "miles run", " Miles Run "] {
        let csv = format!("date,person,{}\n2024-01-01,Alice,3\n", header);
        let result = parse_csv_str(&csv);
        assert!(result.success, "header {:?} should match", header);
        assert_eq!(result.data[0].distance, 3.0);
    }
}

#[test]
fn missing_field_yields_missing_error_and_no_record() {
    let result = parse_csv_str("date,person,miles run\n2024-01-01,,4\n");
    assert!(!result.success);
    assert!(result.data.is_empty());
    assert!(result.errors.iter().any(|e| e.kind == ErrorKind::Missing));
}

#[test]
fn distance_boundaries() {
    let csv = "date,person,miles run
2024-01-01,A,200
2024-01-01,B,200.01
2024-01-01,C,-0.1
";
    let result = parse_csv_str(csv);
    assert_eq!(result.data.len(), 1);
    assert_eq!(result.data[0].person, "A");
    assert_eq!(result.errors.len(), 2);
    assert!(result
        .errors
        .iter()
        .all(|e| e.kind == ErrorKind::Invalid && e.field == FIELD_MILES_RUN));
    assert!(result.errors[0].message.contains("unusually high"));
    assert!(result.errors[1].message.contains("cannot be negative"));
}

#[test]
fn date_formats() {
    let csv = "date,person,miles run
2024-01-05,A,1
01/05/2024,B,1
2024/01/05,C,1
13/40/2024,D,1
";
    let result = parse_csv_str(csv);
    assert_eq!(result.data.len(), 3);
    let keys: Vec<String> = result
        .data
        .iter()
        .map(|r| r.date.format("%Y-%m-%d").to_string())
        .collect();
    assert!(keys.iter().all(|k| k == "2024-01-05"));
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].row, 4);
    assert_eq!(result.errors[0].kind, ErrorKind::Invalid);
}

#[test]
fn duplicates_are_kept_and_counted() {
    let csv = "date,person,miles run
2024-01-01,Alice,3
2024-01-01,Alice,2
";
    let result = parse_csv_str(csv);
    assert!(result.success);
    assert_eq!(result.data.len(), 2);
    assert!(result.warnings.contains(&DataWarning::Duplicates(1)));
    let summary = generate_dashboard_summary(&result.data);
    assert_eq!(summary.overall_metrics.run_count, 2);
    assert_eq!(summary.chart_data[0].distances["Alice"], 5.0);
}

#[test]
fn wrong_headers_process_no_rows() {
    let result = parse_csv_str("Date,Runner,Miles\n2024-01-01,Alice,5\n");
    assert!(!result.success);
    assert!(result.data.is_empty());
    assert_eq!(result.errors.len(), 2);
    let messages: Vec<&str> = result.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Missing required header: \"person\"",
            "Missing required header: \"miles run\"",
        ]
    );
}

#[test]
fn parsing_is_deterministic() {
    let a = parse_csv_str(SAMPLE);
    let b = parse_csv_str(SAMPLE);
    assert_eq!(a.data, b.data);
    assert_eq!(a.errors, b.errors);
    assert_eq!(unique_people(&a.data), unique_people(&b.data));
}

#[test]
fn unreadable_path_is_a_file_level_error() {
    let path = std::env::temp_dir().join("run_report_no_such_dir/none.csv");
    let result = parse_csv_file(&path);
    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].row, 0);
    assert_eq!(result.errors[0].field, "file");
}

#[test]
fn summary_serializes_to_json() {
    let result = parse_csv_str(SAMPLE);
    let summary = generate_dashboard_summary(&result.data);
    let value = serde_json::to_value(&summary).unwrap();
    assert_eq!(value["total_records"], 3);
    assert_eq!(value["unique_people"][1], "Bob");
    assert_eq!(value["chart_data"][1]["distances"]["Bob"], 3.8);
    let parse_json = serde_json::to_value(&result).unwrap();
    assert_eq!(parse_json["success"], true);
}

#[test]
fn undecodable_bytes_stay_row_local() {
    let bytes: &[u8] = b"date,person,miles run\n2024-01-01,A,1\n2024-01-02,B,\xff\n2024-01-03,C,3\n";
    let result = run_report::parse_csv_reader(bytes, "runs.csv");
    assert_eq!(result.data.len(), 2);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].row, 2);
    assert_eq!(result.errors[0].kind, ErrorKind::TypeError);
}
