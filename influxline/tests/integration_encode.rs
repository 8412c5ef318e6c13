//! Integration tests for point encoding.
//!
//! Covers the reference scenarios for the WebServer example, tag-order
//! determinism, and round-tripping encoded lines through InfluxData's own
//! line-protocol parser.

use std::collections::BTreeMap;

use influxdb_line_protocol::{FieldValue, parse_lines};
use influxline::{Batch, EncodeError, EncodeOptions, Point, Value, encode};

fn web_server() -> Point {
    Point::new("WebServer")
        .with_tag("Server", "Host01")
        .with_field("CPU", 100)
        .with_field("Memory", 50)
}

/// A parsed line reduced to comparable parts.
#[derive(Debug, PartialEq)]
struct Parsed {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: Vec<(String, Value)>,
    timestamp: Option<i64>,
}

fn parse_one(line: &str) -> Parsed {
    let mut lines: Vec<_> = parse_lines(line).collect::<Result<_, _>>().unwrap();
    assert_eq!(lines.len(), 1, "expected exactly one line in {line:?}");
    let parsed = lines.remove(0);

    let tags = parsed
        .series
        .tag_set
        .iter()
        .flatten()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let fields = parsed
        .field_set
        .iter()
        .map(|(k, v)| {
            let value = match v {
                FieldValue::I64(i) => Value::Integer(*i),
                FieldValue::U64(u) => Value::UInteger(*u),
                FieldValue::F64(f) => Value::Float(*f),
                FieldValue::Boolean(b) => Value::Boolean(*b),
                FieldValue::String(s) => Value::String(s.to_string()),
            };
            (k.to_string(), value)
        })
        .collect();

    Parsed {
        measurement: parsed.series.measurement.to_string(),
        tags,
        fields,
        timestamp: parsed.timestamp,
    }
}

#[test]
fn test_scenario_a_basic_point() {
    let encoded = encode(&web_server(), &EncodeOptions::default()).unwrap();
    assert_eq!(encoded.line.as_str(), "WebServer,Server=Host01 CPU=100i,Memory=50i");
}

#[test]
fn test_scenario_b_excluded_empty_field() {
    let point = web_server().with_field("Memory", "");
    let encoded = encode(&point, &EncodeOptions::exclude_empty_fields()).unwrap();

    assert_eq!(encoded.line.as_str(), "WebServer,Server=Host01 CPU=100i");
}

#[test]
fn test_scenario_c_empty_tag_dropped_with_signal() {
    let point = web_server().with_tag("Server", "");
    let encoded = encode(&point, &EncodeOptions::default()).unwrap();

    assert_eq!(encoded.line.as_str(), "WebServer CPU=100i,Memory=50i");
    assert_eq!(encoded.rejected_tags, ["Server"]);
}

#[test]
fn test_scenario_d_string_field() {
    let point = Point::new("WebServer")
        .with_tag("Server", "Host01")
        .with_field("status", "ok");
    let encoded = encode(&point, &EncodeOptions::default()).unwrap();

    assert_eq!(encoded.line.as_str(), r#"WebServer,Server=Host01 status="ok""#);
    assert!(!encoded.line.as_str().ends_with('i'));
}

#[test]
fn test_scenario_e_bulk_skips_unencodable_point() {
    let points = vec![
        web_server(),
        Point::new("WebServer").with_tag("Server", "Host02"),
        web_server().with_tag("Server", "Host03"),
    ];

    let report = Batch::encode_points(&points, &EncodeOptions::default());
    let body = report.batch.to_body();

    assert_eq!(
        body,
        "WebServer,Server=Host01 CPU=100i,Memory=50i\nWebServer,Server=Host03 CPU=100i,Memory=50i"
    );
    assert_eq!(body.lines().count(), 2);
    assert_eq!(report.dropped.len(), 1);
    assert!(matches!(report.dropped[0].error, EncodeError::NoFields { .. }));
}

#[test]
fn test_excluded_fields_never_appear() {
    let keys = ["a", "b", "c", "d"];
    for skip in keys {
        let mut point = Point::new("m");
        for key in keys {
            if key == skip {
                point.set_field(key, Value::Null);
            } else {
                point.set_field(key, 1.5);
            }
        }

        let line = encode(&point, &EncodeOptions::exclude_empty_fields()).unwrap().line;
        let parsed = parse_one(line.as_str());
        assert!(parsed.fields.iter().all(|(k, _)| k != skip), "{skip} in {line}");
        assert_eq!(parsed.fields.len(), 3);
    }
}

#[test]
fn test_tag_order_does_not_matter() {
    let tags = [
        ("vcenter", "vc01"),
        ("datacenter", "DC East"),
        ("cluster", "prod,gold"),
        ("host", "esx01.local"),
        ("vm", "web=01"),
    ];

    let build = |order: &[usize]| {
        let mut point = Point::new("vm_stats").with_field("cpu_ready", 12);
        for &i in order {
            point.set_tag(tags[i].0, Some(tags[i].1.to_string()));
        }
        encode(&point, &EncodeOptions::default()).unwrap().line
    };

    let reference = build(&[0, 1, 2, 3, 4]);
    for order in [[4, 3, 2, 1, 0], [2, 0, 4, 1, 3], [1, 2, 3, 4, 0]] {
        assert_eq!(build(&order), reference);
    }
    assert_eq!(
        reference.as_str(),
        r"vm_stats,cluster=prod\,gold,datacenter=DC\ East,host=esx01.local,vcenter=vc01,vm=web\=01 cpu_ready=12i"
    );
}

#[test]
fn test_zero_fields_is_no_line() {
    let options = [EncodeOptions::default(), EncodeOptions::exclude_empty_fields()];
    for options in options {
        let point = Point::new("m")
            .with_tag("host", "a")
            .with_field("x", "")
            .with_field("y", Value::Null)
            .with_field("z", f64::NAN);

        assert!(matches!(
            encode(&point, &options),
            Err(EncodeError::NoFields { .. })
        ));
        let report = Batch::encode_points([&point], &options);
        assert!(report.batch.is_empty());
        assert_eq!(report.batch.to_body(), "");
    }
}

#[test]
fn test_roundtrip_through_reference_parser() {
    let point = Point::new("disk io,sda")
        .with_tag("host name", "esx=01")
        .with_tag("dc", "east,1")
        .with_field("reads", 1_234_567)
        .with_field("bytes", u64::MAX)
        .with_field("latency ms", 0.125)
        .with_field("healthy", true)
        .with_field("note", r#"path "C:\vm" ok, really"#)
        .with_field("count_as_text", "123")
        .with_timestamp_nanos(1_700_000_000_123_456_789);

    let line = encode(&point, &EncodeOptions::default()).unwrap().line;
    let parsed = parse_one(line.as_str());

    assert_eq!(
        parsed,
        Parsed {
            measurement: "disk io,sda".to_string(),
            tags: BTreeMap::from([
                ("dc".to_string(), "east,1".to_string()),
                ("host name".to_string(), "esx=01".to_string()),
            ]),
            fields: point.fields().to_vec(),
            timestamp: Some(1_700_000_000_123_456_789),
        }
    );
}

#[test]
fn test_roundtrip_without_tags_or_timestamp() {
    let point = Point::new("uptime").with_field("seconds", 86_400);
    let line = encode(&point, &EncodeOptions::default()).unwrap().line;
    let parsed = parse_one(line.as_str());

    assert_eq!(parsed.measurement, "uptime");
    assert!(parsed.tags.is_empty());
    assert_eq!(parsed.fields, [("seconds".to_string(), Value::Integer(86_400))]);
    assert_eq!(parsed.timestamp, None);
}

#[test]
fn test_batch_body_parses_line_for_line() {
    let points: Vec<Point> = (0..5)
        .map(|i| {
            Point::new("vm")
                .with_tag("id", format!("vm-{i}"))
                .with_field("cpu", f64::from(i) * 1.5)
                .with_field("power", if i % 2 == 0 { "on" } else { "" })
        })
        .collect();

    let report = Batch::encode_points(&points, &EncodeOptions::exclude_empty_fields());
    let body = report.batch.to_body();
    let parsed: Vec<_> = parse_lines(&body).collect::<Result<_, _>>().unwrap();

    assert_eq!(parsed.len(), 5);
    assert_eq!(report.skipped_fields, 2);
    for (i, line) in parsed.iter().enumerate() {
        assert_eq!(line.tag_value("id").unwrap().as_str(), format!("vm-{i}"));
        assert_eq!(line.field_value("power").is_some(), i % 2 == 0);
    }
}

#[test]
fn test_hostile_names_cannot_inject_lines() {
    let points = vec![
        Point::new("m")
            .with_tag("host", "a\nevil v=9i")
            .with_tag("", "x")
            .with_field("", 0)
            .with_field("v", 1),
        Point::new("m\nevil").with_field("v", 2),
        Point::new("m").with_field("v\nevil", 3),
    ];

    let report = Batch::encode_points(&points, &EncodeOptions::default());
    let body = report.batch.to_body();
    let parsed: Vec<_> = parse_lines(&body).collect::<Result<_, _>>().unwrap();

    assert_eq!(parsed.len(), 1);
    assert_eq!(report.dropped.len(), 2);
    assert!(matches!(
        report.dropped[0].error,
        EncodeError::LineBreakInMeasurement { .. }
    ));
    assert!(matches!(
        report.dropped[1].error,
        EncodeError::LineBreakInFieldKey { .. }
    ));
    assert_eq!(
        parse_one(&body),
        Parsed {
            measurement: "m".to_string(),
            tags: BTreeMap::new(),
            fields: vec![("v".to_string(), Value::Integer(1))],
            timestamp: None,
        }
    );
}
