use opencover_trace::parser::{parse_trace, read_trace, EventStreams, TraceEvent};
use opencover_trace::utils::error::ParseError;
use std::io::Write;
use tempfile::NamedTempFile;

const SAMPLE_TRACE: &str = r#"{"event":"assembly_load","name":"Foo","filename":"foo.dll","guid":"guid1"}
{"event":"class_load","assembly_filename":"foo.dll","class_name":"Foo.Bar"}
{"event":"method_load","assembly_filename":"foo.dll","class_name":"Foo.Bar","method_name":"Baz","token":1,"method_id":42,"filename":"foo.cs"}
{"event":"statement_visit","method_id":42,"visit_count":3,"offset":0,"line":10,"column":9}
{"event":"statement_visit","method_id":42,"visit_count":0,"offset":6,"line":11,"column":9}
"#;

#[test]
fn test_read_trace_json_lines() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SAMPLE_TRACE.as_bytes()).unwrap();

    let events = read_trace(file.path()).unwrap();
    assert_eq!(events.len(), 5);

    let streams = EventStreams::partition(events);
    assert_eq!(streams.assemblies.len(), 1);
    assert_eq!(streams.classes.len(), 1);
    assert_eq!(streams.methods.len(), 1);
    assert_eq!(streams.statements.len(), 2);
    assert_eq!(streams.methods[0].filename, "foo.cs");
    assert_eq!(streams.statements[1].line, 11);
}

#[test]
fn test_parse_json_array_with_camel_case() {
    let raw = r#"[
        {"type": "AssemblyLoad", "name": "Foo", "filename": "foo.dll", "guid": "g"},
        {"type": "ClassLoad", "assemblyFilename": "foo.dll", "className": "Foo.Bar"},
        {"type": "StatementVisit", "methodId": 7, "counter": 2, "line": 3, "column": 1}
    ]"#;

    let events = parse_trace(raw).unwrap();
    assert_eq!(events.len(), 3);

    match &events[2] {
        TraceEvent::StatementVisit(visit) => {
            assert_eq!(visit.method_id, 7);
            assert_eq!(visit.visit_count, 2);
            assert_eq!(visit.offset, 0);
        }
        other => panic!("expected statement visit, got {:?}", other),
    }
}

#[test]
fn test_unknown_kinds_survive_decoding() {
    let raw = r#"{"kind":"allocation","size":64}
{"kind":"assembly_load","name":"Foo","filename":"foo.dll"}
"#;

    let streams = EventStreams::partition(parse_trace(raw).unwrap());
    assert_eq!(streams.unrecognized, vec![(0, "allocation".to_string())]);
    assert_eq!(streams.assemblies[0].guid, "");
}

#[test]
fn test_invalid_json_line_is_error() {
    let raw = "{\"event\":\"class_load\"\nnot json\n";
    assert!(matches!(parse_trace(raw), Err(ParseError::JsonError(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = read_trace(dir.path().join("absent.jsonl"));
    assert!(matches!(result, Err(ParseError::IoError(_))));
}

#[test]
fn test_empty_trace() {
    assert!(parse_trace("").unwrap().is_empty());
    assert!(parse_trace("[]").unwrap().is_empty());
}
