use opencover_trace::aggregator::{summarize, Aggregator, CoverageTree};
use opencover_trace::output::validate_path;
use opencover_trace::output::{read_report, render_opencover, to_report, write_report, write_xml};
use opencover_trace::parser::{AssemblyLoad, ClassLoad, MethodLoad, StatementVisit};
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::NamedTempFile;

fn create_test_tree() -> CoverageTree {
    let tree = Aggregator::new()
        .build(
            &[AssemblyLoad {
                name: "Foo".to_string(),
                filename: "foo.dll".to_string(),
                guid: "guid1".to_string(),
            }],
            &[ClassLoad {
                assembly_filename: "foo.dll".to_string(),
                class_name: "Foo.Bar<T>".to_string(),
            }],
            &[MethodLoad {
                assembly_filename: "foo.dll".to_string(),
                class_name: "Foo.Bar<T>".to_string(),
                method_name: "Baz".to_string(),
                token: 100663297,
                method_id: 42,
                filename: "src/foo.cs".to_string(),
            }],
            &[
                StatementVisit {
                    method_id: 42,
                    visit_count: 3,
                    offset: 0,
                    line: 10,
                    column: 9,
                },
                StatementVisit {
                    method_id: 42,
                    visit_count: 0,
                    offset: 6,
                    line: 11,
                    column: 13,
                },
            ],
        )
        .unwrap();

    summarize(tree)
}

#[test]
fn test_render_opencover_structure() {
    let xml = render_opencover(&create_test_tree());

    assert!(xml.contains("<Module hash=\"guid1\">"));
    assert!(xml.contains("<ModulePath>foo.dll</ModulePath>"));
    assert!(xml.contains("<ModuleName>Foo</ModuleName>"));
    assert!(xml.contains("<File uid=\"1\" fullPath=\"src/foo.cs\" />"));
    assert!(xml.contains("<FullName>Foo.Bar&lt;T&gt;</FullName>"));
    assert!(xml.contains("<MetadataToken>100663297</MetadataToken>"));
    assert!(xml.contains("<FileRef uid=\"1\" />"));
    assert!(xml.contains(
        "<SequencePoint vc=\"3\" uspid=\"1\" ordinal=\"0\" offset=\"0\" sl=\"10\" sc=\"9\" el=\"10\" ec=\"9\" fileid=\"1\" />"
    ));
    assert!(xml.contains(
        "<SequencePoint vc=\"0\" uspid=\"2\" ordinal=\"1\" offset=\"6\" sl=\"11\" sc=\"13\" el=\"11\" ec=\"13\" fileid=\"1\" />"
    ));
    assert!(xml.contains("<Method visited=\"true\" sequenceCoverage=\"50.00\""));
    // Session, module, class and method summaries
    assert_eq!(xml.matches("numSequencePoints=\"2\" visitedSequencePoints=\"1\"").count(), 4);
}

#[test]
fn test_write_xml_creates_parent_dirs() {
    let temp_dir = tempfile::tempdir().unwrap();
    let nested_path = temp_dir.path().join("nested/dirs/coverage.xml");

    let xml = render_opencover(&create_test_tree());
    write_xml(&xml, &nested_path).unwrap();

    assert!(nested_path.exists());
    assert_eq!(std::fs::read_to_string(&nested_path).unwrap(), xml);
}

#[test]
fn test_write_and_read_report() {
    let report = to_report(&create_test_tree());
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    write_report(&report, path).unwrap();
    let loaded = read_report(path).unwrap();

    assert_eq!(loaded, report);
}

#[test]
fn test_report_contents() {
    let report = to_report(&create_test_tree());

    assert_eq!(report.version, "1.0.0");
    assert_eq!(report.summary.num_sequence_points, 2);
    assert_eq!(report.summary.sequence_coverage, 50.0);

    let module = &report.modules[0];
    assert_eq!(module.hash, "guid1");
    assert_eq!(module.files[0].uid, 1);

    let method = &module.classes[0].methods[0];
    assert_eq!(method.name, "Baz");
    assert!(method.visited);
    assert_eq!(method.sequence_points.len(), 2);
    assert_eq!(method.sequence_points[1].ordinal, 1);
}

#[test]
fn test_validate_output_path_empty() {
    assert!(validate_path(Path::new("")).is_err());
}

#[test]
fn test_validate_output_path_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    assert!(validate_path(temp_dir.path()).is_err());
    assert!(write_xml("<x/>", temp_dir.path()).is_err());
}

#[cfg(target_os = "linux")]
#[test]
fn test_write_report_surfaces_device_full() {
    let report = to_report(&create_test_tree());
    assert!(write_report(&report, "/dev/full").is_err());

    let xml = render_opencover(&create_test_tree());
    assert!(write_xml(&xml, "/dev/full").is_err());
}
