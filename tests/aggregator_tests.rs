use opencover_trace::aggregator::{build_from_events, summarize, Aggregator, CoverageTree};
use opencover_trace::parser::{AssemblyLoad, ClassLoad, MethodLoad, StatementVisit, TraceEvent};
use opencover_trace::utils::error::IntegrityError;
use pretty_assertions::assert_eq;

fn assembly(name: &str, filename: &str, guid: &str) -> AssemblyLoad {
    AssemblyLoad {
        name: name.to_string(),
        filename: filename.to_string(),
        guid: guid.to_string(),
    }
}

fn class(assembly: &str, name: &str) -> ClassLoad {
    ClassLoad {
        assembly_filename: assembly.to_string(),
        class_name: name.to_string(),
    }
}

fn method(assembly: &str, class: &str, name: &str, method_id: u64, file: &str) -> MethodLoad {
    MethodLoad {
        assembly_filename: assembly.to_string(),
        class_name: class.to_string(),
        method_name: name.to_string(),
        token: method_id,
        method_id,
        filename: file.to_string(),
    }
}

fn visit(method_id: u64, visit_count: u64) -> StatementVisit {
    StatementVisit {
        method_id,
        visit_count,
        offset: 0,
        line: 12,
        column: 5,
    }
}

/// Two modules, three classes, methods with uneven point counts
fn sample_tree() -> CoverageTree {
    let tree = Aggregator::new()
        .build(
            &[assembly("App", "app.dll", "g-app"), assembly("Lib", "lib.dll", "g-lib")],
            &[
                class("app.dll", "App.Program"),
                class("app.dll", "App.Util"),
                class("lib.dll", "Lib.Math"),
            ],
            &[
                method("app.dll", "App.Program", "Main", 1, "Program.cs"),
                method("app.dll", "App.Util", "Log", 2, "Util.cs"),
                method("app.dll", "App.Util", "Unused", 3, "Util.cs"),
                method("lib.dll", "Lib.Math", "Add", 4, "Math.cs"),
                method("lib.dll", "Lib.Math", "Sub", 5, "Math.cs"),
            ],
            &[
                visit(1, 1),
                visit(1, 1),
                visit(1, 0),
                visit(2, 7),
                visit(4, 0),
                visit(4, 2),
                visit(4, 0),
                visit(4, 0),
                visit(5, 0),
            ],
        )
        .unwrap();

    summarize(tree)
}

#[test]
fn test_single_method_example() {
    let tree = Aggregator::new()
        .build(
            &[assembly("Foo", "foo.dll", "guid1")],
            &[class("foo.dll", "Foo.Bar")],
            &[MethodLoad {
                assembly_filename: "foo.dll".to_string(),
                class_name: "Foo.Bar".to_string(),
                method_name: "Baz".to_string(),
                token: 1,
                method_id: 42,
                filename: "foo.cs".to_string(),
            }],
            &[visit(42, 3), visit(42, 0)],
        )
        .unwrap();
    let tree = summarize(tree);

    let baz = tree.find_method("foo.dll", "Foo.Bar", "Baz").unwrap();
    assert_eq!(baz.sequence_points.len(), 2);
    assert_eq!(baz.summary.num_sequence_points, 2);
    assert_eq!(baz.summary.visited_sequence_points, 1);
    assert_eq!(baz.summary.sequence_coverage, 50.0);

    let module = tree.modules().next().unwrap();
    let class = tree.classes_of(module).next().unwrap();
    for summary in [&class.summary, &module.summary] {
        assert_eq!(summary.num_sequence_points, 2);
        assert_eq!(summary.visited_sequence_points, 1);
        assert_eq!(summary.sequence_coverage, 50.0);
    }
}

#[test]
fn test_missing_assembly_aborts_without_tree() {
    let result = Aggregator::new().build(
        &[],
        &[],
        &[method("missing.dll", "Foo.Bar", "Baz", 1, "foo.cs")],
        &[],
    );

    let err = result.unwrap_err();
    assert_eq!(err.errors.len(), 1);
    assert!(matches!(
        &err.errors[0],
        IntegrityError::UnknownModule { module, .. } if module == "missing.dll"
    ));
}

#[test]
fn test_class_load_for_unknown_module() {
    let result = Aggregator::new().build(&[], &[class("ghost.dll", "Ghost")], &[], &[]);

    assert_eq!(
        result.unwrap_err().errors,
        vec![IntegrityError::UnknownModule {
            event: "class load",
            module: "ghost.dll".to_string()
        }]
    );
}

#[test]
fn test_method_summary_matches_points() {
    let tree = sample_tree();

    for module in tree.modules() {
        for class in tree.classes_of(module) {
            for method in tree.methods_of(class) {
                assert_eq!(
                    method.summary.num_sequence_points,
                    method.sequence_points.len() as u64
                );
                assert!(method.summary.visited_sequence_points <= method.summary.num_sequence_points);
                assert!((0.0..=100.0).contains(&method.summary.sequence_coverage));
            }
        }
    }

    let unused = tree.find_method("app.dll", "App.Util", "Unused").unwrap();
    assert_eq!(unused.summary.num_sequence_points, 0);
    assert_eq!(unused.summary.sequence_coverage, 0.0);
}

#[test]
fn test_rollup_sums_children() {
    let tree = sample_tree();

    for module in tree.modules() {
        let mut module_total = 0;
        let mut module_visited = 0;

        for class in tree.classes_of(module) {
            let total: u64 = tree
                .methods_of(class)
                .map(|m| m.summary.num_sequence_points)
                .sum();
            let visited: u64 = tree
                .methods_of(class)
                .map(|m| m.summary.visited_sequence_points)
                .sum();

            assert_eq!(class.summary.num_sequence_points, total);
            assert_eq!(class.summary.visited_sequence_points, visited);

            module_total += class.summary.num_sequence_points;
            module_visited += class.summary.visited_sequence_points;
        }

        assert_eq!(module.summary.num_sequence_points, module_total);
        assert_eq!(module.summary.visited_sequence_points, module_visited);
    }

    // Lib.Math: Add 1/4 and Sub 0/1 -> 1/5, not the 12.5% an average would give
    let lib = tree.module(tree.module_key("lib.dll").unwrap());
    assert_eq!(lib.summary.sequence_coverage, 20.0);
    assert_eq!(lib.summary.num_methods, 2);
    assert_eq!(lib.summary.visited_methods, 1);

    let app = tree.module(tree.module_key("app.dll").unwrap());
    assert_eq!(app.summary.num_classes, 2);
    assert_eq!(app.summary.visited_classes, 2);
}

#[test]
fn test_summarize_is_idempotent() {
    let once = sample_tree();
    let twice = summarize(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn test_duplicate_declarations_are_absorbed() {
    let assemblies = [assembly("Foo", "foo.dll", "g")];
    let classes = [class("foo.dll", "Foo.Bar"), class("foo.dll", "Foo.Qux")];
    let methods = [
        method("foo.dll", "Foo.Bar", "A", 1, "a.cs"),
        method("foo.dll", "Foo.Qux", "B", 2, "b.cs"),
    ];
    let statements = [visit(1, 1), visit(2, 0)];

    let once = Aggregator::new()
        .build(&assemblies, &classes, &methods, &statements)
        .unwrap();

    let doubled_assemblies = [assemblies.clone(), assemblies.clone()].concat();
    let doubled_classes = [classes.clone(), classes.clone()].concat();
    let doubled_methods = [methods.clone(), methods.clone()].concat();
    let twice = Aggregator::new()
        .build(&doubled_assemblies, &doubled_classes, &doubled_methods, &statements)
        .unwrap();

    assert_eq!(once, twice);
}

#[test]
fn test_file_ids_are_deterministic() {
    let build = || {
        Aggregator::new()
            .build(
                &[assembly("A", "a.dll", "g"), assembly("B", "b.dll", "g")],
                &[class("a.dll", "A.X"), class("b.dll", "B.X")],
                &[
                    method("b.dll", "B.X", "m1", 1, "shared.cs"),
                    method("a.dll", "A.X", "m2", 2, "shared.cs"),
                    method("a.dll", "A.X", "m3", 3, "other.cs"),
                ],
                &[],
            )
            .unwrap()
    };

    let first = build();
    let second = build();
    assert_eq!(first, second);

    // One counter across modules, in method-load arrival order
    let b = first.module(first.module_key("b.dll").unwrap());
    let a = first.module(first.module_key("a.dll").unwrap());
    assert_eq!(b.files_by_id(), vec![(1, "shared.cs")]);
    assert_eq!(a.files_by_id(), vec![(2, "shared.cs"), (3, "other.cs")]);
}

#[test]
fn test_every_file_ref_resolves() {
    let tree = sample_tree();

    for module in tree.modules() {
        for class in tree.classes_of(module) {
            for method in tree.methods_of(class) {
                assert!(module.files.values().any(|id| *id == method.file_ref));
            }
        }
    }
}

#[test]
fn test_build_from_events_collects_all_errors() {
    let events = vec![
        TraceEvent::AssemblyLoad(assembly("Foo", "foo.dll", "g")),
        TraceEvent::MethodLoad(method("foo.dll", "Foo.Missing", "Baz", 1, "foo.cs")),
        TraceEvent::StatementVisit(visit(1, 1)),
        TraceEvent::Unrecognized {
            kind: "sample_hit".to_string(),
        },
    ];

    let err = build_from_events(events).unwrap_err();
    assert_eq!(
        err.errors,
        vec![
            IntegrityError::UnrecognizedEvent {
                index: 3,
                kind: "sample_hit".to_string()
            },
            IntegrityError::UnknownClass {
                module: "foo.dll".to_string(),
                class: "Foo.Missing".to_string()
            },
            IntegrityError::UnknownMethod { method_id: 1 },
        ]
    );
    assert!(err.to_string().starts_with("3 integrity error(s)"));
}

#[test]
fn test_empty_trace_builds_empty_tree() {
    let tree = summarize(Aggregator::new().build(&[], &[], &[], &[]).unwrap());
    assert!(tree.is_empty());
    assert_eq!(tree.sequence_point_count(), 0);
}
