//! Integration tests for instrumenting concatenated bundles

use std::path::Path;

use funcov_core::{instrument, BundleFile, InstrumentOptions, Position};

fn bundle_options(counter: &str, bundle: &BundleFile) -> InstrumentOptions {
    InstrumentOptions {
        counter_object: counter.to_string(),
        bundle_map: Some(bundle.bundle_map()),
        ..Default::default()
    }
}

#[test]
fn test_bundle_coverage_maps_to_original_files() {
    let mut bundle = BundleFile::new();
    bundle.write_content("// Hello World");
    bundle.write_content("// Some unmapped content");
    bundle.write_file_content(
        "func1.js",
        "// anonymous function here\nvar f1 = function() {\n    return 1;\n};\n// end of anonymous function\n",
    );
    bundle.write_file_content(
        "func2.js",
        "// named function here\n    function f1() {\n        return 1;\n    }\n// end of named function\n",
    );

    let options = bundle_options("s", &bundle);
    let out = instrument(Path::new("."), Path::new("bundle.js"), &bundle.render(), options).unwrap();

    let file1 = out.coverage.file_info("func1.js").expect("func1.js info");
    assert_eq!(file1.function_ids().len(), 1);
    let f1 = file1.function_info(file1.function_ids()[0]).unwrap();
    assert_eq!(f1.name, "(anonymous_1)");
    assert_eq!(f1.location.start, Position::new(2, 9));
    assert_eq!(f1.location.end.line, 4);

    let file2 = out.coverage.file_info("func2.js").expect("func2.js info");
    let f2 = file2.function_info(file2.function_ids()[0]).unwrap();
    assert_eq!(f2.name, "f1");
    assert_eq!(f2.location.start, Position::new(2, 4));

    assert!(
        out.code.contains(r#"s.countFunction("func1.js", 1)"#),
        "code: {}",
        out.code
    );
    assert!(
        out.code.contains(r#"s.countFunction("func2.js", 1)"#),
        "code: {}",
        out.code
    );
}

#[test]
fn test_excluded_bundle_files_report_nothing() {
    let mut bundle = BundleFile::new();
    bundle.write_file_content("func1.js", "var a = function() {\n    return 1;\n};\n");
    bundle.write_file_content("func2.js", "var b = function() {\n    return 2;\n};\n");

    let options = InstrumentOptions {
        counter_object: "s".to_string(),
        excludes: vec!["func2.js".to_string()],
        bundle_map: Some(bundle.bundle_map()),
        ..Default::default()
    };
    let out = instrument(Path::new("."), Path::new("bundle.js"), &bundle.render(), options).unwrap();

    assert!(out.coverage.file_info("func1.js").is_some());
    assert!(out.coverage.file_info("func2.js").is_none());
    assert!(out.code.contains(r#"s.countFunction("func1.js", 1)"#), "code: {}", out.code);
    assert!(!out.code.contains(r#""func2.js""#), "code: {}", out.code);
}

#[test]
fn test_functions_crossing_region_boundaries_fail() {
    let mut bundle = BundleFile::new();
    bundle.write_file_content("head.js", "var f = function() {\n");
    bundle.write_file_content("tail.js", "    return 1;\n};\n");

    let options = bundle_options("s", &bundle);
    let err =
        instrument(Path::new("."), Path::new("bundle.js"), &bundle.render(), options).unwrap_err();

    let message = format!("{:#}", err);
    assert!(message.contains("head.js"), "message: {}", message);
    assert!(message.contains("tail.js"), "message: {}", message);
}
