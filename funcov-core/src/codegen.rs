//! Printing instrumented modules back to text
//!
//! The printer half of the parse/print pair. Printing preserves program
//! semantics; after instrumentation the injected counter calls are the only
//! intended difference from the input, modulo SWC's formatting
//! normalization.

use anyhow::{Context, Result};
use swc_common::{sync::Lrc, SourceMap};
use swc_ecma_ast::Module;
use swc_ecma_codegen::{text_writer::JsWriter, Config, Emitter};

/// Prints a module using the source map it was parsed with.
pub fn generate(module: &Module, source_map: &Lrc<SourceMap>) -> Result<String> {
    let mut buf = Vec::new();
    {
        let mut emitter = Emitter {
            cfg: Config::default(),
            cm: source_map.clone(),
            comments: None,
            wr: JsWriter::new(source_map.clone(), "\n", &mut buf, None),
        };
        emitter
            .emit_module(module)
            .context("failed to print module")?;
    }
    String::from_utf8(buf).context("printed module is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn round_trip(src: &str) -> String {
        let cm: Lrc<SourceMap> = Default::default();
        let module = parser::parse_source(src, &cm, "test.js").unwrap();
        generate(&module, &cm).unwrap()
    }

    #[test]
    fn test_round_trip_keeps_program_text() {
        let printed = round_trip("function foo() {\n    return 42;\n}\n");
        assert!(printed.contains("function foo()"), "printed: {}", printed);
        assert!(printed.contains("return 42;"), "printed: {}", printed);
    }

    #[test]
    fn test_round_trip_is_stable() {
        let src = "var f = function() {\n    return 1;\n};\n";
        let first = round_trip(src);
        let second = round_trip(&first);
        assert_eq!(first, second, "printing its own output changes nothing");
    }

    #[test]
    fn test_prints_class_members() {
        let printed = round_trip("class Hello {\n    get prop() {}\n    set prop(v) {}\n}\n");
        assert!(printed.contains("get prop()"), "printed: {}", printed);
        assert!(printed.contains("set prop("), "printed: {}", printed);
    }
}
