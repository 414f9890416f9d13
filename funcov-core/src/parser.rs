//! JavaScript and TypeScript parsing using SWC
//!
//! Global invariants enforced:
//! - Each unit parses against its own source map; concurrent runs share nothing
//! - Formatting, comments, and whitespace must not affect classification

use anyhow::Result;
use swc_common::{sync::Lrc, FileName, SourceFile, SourceMap};
use swc_ecma_ast::{EsVersion, Module};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};

/// Picks the parser syntax from the unit's file extension.
///
/// `.ts`, `.mts` and `.cts` parse as TypeScript (`.d.ts` in declaration
/// mode), `.tsx` as TypeScript with JSX, `.jsx` as JavaScript with JSX, and
/// everything else as plain JavaScript.
fn syntax_for_file(filename: &str) -> Syntax {
    if filename.ends_with(".tsx") {
        Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        })
    } else if filename.ends_with(".ts") || filename.ends_with(".mts") || filename.ends_with(".cts")
    {
        Syntax::Typescript(TsSyntax {
            dts: filename.ends_with(".d.ts"),
            ..Default::default()
        })
    } else if filename.ends_with(".jsx") {
        Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        })
    } else {
        Syntax::Es(EsSyntax::default())
    }
}

/// Parses one unit of source into a module AST.
///
/// The resulting spans resolve through `source_map`, so the caller must keep
/// using the same map for position lookups on this module.
pub fn parse_source(src: &str, source_map: &Lrc<SourceMap>, filename: &str) -> Result<Module> {
    let syntax = syntax_for_file(filename);

    let source_file: Lrc<SourceFile> =
        source_map.new_source_file(FileName::Custom(filename.into()).into(), src.to_string());
    let lexer = Lexer::new(
        syntax,
        EsVersion::Es2022,
        StringInput::from(&*source_file),
        None,
    );
    let mut parser = Parser::new_from(lexer);

    parser.parse_module().map_err(|e| {
        anyhow::anyhow!("parse error: {}", e.kind().msg())
            .context(format!("failed to parse source file: {}", filename))
    })
}
