//! Counter injection for function-level coverage
//!
//! [`FunctionCounters`] walks a parsed unit in document order, recognizes
//! every function-like construct, assigns it a per-original-file ID, records
//! name and location in the unit's [`CoverageInfo`], and prepends a
//! `counterObject.countFunction(file, id)` call to the function body. IDs
//! depend only on document order, so instrumenting the same unit twice
//! yields identical output.

use std::collections::HashMap;

use swc_common::{BytePos, SourceMap, Span, SyntaxContext, DUMMY_SP};
use swc_ecma_ast::{
    ArrowExpr, BlockStmt, BlockStmtOrExpr, CallExpr, Callee, ClassDecl, ClassExpr, ClassMethod,
    Constructor, Expr, ExprOrSpread, ExprStmt, FnDecl, FnExpr, GetterProp, Ident, IdentName, Lit,
    MemberExpr, MemberProp, MethodKind, MethodProp, Number, PrivateMethod, PropName, ReturnStmt,
    SetterProp, Stmt, Str,
};
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::coverage::{CoverageInfo, Location, Position};
use crate::exclude::ExcludeSet;
use crate::locator::{ResolutionError, SourceLocator};
use crate::source::Source;

/// How the `(anonymous_K)` counter advances when a unit maps back to
/// several original files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnonymousNaming {
    /// Restart numbering for each original file.
    #[default]
    PerFile,
    /// Keep one counter across the whole unit.
    PerRun,
}

/// The instrumentation pass.
///
/// `counter_object` is the identifier the injected calls are made on. It is
/// not declared by the pass; the hosting runtime is expected to provide it
/// before the instrumented code runs.
#[derive(Debug, Clone)]
pub struct FunctionCounters {
    counter_object: String,
    naming: AnonymousNaming,
}

impl FunctionCounters {
    pub fn new(counter_object: impl Into<String>) -> Self {
        FunctionCounters {
            counter_object: counter_object.into(),
            naming: AnonymousNaming::default(),
        }
    }

    pub fn with_anonymous_naming(
        counter_object: impl Into<String>,
        naming: AnonymousNaming,
    ) -> Self {
        FunctionCounters {
            counter_object: counter_object.into(),
            naming,
        }
    }

    /// Instruments one unit in place.
    ///
    /// On success the unit's AST carries the injected counter calls and its
    /// coverage registry lists every counted function. On error the unit is
    /// left partially rewritten and must be discarded.
    pub fn process(&self, source: &mut Source) -> Result<(), ResolutionError> {
        let mut injector = CounterInjector {
            counter_object: &self.counter_object,
            naming: self.naming,
            source_map: &source.source_map,
            locator: &source.locator,
            excludes: &source.excludes,
            coverage: &mut source.coverage,
            class_stack: Vec::new(),
            anonymous_in_file: HashMap::new(),
            anonymous_in_run: 0,
            error: None,
        };
        source.module.visit_mut_with(&mut injector);
        match injector.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

struct CounterInjector<'a> {
    counter_object: &'a str,
    naming: AnonymousNaming,
    source_map: &'a SourceMap,
    locator: &'a SourceLocator,
    excludes: &'a ExcludeSet,
    coverage: &'a mut CoverageInfo,
    /// Enclosing class names, innermost last. `None` marks an anonymous
    /// class expression.
    class_stack: Vec<Option<String>>,
    anonymous_in_file: HashMap<String, u32>,
    anonymous_in_run: u32,
    error: Option<ResolutionError>,
}

impl CounterInjector<'_> {
    fn position_at(&self, pos: BytePos) -> Position {
        let loc = self.source_map.lookup_char_pos(pos);
        Position::new(loc.line as u32, loc.col.0 as u32)
    }

    /// Maps a function span back to its original file.
    ///
    /// Returns `None` when the function belongs to an excluded file, or when
    /// the span straddles two original files (which also latches the error
    /// that aborts the pass). Callers must not descend on `None`.
    fn resolve_function(&mut self, span: Span) -> Option<(String, Location)> {
        let start_pos = self.position_at(span.lo);
        let start = self.locator.resolve(start_pos);
        if self.excludes.is_excluded(&start.file) {
            return None;
        }
        let end = self.locator.resolve(self.position_at(span.hi));
        if start.file != end.file {
            self.error = Some(ResolutionError::CrossesFileBoundary {
                at: start_pos,
                start_file: start.file,
                end_file: end.file,
            });
            return None;
        }
        Some((start.file, Location::new(start.position, end.position)))
    }

    /// Next `(anonymous_K)` name. Only counted functions advance the
    /// counter, so skipped nodes leave no numbering gaps.
    fn anonymous_name(&mut self, file: &str) -> String {
        let k = match self.naming {
            AnonymousNaming::PerFile => {
                let counter = self.anonymous_in_file.entry(file.to_string()).or_insert(0);
                *counter += 1;
                *counter
            }
            AnonymousNaming::PerRun => {
                self.anonymous_in_run += 1;
                self.anonymous_in_run
            }
        };
        format!("(anonymous_{})", k)
    }

    /// Qualifies a class member name. Members of anonymous class
    /// expressions keep the bare key.
    fn member_name(&self, key: &str, kind: MethodKind) -> String {
        let suffix = match kind {
            MethodKind::Method => "",
            MethodKind::Getter => "(get)",
            MethodKind::Setter => "(set)",
        };
        match self.class_stack.last().and_then(|name| name.as_deref()) {
            Some(class) => format!("{}::{}{}", class, key, suffix),
            None => format!("{}{}", key, suffix),
        }
    }

    /// Registers the function and prepends its counter call.
    fn count(&mut self, file: String, name: String, location: Location, body: &mut BlockStmt) {
        let id = self.coverage.file_info_mut(&file).add_function(name, location);
        body.stmts
            .insert(0, counter_stmt(self.counter_object, &file, id));
    }
}

impl VisitMut for CounterInjector<'_> {
    fn visit_mut_fn_decl(&mut self, decl: &mut FnDecl) {
        if self.error.is_some() {
            return;
        }
        if let Some((file, location)) = self.resolve_function(decl.function.span) {
            if let Some(body) = decl.function.body.as_mut() {
                let name = decl.ident.sym.to_string();
                self.count(file, name, location, body);
            }
            decl.visit_mut_children_with(self);
        }
    }

    fn visit_mut_fn_expr(&mut self, expr: &mut FnExpr) {
        if self.error.is_some() {
            return;
        }
        if let Some((file, location)) = self.resolve_function(expr.function.span) {
            if let Some(body) = expr.function.body.as_mut() {
                let name = match expr.ident.as_ref() {
                    Some(ident) => ident.sym.to_string(),
                    None => self.anonymous_name(&file),
                };
                self.count(file, name, location, body);
            }
            expr.visit_mut_children_with(self);
        }
    }

    fn visit_mut_arrow_expr(&mut self, arrow: &mut ArrowExpr) {
        if self.error.is_some() {
            return;
        }
        if let Some((file, location)) = self.resolve_function(arrow.span) {
            let name = self.anonymous_name(&file);
            let id = self.coverage.file_info_mut(&file).add_function(name, location);
            let counter = counter_stmt(self.counter_object, &file, id);
            match &mut *arrow.body {
                BlockStmtOrExpr::BlockStmt(body) => {
                    body.stmts.insert(0, counter);
                }
                BlockStmtOrExpr::Expr(expr) => {
                    // `x => e` becomes `x => { count(); return e; }`.
                    let return_stmt = Stmt::Return(ReturnStmt {
                        span: arrow.span,
                        arg: Some(expr.clone()),
                    });
                    *arrow.body = BlockStmtOrExpr::BlockStmt(BlockStmt {
                        span: arrow.span,
                        ctxt: arrow.ctxt,
                        stmts: vec![counter, return_stmt],
                    });
                }
            }
            arrow.visit_mut_children_with(self);
        }
    }

    fn visit_mut_class_decl(&mut self, decl: &mut ClassDecl) {
        if self.error.is_some() {
            return;
        }
        self.class_stack.push(Some(decl.ident.sym.to_string()));
        decl.visit_mut_children_with(self);
        self.class_stack.pop();
    }

    fn visit_mut_class_expr(&mut self, expr: &mut ClassExpr) {
        if self.error.is_some() {
            return;
        }
        self.class_stack
            .push(expr.ident.as_ref().map(|ident| ident.sym.to_string()));
        expr.visit_mut_children_with(self);
        self.class_stack.pop();
    }

    fn visit_mut_constructor(&mut self, ctor: &mut Constructor) {
        if self.error.is_some() {
            return;
        }
        if let Some((file, location)) = self.resolve_function(ctor.span) {
            if let Some(body) = ctor.body.as_mut() {
                let name = self.member_name("constructor", MethodKind::Method);
                self.count(file, name, location, body);
            }
            ctor.visit_mut_children_with(self);
        }
    }

    fn visit_mut_class_method(&mut self, method: &mut ClassMethod) {
        if self.error.is_some() {
            return;
        }
        if let Some((file, location)) = self.resolve_function(method.span) {
            if let Some(body) = method.function.body.as_mut() {
                let name = match prop_key(&method.key) {
                    Some(key) => self.member_name(&key, method.kind),
                    // Computed keys have no static name.
                    None => self.anonymous_name(&file),
                };
                self.count(file, name, location, body);
            }
            method.visit_mut_children_with(self);
        }
    }

    fn visit_mut_private_method(&mut self, method: &mut PrivateMethod) {
        if self.error.is_some() {
            return;
        }
        if let Some((file, location)) = self.resolve_function(method.span) {
            if let Some(body) = method.function.body.as_mut() {
                let key = format!("#{}", method.key.name);
                let name = self.member_name(&key, method.kind);
                self.count(file, name, location, body);
            }
            method.visit_mut_children_with(self);
        }
    }

    fn visit_mut_method_prop(&mut self, method: &mut MethodProp) {
        if self.error.is_some() {
            return;
        }
        if let Some((file, location)) = self.resolve_function(method.function.span) {
            if let Some(body) = method.function.body.as_mut() {
                let name = self.anonymous_name(&file);
                self.count(file, name, location, body);
            }
            method.visit_mut_children_with(self);
        }
    }

    fn visit_mut_getter_prop(&mut self, prop: &mut GetterProp) {
        if self.error.is_some() {
            return;
        }
        if let Some((file, location)) = self.resolve_function(prop.span) {
            if let Some(body) = prop.body.as_mut() {
                let name = self.anonymous_name(&file);
                self.count(file, name, location, body);
            }
            prop.visit_mut_children_with(self);
        }
    }

    fn visit_mut_setter_prop(&mut self, prop: &mut SetterProp) {
        if self.error.is_some() {
            return;
        }
        if let Some((file, location)) = self.resolve_function(prop.span) {
            if let Some(body) = prop.body.as_mut() {
                let name = self.anonymous_name(&file);
                self.count(file, name, location, body);
            }
            prop.visit_mut_children_with(self);
        }
    }
}

/// Extracts a statically-known member key, mirroring how the runtime sees
/// it. Computed keys yield `None`.
fn prop_key(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(str_lit) => Some(str_lit.value.to_atom_lossy().to_string()),
        PropName::Num(num) => Some(num.to_string()),
        _ => None,
    }
}

/// Builds `counterObject.countFunction("file", id);`.
fn counter_stmt(counter_object: &str, file: &str, id: u32) -> Stmt {
    let callee = MemberExpr {
        span: DUMMY_SP,
        obj: Box::new(Expr::Ident(Ident::new(
            counter_object.into(),
            DUMMY_SP,
            SyntaxContext::empty(),
        ))),
        prop: MemberProp::Ident(IdentName::new("countFunction".into(), DUMMY_SP)),
    };
    let call = CallExpr {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        callee: Callee::Expr(Box::new(Expr::Member(callee))),
        args: vec![
            ExprOrSpread {
                spread: None,
                expr: Box::new(Expr::Lit(Lit::Str(Str {
                    span: DUMMY_SP,
                    value: file.into(),
                    raw: None,
                }))),
            },
            ExprOrSpread {
                spread: None,
                expr: Box::new(Expr::Lit(Lit::Num(Number {
                    span: DUMMY_SP,
                    value: f64::from(id),
                    raw: None,
                }))),
            },
        ],
        type_args: None,
    };
    Stmt::Expr(ExprStmt {
        span: DUMMY_SP,
        expr: Box::new(Expr::Call(call)),
    })
}
