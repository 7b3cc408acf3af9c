//! Import rewrite engine.
//!
//! Takes the transpiled text of one module and retargets every
//! module-loading statement so the browser can resolve it:
//!
//! | Specifier | Rewrite |
//! |-----------|---------|
//! | relative / URL | unchanged |
//! | asset (`./logo.png`) | asset flag appended once (`./logo.png?import`) |
//! | runtime (`react`) | artifact URL, named bindings demoted to a default import |
//! | other bare | artifact URL if the cache has it ready, else [`RewriteError::Unresolved`] |
//!
//! Pre-bundled artifacts expose the package namespace as their single
//! default export, so
//!
//! ```js
//! import React, { useState as useS } from "react";
//! ```
//!
//! becomes
//!
//! ```js
//! import __flash_dep_0 from "/node_modules/.flash/deps/react.js"; const React = "default" in __flash_dep_0 ? __flash_dep_0.default : __flash_dep_0; const useS = __flash_dep_0.useState;
//! ```
//!
//! The source is parsed once and scanned into owned module references;
//! output is produced by splicing text patches into the input, so nothing
//! outside the edited statements moves and no tree is shared between passes.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ExportNamedDeclaration, Expression, ImportDeclaration, ImportDeclarationSpecifier,
    ImportExpression, ModuleExportName, Statement,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};

use crate::error::RewriteError;
use crate::specifier::{SpecifierKind, classify, dependency_key, package_name, with_asset_flag};

pub type Result<T> = std::result::Result<T, RewriteError>;

/// Read-only view of the dependency artifact store.
pub trait ArtifactLookup {
    /// Browser URL of the artifact for a dependency key. Deterministic.
    fn artifact_url(&self, key: &str) -> String;

    /// Whether the artifact for `key` is built and on disk.
    fn is_ready(&self, key: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Default,
    Named,
    Namespace,
    SideEffect,
}

/// One binding introduced by an import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub specifier: String,
    pub kind: BindingKind,
    /// Local name; `None` for side-effect-only imports
    pub local: Option<String>,
    /// Exported name on the source module, for named imports
    pub imported: Option<String>,
}

/// What happened to one module reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenImport {
    pub original: String,
    pub rewritten: String,
    pub kind: SpecifierKind,
    pub bindings: Vec<ImportBinding>,
    /// Local names bound by synthesized `const` declarations
    pub shims: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub code: String,
    /// Every reference in source order, dynamic imports last
    pub imports: Vec<RewrittenImport>,
}

impl RewriteOutcome {
    /// Whether any statement was modified.
    pub fn changed(&self) -> bool {
        self.imports
            .iter()
            .any(|import| import.original != import.rewritten || !import.shims.is_empty())
    }
}

/// Dependency keys (runtime and bare) referenced by `code`, deduplicated in
/// first-seen order. Callers build these before calling [`rewrite_imports`].
pub fn dependency_keys(code: &str) -> Result<Vec<String>> {
    let mut keys: Vec<String> = Vec::new();
    for reference in scan(code)? {
        if classify(&reference.specifier).is_dependency() {
            let key = dependency_key(&reference.specifier);
            if !keys.iter().any(|seen| seen == key) {
                keys.push(key.to_string());
            }
        }
    }
    Ok(keys)
}

/// Rewrite every module reference in `code`.
pub fn rewrite_imports(code: &str, lookup: &dyn ArtifactLookup) -> Result<RewriteOutcome> {
    let references = scan(code)?;
    let mut names = SyntheticNames::new(code);
    let mut patches = Vec::new();
    let mut imports = Vec::with_capacity(references.len());

    for reference in references {
        let kind = classify(&reference.specifier);
        let (rewritten, shims) = match kind {
            SpecifierKind::Relative
            | SpecifierKind::External
            | SpecifierKind::Asset { flagged: true } => (reference.specifier.clone(), Vec::new()),
            SpecifierKind::Asset { flagged: false } => {
                let flagged = with_asset_flag(&reference.specifier);
                patches.push(Patch::new(reference.source_span, quote(&flagged)));
                (flagged, Vec::new())
            }
            SpecifierKind::Runtime | SpecifierKind::Bare => {
                let key = dependency_key(&reference.specifier);
                if kind == SpecifierKind::Bare && !lookup.is_ready(key) {
                    return Err(RewriteError::Unresolved {
                        specifier: reference.specifier.clone(),
                        package: package_name(key).to_string(),
                    });
                }
                let url = lookup.artifact_url(key);
                let shims = retarget(&reference, &url, &mut names, &mut patches);
                (url, shims)
            }
        };

        imports.push(RewrittenImport {
            original: reference.specifier,
            rewritten,
            kind,
            bindings: reference.bindings,
            shims,
        });
    }

    Ok(RewriteOutcome {
        code: apply_patches(code, patches),
        imports,
    })
}

/// Point a dependency reference at its artifact, demoting every binding to
/// a `const` read on the artifact's default export.
fn retarget(
    reference: &ModuleReference,
    url: &str,
    names: &mut SyntheticNames,
    patches: &mut Vec<Patch>,
) -> Vec<String> {
    match &reference.form {
        ReferenceForm::Import => {
            if reference.bindings.iter().all(|binding| binding.local.is_none()) {
                patches.push(Patch::new(reference.source_span, quote(url)));
                return Vec::new();
            }

            let module = names.fresh();
            let mut text = format!("import {module} from {};", quote(url));
            let mut shims = Vec::new();
            for binding in &reference.bindings {
                let Some(local) = &binding.local else { continue };
                let value = match binding.kind {
                    BindingKind::Default => default_export(&module),
                    BindingKind::Named => member(&module, binding.imported.as_deref().unwrap_or(local)),
                    BindingKind::Namespace => module.clone(),
                    BindingKind::SideEffect => continue,
                };
                text.push_str(&format!(" const {local} = {value};"));
                shims.push(local.clone());
            }

            patches.push(Patch::new(reference.statement_span, text));
            shims
        }
        ReferenceForm::ReExport(specifiers) => {
            let module = names.fresh();
            let mut text = format!("import {module} from {};", quote(url));
            let mut exports = Vec::with_capacity(specifiers.len());
            let mut shims = Vec::new();

            for (local, exported) in specifiers {
                let temp = names.fresh();
                text.push_str(&format!(" const {temp} = {};", member(&module, local)));
                exports.push(format!("{temp} as {}", export_name(exported)));
                shims.push(temp);
            }

            text.push_str(&format!(" export {{ {} }};", exports.join(", ")));
            patches.push(Patch::new(reference.statement_span, text));
            shims
        }
        ReferenceForm::ExportAllAs(exported) => {
            let module = names.fresh();
            patches.push(Patch::new(
                reference.statement_span,
                format!(
                    "import {module} from {}; export {{ {module} as {} }};",
                    quote(url),
                    export_name(exported)
                ),
            ));
            Vec::new()
        }
        ReferenceForm::ExportAll | ReferenceForm::Dynamic => {
            patches.push(Patch::new(reference.source_span, quote(url)));
            Vec::new()
        }
    }
}

/// The package's own default export. Artifacts export the package
/// namespace; CommonJS packages surface `module.exports` as its `default`,
/// and packages without one fall back to the namespace itself.
fn default_export(module: &str) -> String {
    format!("\"default\" in {module} ? {module}.default : {module}")
}

/// Member read on the artifact's namespace.
fn member(object: &str, name: &str) -> String {
    if name == "default" {
        default_export(object)
    } else if is_identifier_name(name) {
        format!("{object}.{name}")
    } else {
        format!("{object}[{}]", quote(name))
    }
}

fn export_name(name: &str) -> String {
    if is_identifier_name(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

fn quote(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '$')
}

/// Fresh `__flash_dep_N` names that do not occur anywhere in the source.
struct SyntheticNames<'s> {
    source: &'s str,
    next: usize,
}

impl<'s> SyntheticNames<'s> {
    fn new(source: &'s str) -> Self {
        Self { source, next: 0 }
    }

    fn fresh(&mut self) -> String {
        loop {
            let name = format!("__flash_dep_{}", self.next);
            self.next += 1;
            if !self.source.contains(&name) {
                return name;
            }
        }
    }
}

#[derive(Debug)]
struct Patch {
    start: usize,
    end: usize,
    text: String,
}

impl Patch {
    fn new(span: Span, text: String) -> Self {
        Self {
            start: span.start as usize,
            end: span.end as usize,
            text,
        }
    }
}

fn apply_patches(code: &str, mut patches: Vec<Patch>) -> String {
    patches.sort_by_key(|patch| patch.start);

    let mut output = String::with_capacity(code.len() + patches.len() * 32);
    let mut cursor = 0;
    for patch in patches {
        // Spans come from one parse, so patches never overlap
        if patch.start < cursor {
            continue;
        }
        output.push_str(&code[cursor..patch.start]);
        output.push_str(&patch.text);
        cursor = patch.end;
    }
    output.push_str(&code[cursor..]);
    output
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum ReferenceForm {
    Import,
    /// `export { local as exported } from "..."`
    ReExport(Vec<(String, String)>),
    ExportAll,
    /// `export * as exported from "..."`
    ExportAllAs(String),
    Dynamic,
}

#[derive(Debug)]
struct ModuleReference {
    specifier: String,
    source_span: Span,
    statement_span: Span,
    form: ReferenceForm,
    bindings: Vec<ImportBinding>,
}

fn scan(code: &str) -> Result<Vec<ModuleReference>> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, code, SourceType::mjs()).parse();
    if !parsed.errors.is_empty() {
        let message = parsed
            .errors
            .iter()
            .map(|error| error.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(RewriteError::Parse(message));
    }

    let program = parsed.program;
    let mut references = Vec::new();

    for statement in &program.body {
        match statement {
            Statement::ImportDeclaration(decl) => references.push(import_reference(decl)),
            Statement::ExportNamedDeclaration(decl) => {
                if let Some(reference) = re_export_reference(decl) {
                    references.push(reference);
                }
            }
            Statement::ExportAllDeclaration(decl) => references.push(ModuleReference {
                specifier: decl.source.value.to_string(),
                source_span: decl.source.span,
                statement_span: decl.span,
                form: match &decl.exported {
                    Some(exported) => ReferenceForm::ExportAllAs(export_name_text(exported)),
                    None => ReferenceForm::ExportAll,
                },
                bindings: Vec::new(),
            }),
            _ => {}
        }
    }

    let mut dynamic = DynamicImports::default();
    dynamic.visit_program(&program);
    references.extend(dynamic.references);

    Ok(references)
}

fn import_reference(decl: &ImportDeclaration<'_>) -> ModuleReference {
    let specifier = decl.source.value.to_string();

    let bindings = match &decl.specifiers {
        Some(specifiers) if !specifiers.is_empty() => specifiers
            .iter()
            .map(|item| match item {
                ImportDeclarationSpecifier::ImportSpecifier(named) => ImportBinding {
                    specifier: specifier.clone(),
                    kind: BindingKind::Named,
                    local: Some(named.local.name.to_string()),
                    imported: Some(export_name_text(&named.imported)),
                },
                ImportDeclarationSpecifier::ImportDefaultSpecifier(default) => ImportBinding {
                    specifier: specifier.clone(),
                    kind: BindingKind::Default,
                    local: Some(default.local.name.to_string()),
                    imported: None,
                },
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(namespace) => ImportBinding {
                    specifier: specifier.clone(),
                    kind: BindingKind::Namespace,
                    local: Some(namespace.local.name.to_string()),
                    imported: None,
                },
            })
            .collect(),
        _ => vec![ImportBinding {
            specifier: specifier.clone(),
            kind: BindingKind::SideEffect,
            local: None,
            imported: None,
        }],
    };

    ModuleReference {
        specifier,
        source_span: decl.source.span,
        statement_span: decl.span,
        form: ReferenceForm::Import,
        bindings,
    }
}

fn re_export_reference(decl: &ExportNamedDeclaration<'_>) -> Option<ModuleReference> {
    let source = decl.source.as_ref()?;
    let specifiers = decl
        .specifiers
        .iter()
        .map(|item| (export_name_text(&item.local), export_name_text(&item.exported)))
        .collect();

    Some(ModuleReference {
        specifier: source.value.to_string(),
        source_span: source.span,
        statement_span: decl.span,
        form: ReferenceForm::ReExport(specifiers),
        bindings: Vec::new(),
    })
}

fn export_name_text(name: &ModuleExportName<'_>) -> String {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
        ModuleExportName::IdentifierReference(ident) => ident.name.to_string(),
        ModuleExportName::StringLiteral(literal) => literal.value.to_string(),
    }
}

/// Collects `import("literal")` expressions anywhere in the program.
#[derive(Default)]
struct DynamicImports {
    references: Vec<ModuleReference>,
}

impl<'a> Visit<'a> for DynamicImports {
    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Expression::StringLiteral(literal) = &expr.source {
            self.references.push(ModuleReference {
                specifier: literal.value.to_string(),
                source_span: literal.span,
                statement_span: expr.span,
                form: ReferenceForm::Dynamic,
                bindings: Vec::new(),
            });
        }
        walk::walk_import_expression(self, expr);
    }
}
