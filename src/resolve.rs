//! Import resolution policy for per-workspace builds
//!
//! Every import seen while bundling one workspace is classified into one of
//! three outcomes: inline it (default bundling), leave it external as written,
//! or rewrite it to point at a sibling workspace's already-compiled output.
//!
//! Relative imports between source files are rewritten to carry the output
//! extension and left external, so each workspace bundle stays self-contained
//! and sibling bundles are resolved at run time by the host module loader.
//! Inlining them instead would either force one monolithic bundle or re-bundle
//! every transitive sibling on each build.

/// How an import was encountered by the bundler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// The file is the root of a bundle
    EntryPoint,
    /// A static or dynamic import inside a module
    Import,
}

/// One resolution call: the specifier as written, how it was imported, and the
/// output extension convention in effect
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub specifier: &'a str,
    pub kind: ImportKind,
    pub out_extension: &'a str,
}

/// Decision for a single import
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Let default bundling proceed (the import is inlined)
    Continue,
    /// Keep the import external, specifier unchanged
    ExternalAsIs(String),
    /// Keep the import external, specifier rewritten with the output extension
    ExternalRewritten(String),
}

/// Classify a single import.
///
/// Entry points are always bundled. Non-relative specifiers name packages (or
/// protocol-prefixed resources) and are externalized unchanged; the runtime
/// module loader resolves them. A relative specifier already carrying the
/// output extension is presumed to reference compiled output and passes
/// through unchanged, which also makes rewriting idempotent. Anything else
/// relative gets the output extension appended and is left external.
pub fn resolve(ctx: &ResolveContext) -> Resolution {
    if ctx.kind == ImportKind::EntryPoint {
        return Resolution::Continue;
    }
    // Bare package names, node:/data: URLs and the like never name a sibling
    // source file.
    if !ctx.specifier.starts_with('.') {
        return Resolution::ExternalAsIs(ctx.specifier.to_string());
    }
    // A query string means the import is asking the bundler/loader for
    // something other than a compileable sibling (e.g. ?raw). Same treatment
    // as a package specifier.
    if ctx.specifier.contains('?') {
        return Resolution::ExternalAsIs(ctx.specifier.to_string());
    }
    if ctx.specifier.ends_with(ctx.out_extension) {
        return Resolution::ExternalAsIs(ctx.specifier.to_string());
    }
    Resolution::ExternalRewritten(format!("{}{}", ctx.specifier, ctx.out_extension))
}
