//! Call-site validator: matches invocations against the signature catalog and
//! checks that their string literal argument is well-formed JSON.

use std::cell::OnceCell;
use std::fmt;

use serde::de::{Deserialize, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::catalog::{entries_named, SignatureEntry};
use crate::diagnostic::{Diagnostic, DiagnosticSink, Location, Rule};

use super::literals::is_string_literal_kind;
use super::{argument_expressions, find_child_by_field, method_name_of, node_text};

/// Reported when the JSON parser fails without any message text.
pub const GENERIC_PARSE_FAILURE: &str = "Invalid JSON literal";

/// Symbol and constant services of the host, scoped to one source file.
pub trait SemanticModel {
    /// Full signature of the declaration `member_access` resolves to when
    /// invoked by `invocation`, or `None` if it does not resolve.
    fn resolve_member_signature(
        &self,
        member_access: tree_sitter::Node,
        invocation: tree_sitter::Node,
    ) -> Option<String>;

    /// Compile-time string value of a literal node.
    fn constant_string(&self, literal: tree_sitter::Node) -> Option<String>;
}

/// Per-file inputs shared by every call site the validator visits.
pub struct AnalysisContext<'a, M: ?Sized> {
    pub path: &'a str,
    pub source: &'a [u8],
    pub model: &'a M,
    pub cancel: &'a CancellationToken,
}

/// Stateless validator over a signature catalog.
#[derive(Debug, Clone, Copy)]
pub struct CallSiteValidator<'c> {
    catalog: &'c [SignatureEntry],
    rule: &'c Rule,
}

impl<'c> CallSiteValidator<'c> {
    pub fn new(catalog: &'c [SignatureEntry], rule: &'c Rule) -> Self {
        CallSiteValidator { catalog, rule }
    }

    /// Check one `invocation_expression` node. Call sites that are not targets
    /// of the check are skipped silently.
    pub fn check_invocation<M, S>(
        &self,
        invocation: tree_sitter::Node,
        ctx: &AnalysisContext<'_, M>,
        sink: &mut S,
    ) where
        M: SemanticModel + ?Sized,
        S: DiagnosticSink + ?Sized,
    {
        let Some(callee) = find_child_by_field(invocation, "function").or_else(|| invocation.child(0)) else {
            return;
        };
        if callee.kind() != "member_access_expression" {
            return;
        }
        let Some(name_node) = find_child_by_field(callee, "name") else {
            return;
        };
        let member_name = method_name_of(name_node, ctx.source);

        // Resolved at most once, and only if some entry matches by name
        let resolved: OnceCell<Option<String>> = OnceCell::new();

        for entry in entries_named(self.catalog, &member_name) {
            if ctx.cancel.is_cancelled() {
                return;
            }

            let signature = resolved.get_or_init(|| ctx.model.resolve_member_signature(callee, invocation));
            if signature.as_deref() != Some(entry.full_signature) {
                continue;
            }

            let args = argument_expressions(invocation);
            let [literal] = args.as_slice() else {
                continue;
            };
            if !is_string_literal_kind(literal.kind()) {
                continue;
            }

            if ctx.cancel.is_cancelled() {
                return;
            }
            let Some(json) = ctx.model.constant_string(*literal) else {
                debug!(path = ctx.path, literal = node_text(*literal, ctx.source), "literal has no constant string value");
                continue;
            };

            if ctx.cancel.is_cancelled() {
                return;
            }
            if let Err(message) = validate_json(&json) {
                let location = Location::of_node(ctx.path, *literal, ctx.source);
                debug!(path = ctx.path, line = location.line, signature = entry.full_signature, "invalid JSON literal");
                sink.report(Diagnostic::new(self.rule, location, message));
            }
        }
    }
}

/// Parse `json` as a JSON document rooted at an object or an array; on failure
/// return the parser's own message.
pub fn validate_json(json: &str) -> Result<(), String> {
    match serde_json::from_str::<JsonDocument>(json) {
        Ok(JsonDocument) => Ok(()),
        Err(e) => {
            let message = e.to_string();
            if message.trim().is_empty() {
                Err(GENERIC_PARSE_FAILURE.to_string())
            } else {
                Err(message)
            }
        }
    }
}

/// An object- or array-rooted document. Contents are syntax-checked and discarded;
/// scalar roots fail with serde_json's `invalid type` error.
struct JsonDocument;

impl<'de> Deserialize<'de> for JsonDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(JsonDocumentVisitor)
    }
}

struct JsonDocumentVisitor;

impl<'de> Visitor<'de> for JsonDocumentVisitor {
    type Value = JsonDocument;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object or array")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<JsonDocument, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(JsonDocument)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<JsonDocument, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(JsonDocument)
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
