//! Per-file semantic model for C#: resolves member accesses to method
//! signatures and evaluates string literal constants.
//!
//! Resolution only knows what the file declares plus the referenced library
//! metadata in [`symbols`](super::symbols); anything else does not resolve.

use std::collections::HashMap;

use super::literals::string_literal_value;
use super::symbols::{display_type_name, library_type, select_overload, MethodSymbol};
use super::validator::SemanticModel;
use super::{argument_expressions, find_child_by_field, method_name_of, node_text, type_argument_count};

/// Nodes that bound the visibility of the names declared inside them.
const SCOPE_KINDS: &[&str] = &[
    "block", "switch_section", "for_statement", "foreach_statement", "using_statement",
    "fixed_statement", "catch_clause", "lambda_expression", "anonymous_method_expression",
    "local_function_statement", "method_declaration", "constructor_declaration",
    "destructor_declaration", "operator_declaration", "conversion_operator_declaration",
    "indexer_declaration", "accessor_declaration", "class_declaration", "struct_declaration",
    "interface_declaration", "record_declaration", "record_struct_declaration",
];

const TYPE_DECLARATION_KINDS: &[&str] = &[
    "class_declaration", "struct_declaration", "interface_declaration",
    "record_declaration", "record_struct_declaration", "enum_declaration",
];

/// A namespace declaration body and the byte range it covers.
#[derive(Debug, Clone)]
struct NamespaceScope {
    start: usize,
    end: usize,
    /// Full name, outer declarations included
    name: String,
    /// Enclosing namespace declaration, by index
    parent: Option<usize>,
}

/// A type declaration and the byte range it covers.
#[derive(Debug, Clone)]
struct TypeScope {
    start: usize,
    end: usize,
    full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UsingKind {
    /// `using A.B;` (including `global using`)
    Import(String),
    /// `using X = A.B.C;`
    Alias { alias: String, target: String },
}

/// A using directive and the namespace declaration it sits in (`None` = file level).
#[derive(Debug, Clone)]
struct UsingDirective {
    scope: Option<usize>,
    kind: UsingKind,
}

/// A local, parameter, field or property name and where it is visible.
#[derive(Debug, Clone)]
struct VariableScope {
    name: String,
    start: usize,
    end: usize,
    /// Last segment of the declared type, if written out (`var` has none)
    type_name: Option<String>,
}

/// Outcome of looking a receiver up through the using directives of one declaration.
enum DirectiveLookup {
    Resolved(String),
    /// Bound by a directive but not to a type, or ambiguous between imports
    Unresolved,
    NotFound,
}

#[derive(Debug)]
pub struct CSharpSemanticModel<'s> {
    source: &'s [u8],
    usings: Vec<UsingDirective>,
    namespaces: Vec<NamespaceScope>,
    type_scopes: Vec<TypeScope>,
    /// Full type name → methods declared in the file
    types: HashMap<String, Vec<MethodSymbol>>,
    variables: Vec<VariableScope>,
}

impl<'s> CSharpSemanticModel<'s> {
    pub fn build(root: tree_sitter::Node, source: &'s [u8]) -> Self {
        let mut model = CSharpSemanticModel {
            source,
            usings: Vec::new(),
            namespaces: Vec::new(),
            type_scopes: Vec::new(),
            types: HashMap::new(),
            variables: Vec::new(),
        };
        model.collect(root, None);
        model
    }

    // ─── Collection ──────────────────────────────────────────────────

    fn collect(&mut self, node: tree_sitter::Node, container: Option<&str>) {
        match node.kind() {
            "using_directive" => {
                self.collect_using(node);
                return;
            }
            "namespace_declaration" | "file_scoped_namespace_declaration" => {
                let parent = self.innermost_namespace(node.start_byte());
                let name = find_child_by_field(node, "name")
                    .map(|n| compact(node_text(n, self.source)))
                    .unwrap_or_default();
                let outer = parent.map_or("", |p| self.namespaces[p].name.as_str());
                let full = join_name(outer, &name);
                let end = if node.kind() == "file_scoped_namespace_declaration" {
                    // Applies to the rest of the file, siblings included
                    node.parent().map_or(node.end_byte(), |p| p.end_byte())
                } else {
                    node.end_byte()
                };
                self.namespaces.push(NamespaceScope { start: node.start_byte(), end, name: full, parent });
            }
            kind if TYPE_DECLARATION_KINDS.contains(&kind) => {
                if let Some(name_node) = find_child_by_field(node, "name") {
                    let name = node_text(name_node, self.source);
                    let outer = container.map_or_else(|| self.namespace_at(node.start_byte()), str::to_string);
                    let full = join_name(&outer, name);
                    self.types.entry(full.clone()).or_default();
                    self.type_scopes.push(TypeScope { start: node.start_byte(), end: node.end_byte(), full_name: full.clone() });
                    for i in 0..node.child_count() {
                        if let Some(child) = node.child(i) {
                            self.collect(child, Some(&full));
                        }
                    }
                    return;
                }
            }
            "method_declaration" => {
                if let (Some(type_name), Some(method)) = (container, self.method_symbol(node)) {
                    self.types.entry(type_name.to_string()).or_default().push(method);
                }
            }
            "variable_declarator" => {
                let type_node = node.parent().and_then(|decl| find_child_by_field(decl, "type"));
                self.declare_variable(node, type_node, declaration_scope(node));
            }
            "parameter" | "property_declaration" | "catch_declaration"
            | "declaration_expression" | "declaration_pattern" => {
                self.declare_variable(node, find_child_by_field(node, "type"), declaration_scope(node));
            }
            "foreach_statement" => {
                if let Some(left) = find_child_by_field(node, "left") {
                    if left.kind() == "identifier" {
                        let type_name = find_child_by_field(node, "type").and_then(|t| self.declared_type_name(t));
                        self.variables.push(VariableScope {
                            name: node_text(left, self.source).to_string(),
                            start: node.start_byte(),
                            end: node.end_byte(),
                            type_name,
                        });
                    }
                }
            }
            "implicit_parameter" => {
                let scope = declaration_scope(node);
                self.variables.push(VariableScope {
                    name: node_text(node, self.source).to_string(),
                    start: scope.start_byte(),
                    end: scope.end_byte(),
                    type_name: None,
                });
            }
            _ => {}
        }

        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                self.collect(child, container);
            }
        }
    }

    fn declare_variable(&mut self, node: tree_sitter::Node, type_node: Option<tree_sitter::Node>, scope: tree_sitter::Node) {
        let Some(name) = find_child_by_field(node, "name").or_else(|| find_identifier_child(node)) else {
            return;
        };
        let type_name = type_node.and_then(|t| self.declared_type_name(t));
        self.variables.push(VariableScope {
            name: node_text(name, self.source).to_string(),
            start: scope.start_byte(),
            end: scope.end_byte(),
            type_name,
        });
    }

    /// `Newtonsoft.Json.Linq.JObject?` → `JObject`; `var` → `None`.
    fn declared_type_name(&self, type_node: tree_sitter::Node) -> Option<String> {
        let text = compact(node_text(type_node, self.source));
        let head = text.split(['<', '[', '?']).next().unwrap_or("");
        let last = head.rsplit(['.', ':']).next().unwrap_or(head);
        (!last.is_empty() && last != "var").then(|| last.to_string())
    }

    fn collect_using(&mut self, node: tree_sitter::Node) {
        let text = node_text(node, self.source);
        let text = text.trim().trim_end_matches(';').trim();
        let text = text.strip_prefix("global").map(str::trim_start).unwrap_or(text);
        let Some(rest) = text.strip_prefix("using") else {
            return;
        };
        let rest = rest.trim();
        // `using static` brings members, not types, into scope
        if rest.starts_with("static ") || rest.is_empty() {
            return;
        }
        let kind = match rest.split_once('=') {
            Some((alias, target)) => UsingKind::Alias { alias: compact(alias), target: strip_global(&compact(target)) },
            None => UsingKind::Import(strip_global(&compact(rest))),
        };
        let scope = self.innermost_namespace(node.start_byte());
        self.usings.push(UsingDirective { scope, kind });
    }

    fn method_symbol(&self, node: tree_sitter::Node) -> Option<MethodSymbol> {
        let name = node_text(find_child_by_field(node, "name")?, self.source).to_string();

        let type_params = find_child_by_field(node, "type_parameters")
            .map(|list| {
                let mut names = Vec::new();
                for i in 0..list.named_child_count() {
                    if let Some(tp) = list.named_child(i) {
                        if tp.kind() == "type_parameter" {
                            let id = find_child_by_field(tp, "name").or_else(|| find_identifier_child(tp)).unwrap_or(tp);
                            names.push(node_text(id, self.source).to_string());
                        }
                    }
                }
                names
            })
            .unwrap_or_default();

        let mut params = Vec::new();
        if let Some(list) = find_child_by_field(node, "parameters") {
            // A `params` array is either its own node or a bare keyword + type in the list
            let mut after_params_keyword = false;
            for i in 0..list.child_count() {
                let Some(child) = list.child(i) else { continue };
                match child.kind() {
                    "params" => after_params_keyword = true,
                    "parameter" | "parameter_array" => {
                        let Some(type_node) = find_child_by_field(child, "type") else { continue };
                        let ty = display_type_name(node_text(type_node, self.source));
                        let is_params = after_params_keyword
                            || child.kind() == "parameter_array"
                            || node_text(child, self.source).trim_start().starts_with("params ");
                        params.push(if is_params { format!("params {}", ty) } else { ty });
                        after_params_keyword = false;
                    }
                    "array_type" | "nullable_type" if after_params_keyword => {
                        params.push(format!("params {}", display_type_name(node_text(child, self.source))));
                        after_params_keyword = false;
                    }
                    _ => {}
                }
            }
        }

        Some(MethodSymbol { name, type_params, params })
    }

    // ─── Lookup ──────────────────────────────────────────────────────

    /// Index of the innermost namespace declaration containing `byte`.
    fn innermost_namespace(&self, byte: usize) -> Option<usize> {
        self.namespaces.iter()
            .enumerate()
            .filter(|(_, ns)| ns.start <= byte && byte < ns.end)
            .max_by_key(|(_, ns)| ns.start)
            .map(|(i, _)| i)
    }

    fn namespace_at(&self, byte: usize) -> String {
        self.innermost_namespace(byte)
            .map(|i| self.namespaces[i].name.clone())
            .unwrap_or_default()
    }

    /// Type declarations containing `byte`, innermost first.
    fn enclosing_types(&self, byte: usize) -> Vec<&TypeScope> {
        let mut scopes: Vec<&TypeScope> = self.type_scopes.iter()
            .filter(|t| t.start <= byte && byte < t.end)
            .collect();
        scopes.sort_by(|a, b| b.start.cmp(&a.start));
        scopes
    }

    /// True if `name` at `byte` denotes a variable rather than a type. A variable
    /// whose declared type has the same name (`JObject JObject`) still lets the
    /// type be named through it.
    fn is_variable_at(&self, name: &str, byte: usize) -> bool {
        self.variables.iter()
            .filter(|v| v.name == name && v.start <= byte && byte < v.end)
            .any(|v| v.type_name.as_deref() != Some(name))
    }

    fn type_exists(&self, full_name: &str) -> bool {
        self.types.contains_key(full_name) || library_type(full_name).is_some()
    }

    fn methods_of(&self, full_name: &str, method: &str) -> Vec<MethodSymbol> {
        if let Some(methods) = self.types.get(full_name) {
            return methods.iter().filter(|m| m.name == method).cloned().collect();
        }
        library_type(full_name).map(|t| t.methods_named(method)).unwrap_or_default()
    }

    fn type_in(&self, namespace: &str, receiver: &str) -> Option<String> {
        let candidate = join_name(namespace, receiver);
        self.type_exists(&candidate).then_some(candidate)
    }

    /// Resolve `receiver` through the aliases and imports of one namespace declaration.
    fn lookup_directives(&self, scope: Option<usize>, first: &str, receiver: &str) -> DirectiveLookup {
        let directives = self.usings.iter().filter(|u| u.scope == scope);

        for directive in directives.clone() {
            if let UsingKind::Alias { alias, target } = &directive.kind {
                if alias == first {
                    let full = join_name(target, receiver.split_once('.').map_or("", |(_, rest)| rest));
                    return if self.type_exists(&full) {
                        DirectiveLookup::Resolved(full)
                    } else {
                        DirectiveLookup::Unresolved
                    };
                }
            }
        }

        let mut heads: Vec<&str> = directives
            .filter_map(|u| match &u.kind {
                UsingKind::Import(namespace) => Some(namespace.as_str()),
                UsingKind::Alias { .. } => None,
            })
            .filter(|namespace| self.type_exists(&join_name(namespace, first)))
            .collect();
        heads.sort_unstable();
        heads.dedup();
        match heads.as_slice() {
            [] => DirectiveLookup::NotFound,
            [namespace] => match self.type_in(namespace, receiver) {
                Some(full) => DirectiveLookup::Resolved(full),
                None => DirectiveLookup::Unresolved,
            },
            _ => DirectiveLookup::Unresolved,
        }
    }

    /// Resolve a dotted receiver to a full type name, following C# lookup order:
    /// types nested in the enclosing types, then each enclosing namespace
    /// (its members, then its using directives) from the innermost outwards.
    pub(crate) fn resolve_type(&self, receiver: &str, at_byte: usize) -> Option<String> {
        if let Some(absolute) = receiver.strip_prefix("global::") {
            return self.type_exists(absolute).then(|| absolute.to_string());
        }

        let first = receiver.split('.').next()?;
        if self.is_variable_at(first, at_byte) {
            return None;
        }

        for enclosing in self.enclosing_types(at_byte) {
            if self.types.contains_key(&join_name(&enclosing.full_name, first)) {
                return self.type_in(&enclosing.full_name, receiver);
            }
        }

        let mut scope = self.innermost_namespace(at_byte);
        loop {
            let name = scope.map_or("", |i| self.namespaces[i].name.as_str());
            if let Some(found) = self.type_in(name, receiver) {
                return Some(found);
            }
            match self.lookup_directives(scope, first, receiver) {
                DirectiveLookup::Resolved(full) => return Some(full),
                DirectiveLookup::Unresolved => return None,
                DirectiveLookup::NotFound => {}
            }

            let index = scope?;
            let parent = self.namespaces[index].parent;
            let parent_name = parent.map_or("", |p| self.namespaces[p].name.as_str());
            // `namespace A.B` also declares `A`, which has no directives of its own
            let mut level = name;
            while let Some(pos) = level.rfind('.') {
                level = &level[..pos];
                if level.len() <= parent_name.len() {
                    break;
                }
                if let Some(found) = self.type_in(level, receiver) {
                    return Some(found);
                }
            }
            scope = parent;
        }
    }
}

impl SemanticModel for CSharpSemanticModel<'_> {
    fn resolve_member_signature(
        &self,
        member_access: tree_sitter::Node,
        invocation: tree_sitter::Node,
    ) -> Option<String> {
        let name_node = find_child_by_field(member_access, "name")?;
        let receiver = find_child_by_field(member_access, "expression").or_else(|| member_access.child(0))?;
        let path = receiver_path(node_text(receiver, self.source))?;

        let type_name = self.resolve_type(&path, member_access.start_byte())?;
        let method = method_name_of(name_node, self.source);
        let candidates = self.methods_of(&type_name, &method);
        let arg_count = argument_expressions(invocation).len();
        let resolved = select_overload(candidates, type_argument_count(name_node), arg_count)?;
        Some(resolved.signature(&type_name))
    }

    fn constant_string(&self, literal: tree_sitter::Node) -> Option<String> {
        string_literal_value(node_text(literal, self.source))
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

/// Normalize a receiver expression to a dotted name, keeping a leading
/// `global::`. Anything that is not a plain (qualified) name yields `None`.
pub(crate) fn receiver_path(text: &str) -> Option<String> {
    let compacted = compact(text);
    let (global, rest) = match compacted.strip_prefix("global::") {
        Some(rest) => (true, rest),
        None => (false, compacted.as_str()),
    };

    let mut segments = Vec::new();
    for segment in rest.split('.') {
        let segment = segment.strip_prefix('@').unwrap_or(segment);
        let mut chars = segment.chars();
        let valid_start = chars.next().is_some_and(|c| c.is_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_alphanumeric() || c == '_') {
            return None;
        }
        segments.push(segment);
    }
    let path = segments.join(".");
    Some(if global { format!("global::{}", path) } else { path })
}

/// Nearest ancestor that bounds the visibility of a declaration at `node`.
fn declaration_scope(node: tree_sitter::Node) -> tree_sitter::Node {
    let mut current = node;
    while let Some(parent) = current.parent() {
        if SCOPE_KINDS.contains(&parent.kind()) {
            return parent;
        }
        current = parent;
    }
    current
}

fn compact(text: &str) -> String {
    text.split_whitespace().collect()
}

fn strip_global(name: &str) -> String {
    name.strip_prefix("global::").unwrap_or(name).to_string()
}

fn join_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        prefix.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn find_identifier_child(node: tree_sitter::Node) -> Option<tree_sitter::Node> {
    (0..node.named_child_count())
        .filter_map(|i| node.named_child(i))
        .find(|c| c.kind() == "identifier")
}

#[cfg(test)]
#[path = "semantic_tests.rs"]
mod tests;
