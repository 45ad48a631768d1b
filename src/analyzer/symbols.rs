//! Method symbols, overload selection, and metadata for the referenced Newtonsoft.Json types.

// ─── Method symbols ──────────────────────────────────────────────────

/// A method declaration, either from the analyzed file or from library metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MethodSymbol {
    pub name: String,
    pub type_params: Vec<String>,
    /// Parameter types in C# display form; a trailing `params` array keeps its
    /// modifier (`params Newtonsoft.Json.JsonConverter[]`).
    pub params: Vec<String>,
}

impl MethodSymbol {
    fn has_params_array(&self) -> bool {
        self.params.last().is_some_and(|p| p.starts_with("params "))
    }

    /// True if every type parameter can be inferred from the arguments.
    fn type_params_inferable(&self) -> bool {
        self.type_params.iter().all(|tp| self.params.iter().any(|p| mentions_identifier(p, tp)))
    }

    /// Display form of the declaration, e.g.
    /// `Newtonsoft.Json.JsonConvert.DeserializeObject<T>(string)`.
    pub fn signature(&self, container: &str) -> String {
        let mut sig = format!("{}.{}", container, self.name);
        if !self.type_params.is_empty() {
            sig.push('<');
            sig.push_str(&self.type_params.join(", "));
            sig.push('>');
        }
        sig.push('(');
        sig.push_str(&self.params.join(", "));
        sig.push(')');
        sig
    }
}

fn mentions_identifier(haystack: &str, ident: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .any(|tok| tok == ident)
}

/// Pick the overload a call binds to, or `None` when nothing or more than one fits.
///
/// Explicit type arguments must match the type-parameter count; without them
/// only methods whose type parameters are inferable from the parameters remain.
/// Normal-form arity matches win over `params` expansions.
pub(crate) fn select_overload(
    candidates: Vec<MethodSymbol>,
    type_arg_count: usize,
    arg_count: usize,
) -> Option<MethodSymbol> {
    let eligible: Vec<MethodSymbol> = candidates.into_iter()
        .filter(|m| if type_arg_count > 0 {
            m.type_params.len() == type_arg_count
        } else {
            m.type_params_inferable()
        })
        .collect();

    let exact: Vec<&MethodSymbol> = eligible.iter()
        .filter(|m| m.params.len() == arg_count)
        .collect();
    match exact.len() {
        1 => return Some(exact[0].clone()),
        0 => {}
        _ => return None,
    }

    let expanded: Vec<&MethodSymbol> = eligible.iter()
        .filter(|m| m.has_params_array() && arg_count + 1 >= m.params.len())
        .collect();
    if expanded.len() == 1 {
        Some(expanded[0].clone())
    } else {
        None
    }
}

// ─── Type names ──────────────────────────────────────────────────────

/// Normalize a type as written in source to its display form: whitespace
/// removed (except after commas) and framework names shown as C# keywords.
pub(crate) fn display_type_name(written: &str) -> String {
    let compact: String = written.split_whitespace().collect::<Vec<_>>().join("");
    let compact = compact.strip_prefix("global::").unwrap_or(&compact).to_string();

    // Split at the first generic/array/nullable suffix so only the head is aliased
    let head_end = compact.find(['<', '[', '?']).unwrap_or(compact.len());
    let (head, tail) = compact.split_at(head_end);
    let head = match head {
        "System.String" | "String" => "string",
        "System.Object" | "Object" => "object",
        "System.Int32" | "Int32" => "int",
        "System.Int64" | "Int64" => "long",
        "System.Boolean" | "Boolean" => "bool",
        "System.Double" | "Double" => "double",
        "System.Decimal" | "Decimal" => "decimal",
        "System.Char" | "Char" => "char",
        "System.Byte" | "Byte" => "byte",
        other => other,
    };
    format!("{}{}", head, tail.replace(',', ", "))
}

// ─── Library metadata ────────────────────────────────────────────────

/// A referenced library type and the static methods it exposes.
pub(crate) struct LibraryType {
    pub full_name: &'static str,
    methods: &'static [LibraryMethod],
}

struct LibraryMethod {
    name: &'static str,
    type_params: &'static [&'static str],
    params: &'static [&'static str],
}

impl LibraryType {
    pub fn methods_named(&self, name: &str) -> Vec<MethodSymbol> {
        self.methods.iter()
            .filter(|m| m.name == name)
            .map(|m| MethodSymbol {
                name: m.name.to_string(),
                type_params: m.type_params.iter().map(|s| s.to_string()).collect(),
                params: m.params.iter().map(|s| s.to_string()).collect(),
            })
            .collect()
    }
}

const fn method(
    name: &'static str,
    type_params: &'static [&'static str],
    params: &'static [&'static str],
) -> LibraryMethod {
    LibraryMethod { name, type_params, params }
}

const JSON_CONVERTERS: &str = "params Newtonsoft.Json.JsonConverter[]";
const SERIALIZER_SETTINGS: &str = "Newtonsoft.Json.JsonSerializerSettings";
const LOAD_SETTINGS: &str = "Newtonsoft.Json.Linq.JsonLoadSettings";
const JSON_READER: &str = "Newtonsoft.Json.JsonReader";

static LIBRARY: &[LibraryType] = &[
    LibraryType {
        full_name: "Newtonsoft.Json.JsonConvert",
        methods: &[
            method("SerializeObject", &[], &["object"]),
            method("SerializeObject", &[], &["object", "Newtonsoft.Json.Formatting"]),
            method("SerializeObject", &[], &["object", JSON_CONVERTERS]),
            method("SerializeObject", &[], &["object", SERIALIZER_SETTINGS]),
            method("DeserializeObject", &[], &["string"]),
            method("DeserializeObject", &[], &["string", SERIALIZER_SETTINGS]),
            method("DeserializeObject", &[], &["string", "System.Type"]),
            method("DeserializeObject", &[], &["string", "System.Type", JSON_CONVERTERS]),
            method("DeserializeObject", &[], &["string", "System.Type", SERIALIZER_SETTINGS]),
            method("DeserializeObject", &["T"], &["string"]),
            method("DeserializeObject", &["T"], &["string", JSON_CONVERTERS]),
            method("DeserializeObject", &["T"], &["string", SERIALIZER_SETTINGS]),
            method("DeserializeAnonymousType", &["T"], &["string", "T"]),
            method("DeserializeAnonymousType", &["T"], &["string", "T", SERIALIZER_SETTINGS]),
            method("PopulateObject", &[], &["string", "object"]),
            method("PopulateObject", &[], &["string", "object", SERIALIZER_SETTINGS]),
        ],
    },
    LibraryType {
        full_name: "Newtonsoft.Json.Linq.JObject",
        methods: &[
            method("Parse", &[], &["string"]),
            method("Parse", &[], &["string", LOAD_SETTINGS]),
            method("FromObject", &[], &["object"]),
            method("FromObject", &[], &["object", "Newtonsoft.Json.JsonSerializer"]),
            method("Load", &[], &[JSON_READER]),
            method("Load", &[], &[JSON_READER, LOAD_SETTINGS]),
        ],
    },
    LibraryType {
        full_name: "Newtonsoft.Json.Linq.JArray",
        methods: &[
            method("Parse", &[], &["string"]),
            method("Parse", &[], &["string", LOAD_SETTINGS]),
            method("FromObject", &[], &["object"]),
            method("FromObject", &[], &["object", "Newtonsoft.Json.JsonSerializer"]),
            method("Load", &[], &[JSON_READER]),
            method("Load", &[], &[JSON_READER, LOAD_SETTINGS]),
        ],
    },
    LibraryType {
        full_name: "Newtonsoft.Json.Linq.JToken",
        methods: &[
            method("Parse", &[], &["string"]),
            method("Parse", &[], &["string", LOAD_SETTINGS]),
            method("FromObject", &[], &["object"]),
            method("Load", &[], &[JSON_READER]),
            method("ReadFrom", &[], &[JSON_READER]),
        ],
    },
];

pub(crate) fn library_type(full_name: &str) -> Option<&'static LibraryType> {
    LIBRARY.iter().find(|t| t.full_name == full_name)
}
