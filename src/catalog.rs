//! Catalog of the JSON-parsing APIs whose string literal arguments are validated.

/// One API targeted by the check.
///
/// `member_name` is the unqualified name seen at the call site and acts as a
/// cheap pre-filter; `full_signature` identifies exactly one overload and is
/// compared against the resolved callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureEntry {
    pub member_name: &'static str,
    pub full_signature: &'static str,
}

/// Every API the check cares about.
pub static CATALOG: &[SignatureEntry] = &[
    SignatureEntry {
        member_name: "DeserializeObject",
        full_signature: "Newtonsoft.Json.JsonConvert.DeserializeObject<T>(string)",
    },
    SignatureEntry {
        member_name: "Parse",
        full_signature: "Newtonsoft.Json.Linq.JObject.Parse(string)",
    },
    SignatureEntry {
        member_name: "Parse",
        full_signature: "Newtonsoft.Json.Linq.JArray.Parse(string)",
    },
];

/// Entries of `catalog` whose member name equals `name`.
pub fn entries_named<'a>(
    catalog: &'a [SignatureEntry],
    name: &'a str,
) -> impl Iterator<Item = &'a SignatureEntry> + 'a {
    catalog.iter().filter(move |e| e.member_name == name)
}
