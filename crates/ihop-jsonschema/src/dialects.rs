use jsonschema::Draft;

pub const DIALECT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";
pub const DIALECT_2019_09: &str = "https://json-schema.org/draft/2019-09/schema";
pub const DIALECT_DRAFT7: &str = "http://json-schema.org/draft-07/schema#";
pub const DIALECT_DRAFT6: &str = "http://json-schema.org/draft-06/schema#";
pub const DIALECT_DRAFT4: &str = "http://json-schema.org/draft-04/schema#";

/// Dialect URIs advertised on `start`, newest first, with the draft each maps to.
pub const SUPPORTED_DIALECTS: &[(&str, Draft)] = &[
    (DIALECT_2020_12, Draft::Draft202012),
    (DIALECT_2019_09, Draft::Draft201909),
    (DIALECT_DRAFT7, Draft::Draft7),
    (DIALECT_DRAFT6, Draft::Draft6),
    (DIALECT_DRAFT4, Draft::Draft4),
];

pub fn draft_for_dialect(dialect: &str) -> Option<Draft> {
    SUPPORTED_DIALECTS
        .iter()
        .find(|(uri, _)| *uri == dialect)
        .map(|(_, draft)| *draft)
}

pub fn supported_dialect_uris() -> Vec<String> {
    SUPPORTED_DIALECTS
        .iter()
        .map(|(uri, _)| (*uri).to_string())
        .collect()
}
