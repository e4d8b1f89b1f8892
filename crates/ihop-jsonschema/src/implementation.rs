use ihop_protocol::{ImplementationDescriptor, Link};
use os_info::Version;

use crate::supported_dialect_uris;

pub const JSONSCHEMA_VERSION: &str = env!("IHOP_JSONSCHEMA_VERSION");
const RUSTC_VERSION: &str = env!("IHOP_RUSTC_VERSION");
const UNKNOWN_VERSION: &str = "unknown";

/// Descriptor returned on `start` for the `jsonschema` backend.
pub fn jsonschema_implementation() -> ImplementationDescriptor {
    let os = os_info::get();
    ImplementationDescriptor {
        language: "rust".to_string(),
        name: "jsonschema".to_string(),
        version: JSONSCHEMA_VERSION.to_string(),
        homepage: "https://docs.rs/jsonschema".to_string(),
        documentation: Some("https://docs.rs/jsonschema".to_string()),
        issues: "https://github.com/Stranger6667/jsonschema-rs/issues".to_string(),
        source: "https://github.com/Stranger6667/jsonschema-rs".to_string(),
        dialects: supported_dialect_uris(),
        os: Some(os.os_type().to_string()),
        os_version: match os.version() {
            Version::Unknown => None,
            version => Some(version.to_string()),
        },
        language_version: (RUSTC_VERSION != UNKNOWN_VERSION).then(|| RUSTC_VERSION.to_string()),
        links: vec![
            Link::new("crates.io", "https://crates.io/crates/jsonschema"),
            Link::new(
                "changelog",
                "https://github.com/Stranger6667/jsonschema-rs/blob/master/CHANGELOG.md",
            ),
        ],
    }
}
