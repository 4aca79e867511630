//! Schema-driven validation of YAML documents via a compact rule DSL.
//!
//! A schema is itself a YAML document whose values are rule chains such
//! as `"@ num | > 15"`. Both schema and resource are recursively
//! flattened into path-keyed scalar mappings, so arbitrarily nested maps
//! and lists compare structurally:
//!
//! ```text
//! validate(schema_yaml, resource_yaml, exclusions)
//!   → parse → flatten → group lists/prototypes → match rules → Report
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! let schema = r#"
//! root:
//!   key_a: "~ exactly this"
//!   key_b: "@ num | > 15"
//!   key_c: "> root:key_b"
//! "#;
//!
//! let resource = r#"
//! root:
//!   key_a: exactly this
//!   key_b: 16
//!   key_c: 20
//! "#;
//!
//! let report = rulebook::validate(schema, resource, None).expect("valid YAML");
//! assert!(!report.has_errors);
//! assert!(report.issues.is_empty());
//! ```
//!
//! Rule tokens: `*` omit, `?` boolean, `>`/`<` arithmetic bounds, `~`
//! regex, `@` predefined pattern (`num`, `ipv4`, `ipv4_cidr`, `ipv6`,
//! `ipv6_cidr`), `!` uniqueness. A criterion may reference other resource
//! keys by (start-anchored) regex, as `key_c` does above.
//!
//! The crate is a pure library: reading files, argument handling, and
//! report rendering belong to the caller, which consumes the ordered
//! [`Issue`] list and `has_errors` flag of the returned [`Report`].

pub mod arith;
pub mod error;
pub mod flatten;
pub mod group;
pub mod parse;
pub mod path;
pub mod rules;
pub mod validate;

pub use error::*;

// Re-export entry-point functions at the crate root for convenience.
pub use validate::{DEFAULT_SEPARATOR, validate, validate_with};
