//! Service description cleanup and canonicalization.

mod normalizer;
pub mod typos;

pub use normalizer::{
    clean_description, collect_services, normalize_line, normalize_services,
    normalize_services_with,
};
pub use typos::{TypoRule, TypoTable};
