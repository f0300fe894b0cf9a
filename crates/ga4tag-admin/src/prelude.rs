pub use ga4tag_core::prelude::*;

// vim: ts=4
