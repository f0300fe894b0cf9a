pub use crate::app::App;
pub use ga4tag_types::error::{ClResult, Error};
pub use ga4tag_types::session_adapter::{AuthCtx, Visitor};
pub use ga4tag_types::types::Timestamp;

pub use tracing::{debug, error, info, warn};

// vim: ts=4
