use std::time::Duration;

pub mod llm;
pub mod stt;

/// Both upstream AI calls share the same bound; no cancellation is
/// exposed once a request is in flight.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);
