/// Client identifier sent on every report request.
pub const DEFAULT_USER_AGENT: &str = concat!("pacer_api/", env!("CARGO_PKG_VERSION"));
