/// Re-export `Config` from `adpulse-core` for use within this crate.
///
/// All environment-variable parsing lives in `adpulse-core` so it can be
/// shared with integration tests without depending on the full server.
pub use adpulse_core::config::Config;
