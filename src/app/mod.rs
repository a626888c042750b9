// Application layer: per-submission sessions and the long-lived feed app that owns them.

pub mod feed_app;
pub mod session;
