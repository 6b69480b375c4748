pub mod admin_helpers;
pub mod campaign_helpers;
pub mod content_helpers;
pub mod feed_helpers;
pub mod public_helpers;
pub mod sanitization_helpers;
