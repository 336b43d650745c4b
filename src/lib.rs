// Ninja lookup plugin core: feed scraping, fuzzy name matching and reply batching.

pub mod avatar;
pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod format;
pub mod forward;
pub mod jsonp;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod plugin;
pub mod resolver;
