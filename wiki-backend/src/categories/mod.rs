//! Category graph maintenance
//!
//! Category membership is declared inline with `[[Category:Name]]` markers.
//! A background updater turns those markers into `category_links` rows so
//! category pages never parse bodies on the request path.

pub mod markers;
pub mod updater;

pub use updater::CategoryGraphUpdater;
