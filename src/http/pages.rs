//! HTML for the single-page tools.

use chrono::{DateTime, Utc};

use crate::config::PageKind;

const QR_PAGE: &str = include_str!("pages/qr.html");
const CAT_PAGE: &str = include_str!("pages/cat.html");

/// Render the page for `kind` as of `now`.
///
/// The cat page embeds `now` in the image link so browsers never reuse a
/// cached cat.
pub fn render(kind: PageKind, now: DateTime<Utc>) -> String {
    match kind {
        PageKind::Qr => QR_PAGE.to_string(),
        PageKind::Cat => CAT_PAGE.replace("{{cache_bust}}", &now.timestamp_millis().to_string()),
    }
}
