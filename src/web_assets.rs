//! Embedded client-side glue for the site pages.
//!
//! Compiled into the binary via `include_str!` so `serve` needs no asset
//! directory of its own.

/// Loads the notice fragment into `#noticeList`, submits `#quoteForm` to
/// `/api/quotes`, and handles phone formatting and required-field borders.
///
/// Loaded from `src/assets/site.js` at compile time. The contact phone is
/// filled in by [`script`].
const JS_TEMPLATE: &str = include_str!("assets/site.js");

const PHONE_PLACEHOLDER: &str = "__CONTACT_PHONE__";

/// The glue script with `contact_phone` embedded as a JS string literal, so
/// the offline-failure alert shows the same number as the relay's message.
pub fn script(contact_phone: &str) -> String {
    // A JSON string is a valid JS string literal; escape `</` as well so the
    // value can never close an inline <script>.
    let literal = serde_json::to_string(contact_phone)
        .unwrap_or_else(|_| "\"\"".to_owned())
        .replace("</", "<\\/");
    JS_TEMPLATE.replacen(PHONE_PLACEHOLDER, &literal, 1)
}
