//! HTML projection of widget state.
//!
//! Plain functions returning markup strings. Full pages come from
//! [`page`]; everything else is an htmx fragment swapped into that page.
//!
//! # Structure
//!
//! - [`page`]: document shell with the hero, chat and resources sections
//! - [`transcript`]: messages, typing indicator, composer and the
//!   fragments returned by the send/reply endpoints
//! - [`gallery`]: resource cards

pub mod gallery;
pub mod page;
pub mod transcript;

pub use gallery::{gallery, resource_card, scroll_gallery_script};
pub use page::page;
pub use transcript::{accepted_fragment, composer, message, reply_fragment, typing_indicator};

use url::Url;

/// Escape text for use in element content and quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escaped `href` value; anything but http(s), fragments and
/// site-relative paths collapses to `#`.
#[must_use]
pub fn safe_href(link: &str) -> String {
    let link = link.trim();
    let allowed = if link.starts_with('#') || (link.starts_with('/') && !link.starts_with("//"))
    {
        true
    } else {
        Url::parse(link).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
    };
    if allowed { escape(link) } else { "#".to_string() }
}
