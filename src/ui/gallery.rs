//! Resource gallery.

use std::time::Duration;

use super::{escape, safe_href};
use crate::widget::Resource;

/// Element id of the gallery container.
pub const GALLERY_ID: &str = "resources-grid";

/// Gallery container holding one card per resource.
///
/// With `oob` set the container carries `hx-swap-oob` so it can ride along
/// in a reply fragment and replace the gallery wholesale.
#[must_use]
pub fn gallery(resources: &[Resource], oob: bool) -> String {
    let swap = if oob { r#" hx-swap-oob="true""# } else { "" };
    let mut html = format!(r#"<div id="{GALLERY_ID}" class="resources-grid"{swap}>"#);
    for resource in resources {
        html.push_str(&resource_card(resource));
    }
    html.push_str("</div>");
    html
}

/// A single card, classed by its bucket.
#[must_use]
pub fn resource_card(resource: &Resource) -> String {
    format!(
        r#"<div class="resource-card"><div class="resource-content"><span class="resource-type {bucket}">{kind}</span><h3>{title}</h3><p>{description}</p><a href="{href}" target="_blank" rel="noopener noreferrer" class="resource-link">Learn More <i class="fas fa-arrow-right"></i></a></div></div>"#,
        bucket = resource.bucket().as_str(),
        kind = escape(&resource.kind),
        title = escape(&resource.title),
        description = escape(resource.description_or_default()),
        href = safe_href(&resource.link),
    )
}

/// Inline script scrolling the resources section into view after `delay`.
#[must_use]
pub fn scroll_gallery_script(delay: Duration) -> String {
    format!(
        "<script>setTimeout(function () {{ var el = document.getElementById('resources'); if (el) {{ el.scrollIntoView({{ behavior: 'smooth' }}); }} }}, {});</script>",
        delay.as_millis()
    )
}
