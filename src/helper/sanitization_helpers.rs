use std::collections::HashSet;

use ammonia::Builder;

/// Cleans rich post content from the admin editor. A safe subset of HTML
/// survives for formatting and embedded media; all scripting capability
/// (`onclick`, `onerror`, javascript: URLs) is removed.
pub fn sanitize_rich_content(html_input: &str) -> String {
    let tags_to_allow = [
        "h1", "h2", "h3", "h4", "h5", "h6", "b", "strong", "i", "em", "u", "p", "br",
        "a", "ul", "ol", "li", "blockquote", "code", "pre", "hr", "img", "table",
        "thead", "tbody", "tr", "th", "td", "s", "del", "video", "iframe", "div", "span",
    ];
    let safe_tags = tags_to_allow.iter().cloned().collect::<HashSet<_>>();

    let safe_attributes = [
        "src", "href", "alt", "title", "class", "style", "controls", "width", "height",
        "align", "allowfullscreen", "frameborder",
    ];
    let generic_attributes = safe_attributes.iter().cloned().collect::<HashSet<_>>();

    Builder::new()
        .tags(safe_tags)
        .generic_attributes(generic_attributes)
        .link_rel(Some("nofollow ugc"))
        .clean(html_input)
        .to_string()
}

/// Strips all HTML tags, leaving plain text. Used for visitor-supplied
/// fields like comment bodies and names, which never carry markup.
pub fn strip_all_html(input: &str) -> String {
    Builder::new().tags(HashSet::new()).clean(input).to_string()
}
