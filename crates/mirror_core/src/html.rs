use crate::document::ContentBlock;

/// Serializes blocks into the draft body markup, one element per line.
///
/// Consecutive list items share a single `<ul>`.
pub fn render_html(blocks: &[ContentBlock]) -> String {
    let mut out: Vec<String> = Vec::with_capacity(blocks.len());
    let mut in_list = false;

    for block in blocks {
        let is_item = matches!(block, ContentBlock::ListItem { .. });
        if in_list && !is_item {
            out.push("</ul>".to_string());
            in_list = false;
        }
        match block {
            ContentBlock::Heading { level, text } => {
                let tag = if *level <= 1 { "h1" } else { "h2" };
                out.push(format!("<{tag}>{}</{tag}>", escape_text(text)));
            }
            ContentBlock::Paragraph { text } => {
                out.push(format!("<p>{}</p>", escape_text(text)));
            }
            ContentBlock::ListItem { text } => {
                if !in_list {
                    out.push("<ul>".to_string());
                    in_list = true;
                }
                out.push(format!("<li>{}</li>", escape_text(text)));
            }
            ContentBlock::Image { reference } => {
                out.push(format!(
                    "<p><img src=\"{}\" /></p>",
                    escape_attribute(reference)
                ));
            }
        }
    }
    if in_list {
        out.push("</ul>".to_string());
    }

    out.join("\n")
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::{escape_attribute, escape_text};

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_text("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(escape_text("引号\"不变"), "引号\"不变");
        assert_eq!(
            escape_attribute("https://x.test/a.jpg?w=1&h=\"2\""),
            "https://x.test/a.jpg?w=1&amp;h=&quot;2&quot;"
        );
    }
}
