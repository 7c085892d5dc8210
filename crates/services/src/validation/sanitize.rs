use super::canonical::decode_html_entities;

/// Tags kept when basic formatting is allowed. Attributes are always dropped.
const ALLOWED_TAGS: [&str; 5] = ["strong", "em", "u", "br", "p"];

/// Elements whose text content is dropped along with the tags themselves.
const DROP_CONTENT_TAGS: [&str; 3] = ["script", "style", "iframe"];

/// Clean user-supplied HTML.
///
/// With `allow_formatting` the allow-listed tags are kept (re-emitted in
/// canonical lowercase form, attributes stripped) and everything else is
/// removed; `script`, `style` and `iframe` lose their content as well.
/// Without it, all markup is stripped and entities are decoded, leaving plain
/// text. Malformed or unbalanced markup is handled best-effort and never
/// panics.
pub fn sanitize_html(input: &str, allow_formatting: bool) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    // Set while inside an element whose content is dropped
    let mut dropping: Option<String> = None;

    while let Some(start) = rest.find('<') {
        if dropping.is_none() {
            out.push_str(&rest[..start]);
        }
        rest = &rest[start..];

        let Some(end) = rest.find('>') else {
            // Unterminated tag: discard the remainder
            rest = "";
            break;
        };
        let tag_body = &rest[1..end];
        rest = &rest[end + 1..];

        let (closing, tag_name) = parse_tag(tag_body);

        if let Some(open_tag) = &dropping {
            if closing && tag_name.eq_ignore_ascii_case(open_tag) {
                dropping = None;
            }
            continue;
        }

        if DROP_CONTENT_TAGS
            .iter()
            .any(|t| tag_name.eq_ignore_ascii_case(t))
        {
            let self_closing = tag_body.trim_end().ends_with('/');
            if !closing && !self_closing {
                dropping = Some(tag_name.to_ascii_lowercase());
            }
            continue;
        }

        if allow_formatting {
            let lower = tag_name.to_ascii_lowercase();
            if ALLOWED_TAGS.contains(&lower.as_str()) {
                if closing {
                    out.push_str("</");
                } else {
                    out.push('<');
                }
                out.push_str(&lower);
                out.push('>');
            }
        }
        // Any other tag is stripped; its text content stays
    }

    if dropping.is_none() {
        out.push_str(rest);
    }

    if allow_formatting {
        out
    } else {
        decode_html_entities(&out)
    }
}

/// Split a tag body into (is_closing, name). The name ends at the first
/// whitespace or `/`, so attributes and self-closing slashes are ignored.
fn parse_tag(tag_body: &str) -> (bool, &str) {
    let trimmed = tag_body.trim();
    let (closing, rest) = match trimmed.strip_prefix('/') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let name_end = rest
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(rest.len());
    (closing, &rest[..name_end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_all_tags_when_formatting_disallowed() {
        assert_eq!(
            sanitize_html("<strong>Bold</strong> and <em>italic</em>", false),
            "Bold and italic"
        );
        assert_eq!(sanitize_html("<p>para</p>", false), "para");
    }

    #[test]
    fn empty_input_returns_empty_string() {
        assert_eq!(sanitize_html("", true), "");
        assert_eq!(sanitize_html("", false), "");
    }

    #[test]
    fn keeps_only_allowlisted_tags_when_formatting_allowed() {
        assert_eq!(
            sanitize_html("<strong>Bold</strong> and <em>italic</em>", true),
            "<strong>Bold</strong> and <em>italic</em>"
        );
        // Links are not in the allow-list; the text survives, the tag does not
        assert_eq!(
            sanitize_html("see <a href=\"http://evil\">here</a>", true),
            "see here"
        );
        assert_eq!(sanitize_html("line<br/>break", true), "line<br>break");
    }

    #[test]
    fn drops_attributes_from_allowed_tags() {
        assert_eq!(
            sanitize_html("<p onclick=\"alert(1)\">hi</p>", true),
            "<p>hi</p>"
        );
    }

    #[test]
    fn drops_script_and_iframe_content_entirely() {
        assert_eq!(
            sanitize_html("before<script>alert(1)</script>after", true),
            "beforeafter"
        );
        assert_eq!(
            sanitize_html("a<iframe src=x>inner</iframe>b", false),
            "ab"
        );
        assert_eq!(sanitize_html("a<style>p{}</style>b", true), "ab");
    }

    #[test]
    fn decodes_entities_to_literal_text_when_stripping() {
        assert_eq!(sanitize_html("Tom &amp; Jerry", false), "Tom & Jerry");
        assert_eq!(sanitize_html("1 &lt; 2", false), "1 < 2");
        // Entities stay encoded when markup is kept
        assert_eq!(sanitize_html("1 &lt; 2", true), "1 &lt; 2");
    }

    #[test]
    fn tolerates_malformed_markup() {
        // Unterminated tag: remainder discarded
        assert_eq!(sanitize_html("hello <strong unclosed", true), "hello ");
        // Unbalanced close tags are stripped
        assert_eq!(sanitize_html("a</div>b", false), "ab");
        // Script never closed: content dropped to the end
        assert_eq!(sanitize_html("a<script>x = 1;", true), "a");
        assert_eq!(sanitize_html("<>empty<>", false), "empty");
    }

    #[test]
    fn tag_case_is_normalized() {
        assert_eq!(sanitize_html("<STRONG>x</StRoNg>", true), "<strong>x</strong>");
        assert_eq!(sanitize_html("<SCRIPT>x</SCRIPT>y", true), "y");
    }
}
