//! Plain text to Confluence storage format.
//!
//! [`ContentFormatter`] renders the body of an uploaded text file:
//!
//! ```text
//! <h1>{filename}</h1>
//! <p>explanatory paragraph</p>
//! <p><b>Preview:</b></p>
//! {body block}
//! <p><b>Download:</b> <ac:link><ri:attachment ri:filename="{filename}"/></ac:link></p>
//! ```
//!
//! The body block depends on [`BodyMode`]. Formatting never fails.

use confpub_config::BodyMode;

use crate::markup::render_markup;

/// Paragraph placed between the heading and the preview.
const EXPLANATION: &str = "This file has been uploaded automatically to Confluence. \
                           You can download the full version below.";

/// Renders text files into storage-format page bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentFormatter {
    mode: BodyMode,
    annotate: bool,
}

impl Default for ContentFormatter {
    fn default() -> Self {
        Self::new(BodyMode::Code)
    }
}

impl ContentFormatter {
    /// Create a formatter for `mode` with annotations enabled.
    #[must_use]
    pub fn new(mode: BodyMode) -> Self {
        Self {
            mode,
            annotate: true,
        }
    }

    /// Whether to add heading, preview label and download link around the body.
    #[must_use]
    pub fn annotate(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    /// Body mode in use.
    #[must_use]
    pub fn mode(&self) -> BodyMode {
        self.mode
    }

    /// Render `text` as a page body for a file named `filename`.
    #[must_use]
    pub fn format(&self, text: &str, filename: &str) -> String {
        let block = match self.mode {
            BodyMode::Code => code_block(text),
            BodyMode::Escaped => escaped_block(text),
            BodyMode::Markup => render_markup(text),
        };

        if !self.annotate {
            return block;
        }

        format!(
            "<h1>{heading}</h1>\n\n\
             <p>{EXPLANATION}</p>\n\n\
             <p><b>Preview:</b></p>\n\n\
             {block}\n\n\
             <p><b>Download:</b> <ac:link><ri:attachment ri:filename=\"{attr}\"/></ac:link></p>",
            heading = escape_text(filename),
            attr = escape_attr(filename),
        )
    }
}

/// Code macro with the text in a CDATA section.
///
/// The text is kept byte for byte. A literal `]]>` cannot live inside CDATA,
/// so it is split across two sections, which the server joins back.
fn code_block(text: &str) -> String {
    let cdata = text.replace("]]>", "]]]]><![CDATA[>");
    format!(
        "<ac:structured-macro ac:name=\"code\">\n  \
         <ac:plain-text-body><![CDATA[{cdata}]]></ac:plain-text-body>\n\
         </ac:structured-macro>"
    )
}

/// Escaped paragraph, one `<br />` per line break.
fn escaped_block(text: &str) -> String {
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| escape_attr(line.strip_suffix('\r').unwrap_or(line)))
        .collect();
    format!("<p>{}</p>", lines.join("<br />"))
}

/// Escape text for XML content.
pub(crate) fn escape_text(text: &str) -> String {
    escape_xml(text, false)
}

/// Escape text for XML attribute values.
pub(crate) fn escape_attr(text: &str) -> String {
    escape_xml(text, true)
}

fn escape_xml(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            '\'' if escape_quotes => result.push_str("&#x27;"),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "Lorem <ipsum> & \"dolor\"\r\nsit amet\n\n  indented\ttab\n";

    #[test]
    fn test_annotated_code_document() {
        let out = ContentFormatter::default().format("hello\nworld", "notes.txt");
        assert_eq!(
            out,
            "<h1>notes.txt</h1>\n\n\
             <p>This file has been uploaded automatically to Confluence. \
             You can download the full version below.</p>\n\n\
             <p><b>Preview:</b></p>\n\n\
             <ac:structured-macro ac:name=\"code\">\n  \
             <ac:plain-text-body><![CDATA[hello\nworld]]></ac:plain-text-body>\n\
             </ac:structured-macro>\n\n\
             <p><b>Download:</b> <ac:link><ri:attachment ri:filename=\"notes.txt\"/></ac:link></p>"
        );
    }

    #[test]
    fn test_code_block_keeps_text_verbatim() {
        let out = ContentFormatter::default().format(SAMPLE, "Lorem_ipsum.txt");
        let start = out.find("<![CDATA[").unwrap() + "<![CDATA[".len();
        let end = out.find("]]></ac:plain-text-body>").unwrap();
        assert_eq!(&out[start..end], SAMPLE);
    }

    #[test]
    fn test_filename_in_heading_and_link() {
        let out = ContentFormatter::default().format("x", "report-2025.log");
        assert!(out.starts_with("<h1>report-2025.log</h1>"));
        let link = r#"<ri:attachment ri:filename="report-2025.log"/>"#;
        assert!(out.contains(link));
    }

    #[test]
    fn test_filename_is_escaped() {
        let out = ContentFormatter::default().format("x", "a&b \"c\".txt");
        assert!(out.contains("<h1>a&amp;b \"c\".txt</h1>"));
        assert!(out.contains(r#"ri:filename="a&amp;b &quot;c&quot;.txt""#));
    }

    #[test]
    fn test_cdata_terminator_split() {
        let out = ContentFormatter::new(BodyMode::Code)
            .annotate(false)
            .format("a]]>b", "f.txt");
        assert!(out.contains("<![CDATA[a]]]]><![CDATA[>b]]>"));
    }

    #[test]
    fn test_bare_code_block() {
        let out = ContentFormatter::new(BodyMode::Code)
            .annotate(false)
            .format("raw", "ignored.txt");
        assert!(out.starts_with("<ac:structured-macro"));
        assert!(!out.contains("ignored.txt"));
    }

    #[test]
    fn test_escaped_mode() {
        let out = ContentFormatter::new(BodyMode::Escaped)
            .annotate(false)
            .format(SAMPLE, "f.txt");
        assert_eq!(
            out,
            "<p>Lorem &lt;ipsum&gt; &amp; &quot;dolor&quot;<br />sit amet<br /><br />  \
             indented\ttab<br /></p>"
        );
    }

    #[test]
    fn test_escaped_mode_has_no_code_macro() {
        let out = ContentFormatter::new(BodyMode::Escaped).format("<b>", "f.txt");
        assert!(!out.contains("ac:structured-macro"));
        assert!(out.contains("&lt;b&gt;"));
        assert!(out.contains(r#"ri:filename="f.txt""#));
    }

    #[test]
    fn test_markup_mode_uses_rule_table() {
        let out = ContentFormatter::new(BodyMode::Markup)
            .annotate(false)
            .format("# Title\nsome **bold** text", "f.txt");
        assert_eq!(
            out,
            "<h1>Title</h1>\n<p>some <strong>bold</strong> text</p>"
        );
    }

    #[test]
    fn test_deterministic() {
        let formatter = ContentFormatter::new(BodyMode::Code);
        assert_eq!(
            formatter.format(SAMPLE, "a.txt"),
            formatter.format(SAMPLE, "a.txt")
        );
    }

    #[test]
    fn test_empty_text() {
        let out = ContentFormatter::default().annotate(false).format("", "f.txt");
        assert!(out.contains("<![CDATA[]]>"));
    }
}
