//! SVG string rendering
//!
//! Builds SVG markup for the chart and graph views as plain strings, the
//! way the prototype did. Purely presentational: all numbers come in
//! precomputed (chart scaling excepted) and nothing here touches the store.

pub mod charts;
pub mod graph;

/// Minimal XML text escaping for labels and attribute values.
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_xml("a<b> & \"c\""), "a&lt;b&gt; &amp; &quot;c&quot;");
    }
}
