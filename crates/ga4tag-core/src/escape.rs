//! Context-specific output escaping

/// Escape for an HTML attribute value or text node
pub fn esc_attr(value: &str) -> String {
	handlebars::html_escape(value)
}

/// Escape for the inside of a single- or double-quoted JS string literal
///
/// Markup-significant characters are written as `\uXXXX` so the result is
/// also safe inside an inline `<script>` element.
pub fn esc_js(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'\\' => out.push_str("\\\\"),
			'\'' => out.push_str("\\'"),
			'"' => out.push_str("\\\""),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'<' | '>' | '&' | '=' | '\u{2028}' | '\u{2029}' => {
				out.push_str(&format!("\\u{:04x}", c as u32));
			}
			c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
			c => out.push(c),
		}
	}
	out
}

/// Percent-encode for a URL query component
pub fn esc_url_param(value: &str) -> String {
	url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_esc_attr() {
		assert_eq!(esc_attr("G-ABC123"), "G-ABC123");
		assert_eq!(esc_attr("\"><script>"), "&quot;&gt;&lt;script&gt;");
		assert_eq!(esc_attr("a=b&c='d'"), "a&#x3D;b&amp;c&#x3D;&#x27;d&#x27;");
	}

	#[test]
	fn test_esc_js() {
		assert_eq!(esc_js("G-ABC123"), "G-ABC123");
		assert_eq!(esc_js("');alert(1);//"), "\\');alert(1);//");
		assert_eq!(esc_js("</script>"), "\\u003c/script\\u003e");
	}

	#[test]
	fn test_esc_url_param() {
		assert_eq!(esc_url_param("G-ABC123"), "G-ABC123");
		assert_eq!(esc_url_param("a b&c"), "a+b%26c");
	}
}

// vim: ts=4
