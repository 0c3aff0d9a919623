//! Markup for resolved chunks.

use crate::resolver::ResolvedChunk;

const SCRIPT_SUFFIXES: [&str; 2] = [".js", ".js.gz"];
const STYLE_SUFFIXES: [&str; 2] = [".css", ".css.gz"];

/// Keep the chunks whose name ends with `.{extension}`.
pub fn filter_by_extension(chunks: Vec<ResolvedChunk>, extension: &str) -> Vec<ResolvedChunk> {
  let suffix = format!(".{extension}");
  chunks
    .into_iter()
    .filter(|chunk| chunk.name.ends_with(&suffix))
    .collect()
}

/// Script and stylesheet tags for `chunks`.
///
/// `attrs` is inserted verbatim into every tag. Chunks that are neither scripts nor
/// stylesheets produce no tag.
pub fn to_tags(chunks: &[ResolvedChunk], attrs: &str) -> Vec<String> {
  chunks
    .iter()
    .filter_map(|chunk| {
      let url = escape_attribute(&chunk.url);
      if has_suffix(&chunk.name, &SCRIPT_SUFFIXES) {
        Some(format!(
          r#"<script type="text/javascript" src="{url}" {attrs}></script>"#
        ))
      } else if has_suffix(&chunk.name, &STYLE_SUFFIXES) {
        Some(format!(
          r#"<link type="text/css" href="{url}" rel="stylesheet" {attrs}/>"#
        ))
      } else {
        None
      }
    })
    .collect()
}

/// Newline separated tags, ready to embed in a template.
pub fn render_tags(tags: &[String]) -> String {
  tags.join("\n")
}

fn has_suffix(name: &str, suffixes: &[&str]) -> bool {
  suffixes.iter().any(|suffix| name.ends_with(suffix))
}

fn escape_attribute(value: &str) -> String {
  let mut escaped = String::with_capacity(value.len());
  for c in value.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&#x27;"),
      _ => escaped.push(c),
    }
  }
  escaped
}

#[cfg(test)]
mod tests {
  use super::*;

  fn chunk(name: &str) -> ResolvedChunk {
    ResolvedChunk {
      name: name.into(),
      url: format!("/static/{name}"),
      public_path: None,
      integrity: None,
      path: None,
    }
  }

  #[test]
  fn emits_script_and_link_tags_only() {
    let tags = to_tags(&[chunk("x.js"), chunk("y.css"), chunk("z.txt")], "");

    assert_eq!(tags, vec![
      r#"<script type="text/javascript" src="/static/x.js" ></script>"#.to_string(),
      r#"<link type="text/css" href="/static/y.css" rel="stylesheet" />"#.to_string(),
    ]);
  }

  #[test]
  fn recognises_gzipped_outputs() {
    let tags = to_tags(&[chunk("x.js.gz"), chunk("y.css.gz")], "");
    assert_eq!(tags.len(), 2);
    assert!(tags[0].starts_with("<script"));
    assert!(tags[1].starts_with("<link"));
  }

  #[test]
  fn inserts_attributes_verbatim() {
    let tags = to_tags(&[chunk("x.js")], r#"async charset="UTF-8""#);
    assert_eq!(
      tags[0],
      r#"<script type="text/javascript" src="/static/x.js" async charset="UTF-8"></script>"#
    );
  }

  #[test]
  fn escapes_urls() {
    let mut unsafe_chunk = chunk("x.js");
    unsafe_chunk.url = r#"/static/x.js?a=1&b="2""#.into();

    let tags = to_tags(&[unsafe_chunk], "");
    assert!(tags[0].contains(r#"src="/static/x.js?a=1&amp;b=&quot;2&quot;""#));
  }

  #[test]
  fn filters_on_the_full_extension() {
    let chunks = vec![chunk("a.js"), chunk("b.css"), chunk("c.json"), chunk("d.js.map")];
    let names: Vec<String> = filter_by_extension(chunks, "js")
      .into_iter()
      .map(|chunk| chunk.name)
      .collect();

    assert_eq!(names, vec!["a.js".to_string()]);
  }

  #[test]
  fn renders_one_tag_per_line() {
    let tags = vec!["<a/>".to_string(), "<b/>".to_string()];
    assert_eq!(render_tags(&tags), "<a/>\n<b/>");
  }
}
