//! Helpers for inspecting rendered Office packages

use std::io::{Cursor, Read};

/// Contents of one entry in a zip package
pub(crate) fn zip_entry(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut xml = String::new();
    entry.read_to_string(&mut xml).unwrap();
    xml
}

/// Names of every entry in a zip package
pub(crate) fn zip_entry_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    archive.file_names().map(str::to_string).collect()
}

/// Text content of each `<tag ...>text</tag>` element, in document order
pub(crate) fn element_texts(xml: &str, tag: &str) -> Vec<String> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut texts = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find(&open) {
        rest = &rest[start + open.len()..];
        // Skip longer tag names sharing the prefix, e.g. <w:tbl> for <w:t
        if !rest.starts_with(['>', ' ']) {
            continue;
        }
        let Some(body) = rest.find('>') else { break };
        if rest[..body].ends_with('/') {
            texts.push(String::new());
            rest = &rest[body + 1..];
            continue;
        }
        rest = &rest[body + 1..];
        let Some(end) = rest.find(&close) else { break };
        texts.push(rest[..end].to_string());
        rest = &rest[end + close.len()..];
    }
    texts
}

#[test]
fn test_element_texts_skips_prefixed_tags() {
    let xml = r#"<w:tbl><w:t xml:space="preserve">a</w:t><w:tab/><w:t>b</w:t></w:tbl>"#;
    assert_eq!(element_texts(xml, "w:t"), vec!["a", "b"]);
}
