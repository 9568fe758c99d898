//! Prompt assembly for the final analysis pass

use veridoc_core::{AnalysisParameters, ObjectData};

/// Wrap each document's extracted pages in numbered `<document-N>` blocks
///
/// Objects without extracted content are skipped; numbering follows the
/// object order in the analysis.
pub fn document_blocks(objects: &[ObjectData]) -> String {
    let mut documents = Vec::new();
    for (index, object) in objects.iter().enumerate() {
        let contents: Vec<&str> = object.data.iter().map(|p| p.content.as_str()).collect();
        if !contents.is_empty() {
            documents.push(format!(
                "<document-{0}>\n{1}\n</document-{0}>",
                index + 1,
                contents.join("\n")
            ));
        }
    }
    documents.join("\n\n")
}

/// Identity fields formatted for the `{{input}}` template variable
pub fn identity_input(parameters: Option<&AnalysisParameters>) -> String {
    let field = |value: Option<&String>| value.map(String::as_str).unwrap_or("").to_string();
    let (first, middle, last, address) = match parameters {
        Some(p) => (
            field(p.first_name.as_ref()),
            field(p.middle_name.as_ref()),
            field(p.last_name.as_ref()),
            field(p.address.as_ref()),
        ),
        None => Default::default(),
    };
    format!(
        "First Name: {}\nMiddle Name: {}\nLast Name: {}\nAddress: {}",
        first, middle, last, address
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use veridoc_core::PageData;

    fn object_with_pages(key: &str, contents: &[&str]) -> ObjectData {
        let mut object = ObjectData::skeleton(key);
        object.data = contents
            .iter()
            .enumerate()
            .map(|(i, content)| PageData {
                page: i as u32 + 1,
                content: content.to_string(),
                token_input: 10,
                token_output: 20,
            })
            .collect();
        object
    }

    #[test]
    fn test_document_blocks_numbering() {
        let objects = vec![
            object_with_pages("a.pdf", &["page one", "page two"]),
            object_with_pages("b.pdf", &["other doc"]),
        ];
        let blocks = document_blocks(&objects);
        assert!(blocks.contains("<document-1>\npage one\npage two\n</document-1>"));
        assert!(blocks.contains("<document-2>\nother doc\n</document-2>"));
    }

    #[test]
    fn test_document_blocks_skips_empty_objects() {
        let objects = vec![
            ObjectData::skeleton("empty.pdf"),
            object_with_pages("b.pdf", &["content"]),
        ];
        let blocks = document_blocks(&objects);
        assert!(!blocks.contains("document-1>\n\n"));
        assert!(blocks.contains("<document-2>"));
    }

    #[test]
    fn test_identity_input_formatting() {
        let parameters = AnalysisParameters {
            first_name: Some("Jane".into()),
            middle_name: None,
            last_name: Some("Doe".into()),
            address: Some("1 Main St".into()),
            onboarding_id: "abc".into(),
        };
        assert_eq!(
            identity_input(Some(&parameters)),
            "First Name: Jane\nMiddle Name: \nLast Name: Doe\nAddress: 1 Main St"
        );
    }

    #[test]
    fn test_identity_input_missing_parameters() {
        assert_eq!(
            identity_input(None),
            "First Name: \nMiddle Name: \nLast Name: \nAddress: "
        );
    }
}
