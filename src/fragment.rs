//! Parsing the single line under the caret.
//!
//! While typing, the caret line is rarely well-formed: the start tag being
//! edited is usually still open (`<Button guid="guidFoo" id="cm`), or closed
//! with `>` and waiting for its end tag. The line is parsed as-is first; if
//! that fails, close-tag syntax is toggled (every `/>` becomes `>`, then
//! every `>` becomes `/>`) so a leading open tag turns self-closing and the
//! line parses on its own. If that fails too the line yields no completions.

use crate::document::{parsing_options, SymbolTree};
use crate::error::{Result, VsctError};

const FRAGMENT_ROOT: &str = "fragment";

/// Parse `line` into a tree whose root is the first element on the line.
///
/// A line without any element (an attribute continuation line, say) yields a
/// nameless root with no attributes.
pub fn parse_fragment(line: &str) -> Result<SymbolTree> {
    parse_wrapped(line).or_else(|_| parse_wrapped(&toggle_close_syntax(line)))
}

pub fn toggle_close_syntax(line: &str) -> String {
    line.replace("/>", ">").replace('>', "/>")
}

fn parse_wrapped(line: &str) -> Result<SymbolTree> {
    // The synthetic root lets several sibling elements parse as one fragment.
    let wrapped = format!("<{FRAGMENT_ROOT}>{line}</{FRAGMENT_ROOT}>");
    let doc = roxmltree::Document::parse_with_options(&wrapped, parsing_options())
        .map_err(VsctError::FragmentUnparseable)?;

    let tree = match doc.root_element().children().find(|n| n.is_element()) {
        Some(first) => SymbolTree::from_node(first),
        None => SymbolTree::anonymous(),
    };

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unterminated_start_tag_becomes_self_closed() {
        let tree = parse_fragment(r#"      <Button guid="guidFoo" id="cmdBar" priority="0x0100">"#).unwrap();
        let element = tree.root();

        assert_eq!(element.name(), "Button");
        assert_eq!(element.attribute("guid"), Some("guidFoo"));
        assert_eq!(element.attribute("id"), Some("cmdBar"));
        assert_eq!(element.attribute("priority"), Some("0x0100"));
    }

    #[test]
    fn well_formed_line_parses_as_written() {
        let tree = parse_fragment(r#"<Parent guid="guidSHLMainMenu" id="IDG_VS_MM_TOOLSADDINS" />"#)
            .unwrap();

        assert_eq!(tree.root().name(), "Parent");
        assert_eq!(
            tree.root().attribute("id"),
            Some("IDG_VS_MM_TOOLSADDINS")
        );
    }

    #[test]
    fn element_with_text_and_end_tag_parses() {
        let tree = parse_fragment("<ButtonText>Invoke my command</ButtonText>").unwrap();

        assert_eq!(tree.root().name(), "ButtonText");
    }

    #[test]
    fn continuation_line_has_nameless_root() {
        let tree = parse_fragment(r#"        id="cmdBar""#).unwrap();

        assert_eq!(tree.root().name(), "");
        assert!(tree.root().attributes().is_empty());
    }

    #[test]
    fn toggles_close_syntax() {
        assert_eq!(
            toggle_close_syntax(r#"<A x="1"/><B y="2">"#),
            r#"<A x="1"/><B y="2"/>"#
        );
    }

    #[test]
    fn open_tag_with_half_typed_value_is_unparseable() {
        let result = parse_fragment(r#"<Button guid="guidFoo" id="cm"#);

        assert!(matches!(result, Err(VsctError::FragmentUnparseable(_))));
    }

    #[test]
    fn end_tag_only_line_is_unparseable() {
        let result = parse_fragment("    </Button>");

        assert!(matches!(result, Err(VsctError::FragmentUnparseable(_))));
    }
}
