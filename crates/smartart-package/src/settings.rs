//! Compatibility-mode forcing in the settings part.
//!
//! Word only regenerates diagram drawings from the data part when the
//! document declares compatibility mode 15 or later. The setting lives in
//! `w:settings/w:compat/w:compatSetting[@w:name="compatibilityMode"]`.

use roxmltree::Node;

use crate::{
    PackagingError,
    xml::{self, Edits, W_NS},
};

/// Compatibility mode at which diagram drawings are regenerated on open.
pub const REGENERATION_COMPAT_MODE: u32 = 15;

const COMPAT_SETTING_URI: &str = "http://schemas.microsoft.com/office/word";

/// `CT_Settings` children that must follow `w:compat`.
const AFTER_COMPAT: &[&str] = &[
    "docVars",
    "rsids",
    "mathPr",
    "attachedSchema",
    "themeFontLang",
    "clrSchemeMapping",
    "doNotIncludeSubdocsInStats",
    "doNotAutoCompressPictures",
    "forceUpgrade",
    "captions",
    "readModeInkLockDown",
    "smartTagType",
    "schemaLibrary",
    "shapeDefaults",
    "doNotEmbedSmartTags",
    "decimalSymbol",
    "listSeparator",
];

/// Returns `text` with the compatibility mode raised to at least `minimum`.
///
/// A higher existing mode is kept. When nothing needs to change the input is
/// returned unchanged.
pub fn force_compatibility_mode(
    part: &str,
    text: &str,
    minimum: u32,
) -> Result<String, PackagingError> {
    let doc = xml::parse(part, text)?;
    let settings = doc.root_element();
    if settings.tag_name().name() != "settings" || settings.tag_name().namespace() != Some(W_NS) {
        return Err(PackagingError::malformed(part, "root is not <w:settings>"));
    }

    let prefix = settings.lookup_prefix(W_NS);
    let setting = format!(
        r#"<{tag} {name}="compatibilityMode" {uri}="{COMPAT_SETTING_URI}" {val}="{minimum}"/>"#,
        tag = xml::qualify(prefix, "compatSetting"),
        name = xml::qualify(prefix, "name"),
        uri = xml::qualify(prefix, "uri"),
        val = xml::qualify(prefix, "val"),
    );
    let compat_tag = xml::qualify(prefix, "compat");

    let mut edits = Edits::new();
    match w_child(settings, "compat") {
        Some(compat) => match existing_mode(compat) {
            Some((node, value)) => {
                if value.is_some_and(|value| value >= minimum) {
                    return Ok(text.to_string());
                }
                log::debug!(previous:? = value, minimum; "Raising compatibility mode");
                edits.replace(node.range(), setting);
            }
            None => match xml::end_tag_start(text, compat) {
                Some(at) => edits.insert(at, setting),
                None => edits.replace(
                    compat.range(),
                    format!("<{compat_tag}>{setting}</{compat_tag}>"),
                ),
            },
        },
        None => {
            let block = format!("<{compat_tag}>{setting}</{compat_tag}>");
            let successor = settings
                .children()
                .filter(Node::is_element)
                .find(|node| AFTER_COMPAT.contains(&node.tag_name().name()));
            match (successor, xml::end_tag_start(text, settings)) {
                (Some(node), _) => edits.insert(node.range().start, block),
                (None, Some(at)) => edits.insert(at, block),
                (None, None) => {
                    let open = text[settings.range()].trim_end_matches("/>").trim_end();
                    let settings_tag = xml::qualify(prefix, "settings");
                    edits.replace(
                        settings.range(),
                        format!("{open}>{block}</{settings_tag}>"),
                    );
                }
            }
        }
    }

    Ok(edits.apply(text))
}

fn w_child<'a, 'input>(node: Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| {
        child.is_element()
            && child.tag_name().name() == local
            && child.tag_name().namespace() == Some(W_NS)
    })
}

/// The `compatibilityMode` setting and its numeric value, if present.
fn existing_mode<'a, 'input>(compat: Node<'a, 'input>) -> Option<(Node<'a, 'input>, Option<u32>)> {
    compat
        .children()
        .filter(|child| child.is_element() && child.tag_name().name() == "compatSetting")
        .find(|child| child.attribute((W_NS, "name")) == Some("compatibilityMode"))
        .map(|node| {
            let value = node
                .attribute((W_NS, "val"))
                .and_then(|val| val.trim().parse().ok());
            (node, value)
        })
}

/// Reads the declared compatibility mode, if any.
pub fn compatibility_mode(part: &str, text: &str) -> Result<Option<u32>, PackagingError> {
    let doc = xml::parse(part, text)?;
    Ok(w_child(doc.root_element(), "compat")
        .and_then(existing_mode)
        .and_then(|(_, value)| value))
}
