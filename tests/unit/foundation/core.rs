use super::*;

#[test]
fn node_path_adds_leading_separator() {
    assert_eq!(NodePath::new("pCube1").as_str(), "|pCube1");
    assert_eq!(NodePath::new("|group1|pCube1").as_str(), "|group1|pCube1");
}

#[test]
fn node_path_components_and_leaf() {
    let p = NodePath::new("|group1|arm|hand");
    assert_eq!(p.components().collect::<Vec<_>>(), ["group1", "arm", "hand"]);
    assert_eq!(p.leaf_name(), "hand");
    assert_eq!(p.depth(), 3);
    assert_eq!(NodePath::new("|group1").child("pCube1").as_str(), "|group1|pCube1");
}

#[test]
fn diagnostics_render_with_channel_prefix() {
    assert_eq!(Diagnostic::warning("careful").to_string(), "warning: careful");
    assert_eq!(Diagnostic::error("broken").severity, Severity::Error);
    assert_eq!(Diagnostic::info("hi").severity.label(), "info");
}
