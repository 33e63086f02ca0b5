use super::*;

fn doc(json: &str) -> SceneDocument {
    serde_json::from_str(json).unwrap()
}

fn sample_scene() -> Scene {
    Scene::from_document(doc(
        r#"{
            "current_time": 4,
            "selection": ["pCube1", "missing"],
            "interrupt_after": 2,
            "nodes": [
                { "name": "group1", "children": [
                    { "name": "pCube1", "translate": [
                        { "time": 10, "value": [10, 0, 0] },
                        { "time": 0, "value": [0, 0, 0] }
                    ] },
                    { "name": "hidden", "visible": false }
                ] },
                { "name": "group10" }
            ]
        }"#,
    ))
    .unwrap()
}

#[test]
fn document_defaults_apply() {
    let scene = Scene::from_document(doc(r#"{ "nodes": [ { "name": "a" } ] }"#)).unwrap();
    assert_eq!(scene.current_time(), 1.0);
    let a = scene.node(&NodePath::new("a")).unwrap();
    assert!(a.visible);
    assert_eq!(a.translate_at(5.0), [0.0, 0.0, 0.0]);
}

#[test]
fn nodes_are_flattened_by_path() {
    let scene = sample_scene();
    let paths: Vec<_> = scene.paths().map(NodePath::as_str).collect();
    assert_eq!(
        paths,
        ["|group1", "|group10", "|group1|hidden", "|group1|pCube1"]
    );
    assert!(!scene.node(&NodePath::new("|group1|hidden")).unwrap().visible);
}

#[test]
fn subtree_does_not_leak_into_sibling_prefixes() {
    let scene = sample_scene();
    let root = NodePath::new("group1");
    let sub: Vec<_> = scene.subtree(&root).map(NodePath::as_str).collect();
    assert_eq!(sub, ["|group1", "|group1|hidden", "|group1|pCube1"]);
}

#[test]
fn translate_is_interpolated_and_clamped() {
    let scene = sample_scene();
    let cube = scene.node(&NodePath::new("|group1|pCube1")).unwrap();
    assert!(cube.is_animated());
    assert_eq!(cube.translate_at(-5.0), [0.0, 0.0, 0.0]);
    assert_eq!(cube.translate_at(2.5), [2.5, 0.0, 0.0]);
    assert_eq!(cube.translate_at(99.0), [10.0, 0.0, 0.0]);
}

#[test]
fn invalid_documents_are_rejected() {
    let dup = doc(r#"{ "nodes": [ { "name": "a" }, { "name": "a" } ] }"#);
    assert!(matches!(
        Scene::from_document(dup),
        Err(UsdExportError::Validation(_))
    ));
    let bad_name = doc(r#"{ "nodes": [ { "name": "a|b" } ] }"#);
    assert!(Scene::from_document(bad_name).is_err());
    let empty_name = doc(r#"{ "nodes": [ { "name": "" } ] }"#);
    assert!(Scene::from_document(empty_name).is_err());
}

#[test]
fn missing_file_reports_path() {
    let err = Scene::from_path("target/does/not/exist.json").unwrap_err();
    assert!(err.to_string().contains("exist.json"));
}

#[test]
fn host_serves_selection_roots_and_time() {
    let mut host = SceneDocumentHost::new(Arc::new(sample_scene()));
    assert_eq!(host.current_time(), 4.0);
    assert_eq!(
        host.active_selection(),
        [NodePath::new("|group1|pCube1")]
    );
    assert_eq!(
        host.root_nodes(),
        [NodePath::new("group1"), NodePath::new("group10")]
    );
    host.view_frame(7.0);
    assert_eq!(host.current_time(), 7.0);
    assert!(host.resolve_full_path("x.usda").ends_with("x.usda"));
}

#[test]
fn host_interrupts_only_inside_a_computation() {
    let mut host = SceneDocumentHost::new(Arc::new(sample_scene()));
    assert!(!host.is_interrupt_requested());
    host.begin_computation();
    assert!(!host.is_interrupt_requested());
    assert!(host.is_interrupt_requested());
    host.end_computation();
    assert!(!host.is_interrupt_requested());
}
