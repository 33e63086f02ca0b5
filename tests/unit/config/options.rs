use super::*;

#[test]
fn defaults_match_the_documented_compiled_in_values() {
    let o = ExportOptions::default();
    assert!(o.merge_transform_and_shape);
    assert!(o.export_instances);
    assert!(!o.export_refs_as_instanceable);
    assert_eq!(o.shading_mode, shading_mode::DISPLAY_COLOR);
    assert_eq!(o.default_mesh_scheme, MeshScheme::CatmullClark);
    assert_eq!(o.render_layer_mode, RenderLayerMode::DefaultLayer);
    assert_eq!(o.skin, SkinExportMode::None);
    assert_eq!(o.nurbs_explicit_uv_type, NurbsExplicitUvType::Vertex);
    assert!(!o.export_animation);
    assert!(o.targets.is_empty());
}

#[test]
fn enum_tokens_are_case_sensitive() {
    assert_eq!(MeshScheme::from_token("loop"), Some(MeshScheme::Loop));
    assert_eq!(MeshScheme::from_token("Loop"), None);
    assert_eq!(
        RenderLayerMode::from_token("modelingVariant"),
        Some(RenderLayerMode::ModelingVariant)
    );
    assert_eq!(RenderLayerMode::from_token("defaultlayer"), None);
    assert_eq!(SkinExportMode::from_token("AUTO"), None);
    assert_eq!(
        NurbsExplicitUvType::from_token("uniform"),
        Some(NurbsExplicitUvType::Uniform)
    );
    assert_eq!(NurbsExplicitUvType::from_token("vertex"), None);
}

#[test]
fn skin_modes_drive_skin_and_skel_root_toggles() {
    assert!(!SkinExportMode::None.exports_skin());
    assert!(SkinExportMode::Auto.exports_skin());
    assert!(SkinExportMode::Auto.auto_skel_roots());
    assert!(SkinExportMode::Explicit.exports_skin());
    assert!(!SkinExportMode::Explicit.auto_skel_roots());
}

#[test]
fn frame_samples_sort_dedup_and_default() {
    let s = FrameSamples::new([0.5, -0.25, 0.5, 0.0]);
    assert_eq!(s.as_slice(), [-0.25, 0.0, 0.5]);
    assert_eq!(FrameSamples::new([]).as_slice(), [0.0]);
    assert_eq!(FrameSamples::default(), FrameSamples::new(Vec::new()));
}

#[test]
fn callbacks_skip_empty_slots() {
    let cb = Callbacks {
        python_per_frame: "print('f')".to_owned(),
        mel_post_job: "refresh".to_owned(),
        ..Callbacks::default()
    };
    let per_frame: Vec<_> = cb.per_frame().collect();
    assert_eq!(per_frame, [(ScriptDialect::Python, "print('f')")]);
    let post: Vec<_> = cb.post_job().collect();
    assert_eq!(post, [(ScriptDialect::Mel, "refresh")]);
}

#[test]
fn options_serialize_with_camel_case_tokens() {
    let o = ExportOptions {
        default_mesh_scheme: MeshScheme::CatmullClark,
        ..ExportOptions::default()
    };
    let v = serde_json::to_value(&o).unwrap();
    assert_eq!(v["default_mesh_scheme"], "catmullClark");
    assert_eq!(v["render_layer_mode"], "defaultLayer");
}
