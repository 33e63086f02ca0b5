use super::*;
use crate::config::flags::FlagSyntax;
use crate::foundation::core::Severity;
use crate::host::MemoryHost;

fn host() -> MemoryHost {
    MemoryHost {
        base_dir: Some(PathBuf::from("/work")),
        ..MemoryHost::default()
    }
}

fn build(args: &[&str]) -> UsdExportResult<ExportConfig> {
    let db = FlagSyntax::usd_export().parse(args)?;
    build_export_config(&db, &ShadingModeRegistry::builtin(), &host())
}

fn build_ok(args: &[&str]) -> ExportConfig {
    let mut full = vec!["-file", "out.usda"];
    full.extend_from_slice(args);
    build(&full).unwrap()
}

fn messages(cfg: &ExportConfig, severity: Severity) -> Vec<&str> {
    cfg.diagnostics
        .iter()
        .filter(|d| d.severity == severity)
        .map(|d| d.message.as_str())
        .collect()
}

#[test]
fn missing_file_is_terminal() {
    let err = build(&["-shadingMode", "displayColor"]).unwrap_err();
    assert!(matches!(err, UsdExportError::Validation(_)));
    assert!(err.to_string().contains("-file not specified."));
}

#[test]
fn file_is_resolved_and_announced() {
    let cfg = build_ok(&[]);
    assert_eq!(cfg.job.file, PathBuf::from("/work/out.usda"));
    assert_eq!(messages(&cfg, Severity::Info), ["Saving as /work/out.usda"]);
}

#[test]
fn unresolvable_file_falls_back_to_raw_string() {
    let db = FlagSyntax::usd_export()
        .parse(&["-file", "rel/out.usda"])
        .unwrap();
    let cfg = build_export_config(
        &db,
        &ShadingModeRegistry::builtin(),
        &MemoryHost::default(),
    )
    .unwrap();
    assert_eq!(cfg.job.file, PathBuf::from("rel/out.usda"));
}

#[test]
fn empty_file_is_terminal() {
    let db = FlagSyntax::usd_export().parse(&["-file", ""]).unwrap();
    let err = build_export_config(
        &db,
        &ShadingModeRegistry::builtin(),
        &MemoryHost::default(),
    )
    .unwrap_err();
    assert!(matches!(err, UsdExportError::Validation(_)));
}

#[test]
fn no_flags_keeps_compiled_in_defaults() {
    let cfg = build_ok(&[]);
    let expected = ExportOptions::default();
    assert_eq!(cfg.options, expected);
    assert!(!cfg.job.append);
    assert_eq!((cfg.job.start_time, cfg.job.end_time), (1.0, 1.0));
    assert_eq!(cfg.job.frame_samples.as_slice(), [0.0]);
}

#[test]
fn boolean_toggles_are_applied() {
    let cfg = build_ok(&[
        "-mt", "0", "-ein", "false", "-eri", "true", "-dsp", "off", "-mcs", "on", "-cbb", "yes",
        "-nuv", "1", "-nnu", "1", "-cls", "0", "-vis", "0", "-ro", "-dc", "-a", "true",
    ]);
    let o = &cfg.options;
    assert!(!o.merge_transform_and_shape);
    assert!(!o.export_instances);
    assert!(o.export_refs_as_instanceable);
    assert!(!o.export_display_color);
    assert!(o.export_material_collections);
    assert!(o.export_collection_based_bindings);
    assert!(o.normalize_mesh_uvs);
    assert!(o.normalize_nurbs);
    assert!(!o.export_color_sets);
    assert!(!o.export_visibility);
    assert!(o.exclude_invisible);
    assert!(o.export_default_cameras);
    assert!(cfg.job.append);
}

#[test]
fn export_uvs_drives_mesh_and_nurbs_toggles() {
    let cfg = build_ok(&["-exportUVs", "false"]);
    assert!(!cfg.options.export_mesh_uvs);
    assert!(!cfg.options.export_nurbs_explicit_uv);
}

#[test]
fn material_colors_alias_resolves_to_display_color() {
    let cfg = build_ok(&["-shadingMode", "Material Colors"]);
    assert_eq!(cfg.options.shading_mode, "displayColor");
    assert!(messages(&cfg, Severity::Error).is_empty());
}

#[test]
fn rfm_alias_resolves_to_pxr_ris() {
    let cfg = build_ok(&["-shd", "RfM Shaders"]);
    assert_eq!(cfg.options.shading_mode, "pxrRis");
}

#[test]
fn unknown_shading_mode_errors_and_forces_none() {
    let cfg = build_ok(&["-shd", "arnold"]);
    assert_eq!(cfg.options.shading_mode, "none");
    assert_eq!(
        messages(&cfg, Severity::Error),
        ["No shadingMode 'arnold' found.  Setting shadingMode='none'"]
    );
}

#[test]
fn explicit_none_shading_mode_is_silent() {
    let cfg = build_ok(&["-shd", "none"]);
    assert_eq!(cfg.options.shading_mode, "none");
    assert!(messages(&cfg, Severity::Error).is_empty());
}

#[test]
fn empty_shading_mode_means_display_color() {
    let cfg = build_ok(&["-shd", ""]);
    assert_eq!(cfg.options.shading_mode, "displayColor");
}

#[test]
fn mesh_scheme_valid_and_fallback() {
    let cfg = build_ok(&["-dms", "bilinear"]);
    assert_eq!(cfg.options.default_mesh_scheme, MeshScheme::Bilinear);

    let cfg = build_ok(&["-dms", "CatmullClark"]);
    assert_eq!(cfg.options.default_mesh_scheme, MeshScheme::CatmullClark);
    assert_eq!(
        messages(&cfg, Severity::Warning),
        ["Incorrect Default Mesh Schema: CatmullClark defaulting to: catmullClark"]
    );
}

#[test]
fn nurbs_uv_type_uniform_and_fallback() {
    let cfg = build_ok(&["-euv", "uniform"]);
    assert_eq!(
        cfg.options.nurbs_explicit_uv_type,
        NurbsExplicitUvType::Uniform
    );

    let cfg = build_ok(&["-euv", "wobbly"]);
    assert_eq!(
        cfg.options.nurbs_explicit_uv_type,
        NurbsExplicitUvType::Vertex
    );
    assert_eq!(messages(&cfg, Severity::Warning).len(), 1);
}

#[test]
fn render_layer_mode_invalid_is_an_error_with_fallback() {
    let cfg = build_ok(&["-rlm", "currentLayer"]);
    assert_eq!(cfg.options.render_layer_mode, RenderLayerMode::CurrentLayer);

    let cfg = build_ok(&["-rlm", "everyLayer"]);
    assert_eq!(cfg.options.render_layer_mode, RenderLayerMode::DefaultLayer);
    assert_eq!(
        messages(&cfg, Severity::Error),
        ["Invalid renderLayerMode 'everyLayer'.  Setting renderLayerMode='defaultLayer'"]
    );

    let cfg = build_ok(&["-rlm", ""]);
    assert_eq!(cfg.options.render_layer_mode, RenderLayerMode::DefaultLayer);
    assert!(messages(&cfg, Severity::Error).is_empty());
}

#[test]
fn skin_modes_and_fallback() {
    let cfg = build_ok(&["-skn", "auto"]);
    assert_eq!(cfg.options.skin, SkinExportMode::Auto);
    assert!(cfg.options.skin.auto_skel_roots());

    let cfg = build_ok(&["-skn", "explicit"]);
    assert_eq!(cfg.options.skin, SkinExportMode::Explicit);

    let cfg = build_ok(&["-skn", "always"]);
    assert_eq!(cfg.options.skin, SkinExportMode::None);
    assert_eq!(
        messages(&cfg, Severity::Warning),
        ["Incorrect value for -exportSkin flag; assuming '-exportSkin none'"]
    );
}

#[test]
fn no_frame_range_means_static_export() {
    let cfg = build_ok(&["-fs", "0.5"]);
    assert!(!cfg.options.export_animation);
}

#[test]
fn single_frame_range_is_still_animated() {
    let cfg = build_ok(&["-fr", "5", "5", "-fs", "0.5", "-fs", "0.0", "-fs", "0.5"]);
    assert!(cfg.options.export_animation);
    assert_eq!((cfg.job.start_time, cfg.job.end_time), (5.0, 5.0));
    assert_eq!(cfg.job.frame_samples.as_slice(), [0.0, 0.5]);
}

#[test]
fn pre_roll_and_verbose_are_carried() {
    let cfg = build_ok(&["-fr", "10", "20", "-pr", "3", "-v"]);
    assert_eq!(cfg.job.pre_roll, 3.0);
    assert!(cfg.job.verbose);
}

#[test]
fn chasers_keep_order_and_duplicates() {
    let cfg = build_ok(&["-chr", "b", "-chr", "a", "-chr", "b"]);
    assert_eq!(cfg.options.chaser_names, ["b", "a", "b"]);
}

#[test]
fn chaser_args_for_unknown_chaser_are_dropped_with_warning() {
    let cfg = build_ok(&[
        "-chr", "bake", "-cha", "bake", "step", "1", "-cha", "ghost", "x", "y", "-cha", "bake",
        "step", "2",
    ]);
    let args = &cfg.options.chaser_args;
    assert_eq!(args.len(), 1);
    assert!(!args.contains_key("ghost"));
    assert_eq!(args["bake"]["step"], "2");
    assert_eq!(
        messages(&cfg, Severity::Warning),
        ["Bad chaserArg for unknown chaser: 'ghost'"]
    );
}

#[test]
fn chaser_args_before_their_chaser_flag_still_match() {
    // Chasers are collected from every use before arguments are validated.
    let cfg = build_ok(&["-cha", "late", "k", "v", "-chr", "late"]);
    assert_eq!(cfg.options.chaser_args["late"]["k"], "v");
}

#[test]
fn free_form_strings_are_stored_verbatim() {
    let cfg = build_ok(&[
        "-k",
        "component",
        "-mcp",
        "/Looks",
        "-mfc",
        "print 1",
        "-pfc",
        "print(1)",
        "-mpc",
        "refresh",
        "-ppc",
        "done()",
    ]);
    let o = &cfg.options;
    assert_eq!(o.root_kind, "component");
    assert_eq!(o.material_collections_path, "/Looks");
    assert_eq!(o.callbacks.mel_per_frame, "print 1");
    assert_eq!(o.callbacks.python_per_frame, "print(1)");
    assert_eq!(o.callbacks.mel_post_job, "refresh");
    assert_eq!(o.callbacks.python_post_job, "done()");
}
