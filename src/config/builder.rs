use std::path::PathBuf;

use crate::config::flags::ArgDatabase;
use crate::config::options::{
    ExportOptions, FrameSamples, JobParams, MeshScheme, NurbsExplicitUvType, RenderLayerMode,
    SkinExportMode, shading_mode,
};
use crate::config::shading::ShadingModeRegistry;
use crate::foundation::core::Diagnostic;
use crate::foundation::error::{UsdExportError, UsdExportResult};
use crate::host::PathResolver;

/// Result of [`build_export_config`]: validated options, driver parameters and the diagnostics
/// produced while resolving fallbacks, in the order they arose.
#[derive(Clone, Debug)]
pub struct ExportConfig {
    /// Export options. `targets` is left empty for the selection resolver to fill.
    pub options: ExportOptions,
    /// Output and frame-loop parameters.
    pub job: JobParams,
    /// Non-terminal messages to show the user.
    pub diagnostics: Vec<Diagnostic>,
}

/// Translate a parsed flag bag into a validated configuration.
///
/// Only a missing or empty output path is terminal. Every enumerated flag with an unknown value is
/// replaced by its fallback and reported through `diagnostics`.
#[tracing::instrument(skip_all)]
pub fn build_export_config(
    db: &ArgDatabase,
    registry: &ShadingModeRegistry,
    resolver: &dyn PathResolver,
) -> UsdExportResult<ExportConfig> {
    let mut diags = Vec::new();

    let Some(raw_file) = db.string_argument("file", 0) else {
        return Err(UsdExportError::validation("-file not specified."));
    };
    let file = resolve_output_path(raw_file, resolver);
    if file.is_empty() {
        return Err(UsdExportError::validation(
            "-file resolved to an empty path.",
        ));
    }
    diags.push(Diagnostic::info(format!("Saving as {file}")));

    let mut o = ExportOptions::default();

    read_bool(db, "mergeTransformAndShape", &mut o.merge_transform_and_shape);
    read_bool(db, "exportInstances", &mut o.export_instances);
    read_bool(db, "exportRefsAsInstanceable", &mut o.export_refs_as_instanceable);
    read_bool(db, "exportDisplayColor", &mut o.export_display_color);

    if let Some(raw) = db.string_argument("shadingMode", 0) {
        o.shading_mode = resolve_shading_mode(raw, registry, &mut diags);
    }

    if let Some(v) = db.bool_argument("exportUVs", 0) {
        o.export_mesh_uvs = v;
        o.export_nurbs_explicit_uv = v;
    }

    read_bool(db, "exportMaterialCollections", &mut o.export_material_collections);
    if let Some(v) = db.string_argument("materialCollectionsPath", 0) {
        o.material_collections_path = v.to_owned();
    }
    read_bool(
        db,
        "exportCollectionBasedBindings",
        &mut o.export_collection_based_bindings,
    );
    read_bool(db, "normalizeMeshUVs", &mut o.normalize_mesh_uvs);
    read_bool(db, "normalizeNurbs", &mut o.normalize_nurbs);

    if let Some(raw) = db.string_argument("nurbsExplicitUVType", 0) {
        match NurbsExplicitUvType::from_token(raw) {
            Some(v) => o.nurbs_explicit_uv_type = v,
            None => diags.push(Diagnostic::warning(format!(
                "Incorrect NURBS explicit UV type: {raw} defaulting to: {}",
                o.nurbs_explicit_uv_type.as_token()
            ))),
        }
    }

    read_bool(db, "exportColorSets", &mut o.export_color_sets);

    if let Some(raw) = db.string_argument("defaultMeshScheme", 0) {
        match MeshScheme::from_token(raw) {
            Some(v) => o.default_mesh_scheme = v,
            None => diags.push(Diagnostic::warning(format!(
                "Incorrect Default Mesh Schema: {raw} defaulting to: {}",
                o.default_mesh_scheme.as_token()
            ))),
        }
    }

    read_bool(db, "exportVisibility", &mut o.export_visibility);

    if let Some(raw) = db.string_argument("exportSkin", 0) {
        o.skin = SkinExportMode::from_token(raw).unwrap_or_else(|| {
            diags.push(Diagnostic::warning(
                "Incorrect value for -exportSkin flag; assuming '-exportSkin none'",
            ));
            SkinExportMode::None
        });
    }

    let mut job = JobParams::new(PathBuf::from(file));
    if let Some(v) = db.bool_argument("append", 0) {
        job.append = v;
    }

    // A frame range makes this an animated export even when start == end.
    if db.is_flag_set("frameRange") {
        job.start_time = db.double_argument("frameRange", 0).unwrap_or(job.start_time);
        job.end_time = db.double_argument("frameRange", 1).unwrap_or(job.end_time);
        o.export_animation = true;
    }
    if let Some(v) = db.double_argument("preRoll", 0) {
        job.pre_roll = v;
    }
    job.frame_samples = FrameSamples::new(
        db.flag_uses("frameSample")
            .filter_map(|args| args.first().and_then(|v| v.as_f64())),
    );
    job.verbose = db.is_flag_set("verbose");

    o.exclude_invisible = db.is_flag_set("renderableOnly");
    o.export_default_cameras = db.is_flag_set("defaultCameras");

    if let Some(raw) = db.string_argument("renderLayerMode", 0) {
        o.render_layer_mode = if raw.is_empty() {
            RenderLayerMode::DefaultLayer
        } else {
            RenderLayerMode::from_token(raw).unwrap_or_else(|| {
                diags.push(Diagnostic::error(format!(
                    "Invalid renderLayerMode '{raw}'.  Setting renderLayerMode='defaultLayer'"
                )));
                RenderLayerMode::DefaultLayer
            })
        };
    }

    read_string(db, "melPerFrameCallback", &mut o.callbacks.mel_per_frame);
    read_string(db, "pythonPerFrameCallback", &mut o.callbacks.python_per_frame);
    read_string(db, "melPostJobCallback", &mut o.callbacks.mel_post_job);
    read_string(db, "pythonPostJobCallback", &mut o.callbacks.python_post_job);

    o.chaser_names = db
        .flag_uses("chaser")
        .filter_map(|args| args.first().and_then(|v| v.as_str()))
        .map(str::to_owned)
        .collect();

    for args in db.flag_uses("chaserArgs") {
        let [chaser, name, value] = args else {
            continue;
        };
        let (Some(chaser), Some(name), Some(value)) =
            (chaser.as_str(), name.as_str(), value.as_str())
        else {
            continue;
        };
        if o.chaser_names.iter().any(|c| c == chaser) {
            o.chaser_args
                .entry(chaser.to_owned())
                .or_default()
                .insert(name.to_owned(), value.to_owned());
        } else {
            diags.push(Diagnostic::warning(format!(
                "Bad chaserArg for unknown chaser: '{chaser}'"
            )));
        }
    }

    read_string(db, "kind", &mut o.root_kind);

    tracing::debug!(
        file = %job.file.display(),
        animated = o.export_animation,
        shading_mode = %o.shading_mode,
        diagnostics = diags.len(),
        "export options built"
    );

    Ok(ExportConfig {
        options: o,
        job,
        diagnostics: diags,
    })
}

/// Absolute form of `raw`, falling back to `raw` itself when the host resolves it to nothing.
pub fn resolve_output_path(raw: &str, resolver: &dyn PathResolver) -> String {
    let resolved = resolver.resolve_full_path(raw);
    if resolved.is_empty() {
        raw.to_owned()
    } else {
        resolved
    }
}

/// Normalize legacy aliases and check the result against `registry`.
pub fn resolve_shading_mode(
    raw: &str,
    registry: &ShadingModeRegistry,
    diags: &mut Vec<Diagnostic>,
) -> String {
    if raw.is_empty() {
        return shading_mode::DISPLAY_COLOR.to_owned();
    }
    let name = match raw {
        "Material Colors" => shading_mode::DISPLAY_COLOR,
        "RfM Shaders" => shading_mode::PXR_RIS,
        other => other,
    };
    if registry.has_exporter(name) {
        return name.to_owned();
    }
    if name != shading_mode::NONE {
        diags.push(Diagnostic::error(format!(
            "No shadingMode '{name}' found.  Setting shadingMode='none'"
        )));
    }
    shading_mode::NONE.to_owned()
}

fn read_bool(db: &ArgDatabase, flag: &str, slot: &mut bool) {
    if let Some(v) = db.bool_argument(flag, 0) {
        *slot = v;
    }
}

fn read_string(db: &ArgDatabase, flag: &str, slot: &mut String) {
    if let Some(v) = db.string_argument(flag, 0) {
        *slot = v.to_owned();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/builder.rs"]
mod tests;
