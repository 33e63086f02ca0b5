use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use crate::foundation::core::NodePath;

/// Canonical shading mode names.
pub mod shading_mode {
    /// Export display colors only.
    pub const DISPLAY_COLOR: &str = "displayColor";
    /// RenderMan for Maya shader networks.
    pub const PXR_RIS: &str = "pxrRis";
    /// No shading export.
    pub const NONE: &str = "none";
}

/// Subdivision scheme written on meshes that carry no explicit scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MeshScheme {
    /// Polygonal, no subdivision.
    None,
    /// Catmull-Clark subdivision.
    #[default]
    CatmullClark,
    /// Loop subdivision.
    Loop,
    /// Bilinear subdivision.
    Bilinear,
}

impl MeshScheme {
    /// Parse an exact, case-sensitive token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "none" => Some(Self::None),
            "catmullClark" => Some(Self::CatmullClark),
            "loop" => Some(Self::Loop),
            "bilinear" => Some(Self::Bilinear),
            _ => None,
        }
    }

    /// Token as written to USD.
    pub fn as_token(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::CatmullClark => "catmullClark",
            Self::Loop => "loop",
            Self::Bilinear => "bilinear",
        }
    }
}

/// Interpolation of explicit NURBS UVs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NurbsExplicitUvType {
    /// Per-vertex UVs.
    #[default]
    Vertex,
    /// Uniform UVs.
    Uniform,
}

impl NurbsExplicitUvType {
    /// Parse an exact, case-sensitive token. Only `uniform` is selectable from the command line.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "uniform" => Some(Self::Uniform),
            _ => None,
        }
    }

    /// Token as written to USD.
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Uniform => "uniform",
        }
    }
}

/// How render layers are handled during export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderLayerMode {
    /// Switch to the default render layer for the export.
    #[default]
    DefaultLayer,
    /// Export whatever layer is current.
    CurrentLayer,
    /// Author one modeling variant per render layer.
    ModelingVariant,
}

impl RenderLayerMode {
    /// Parse an exact, case-sensitive token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "defaultLayer" => Some(Self::DefaultLayer),
            "currentLayer" => Some(Self::CurrentLayer),
            "modelingVariant" => Some(Self::ModelingVariant),
            _ => None,
        }
    }

    /// Canonical token.
    pub fn as_token(self) -> &'static str {
        match self {
            Self::DefaultLayer => "defaultLayer",
            Self::CurrentLayer => "currentLayer",
            Self::ModelingVariant => "modelingVariant",
        }
    }
}

/// Skin and skeleton export mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkinExportMode {
    /// No skinning.
    #[default]
    None,
    /// Export skinning and create skeleton roots automatically.
    Auto,
    /// Export skinning under explicitly authored skeleton roots.
    Explicit,
}

impl SkinExportMode {
    /// Parse an exact, case-sensitive token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "none" => Some(Self::None),
            "auto" => Some(Self::Auto),
            "explicit" => Some(Self::Explicit),
            _ => None,
        }
    }

    /// Whether any skinning is exported.
    pub fn exports_skin(self) -> bool {
        self != Self::None
    }

    /// Whether skeleton roots are created automatically.
    pub fn auto_skel_roots(self) -> bool {
        self == Self::Auto
    }
}

/// Scripting dialect of a callback expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptDialect {
    /// Host command language.
    Mel,
    /// Python.
    Python,
}

impl fmt::Display for ScriptDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mel => "mel",
            Self::Python => "python",
        })
    }
}

/// Callback expressions, one slot per dialect. Empty strings mean "no callback".
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Callbacks {
    /// Host command run after every evaluated instant.
    pub mel_per_frame: String,
    /// Python run after every evaluated instant.
    pub python_per_frame: String,
    /// Host command run once the layer is written.
    pub mel_post_job: String,
    /// Python run once the layer is written.
    pub python_post_job: String,
}

impl Callbacks {
    /// Non-empty per-frame callbacks, mel first.
    pub fn per_frame(&self) -> impl Iterator<Item = (ScriptDialect, &str)> {
        non_empty(&self.mel_per_frame, &self.python_per_frame)
    }

    /// Non-empty post-job callbacks, mel first.
    pub fn post_job(&self) -> impl Iterator<Item = (ScriptDialect, &str)> {
        non_empty(&self.mel_post_job, &self.python_post_job)
    }
}

fn non_empty<'a>(mel: &'a str, python: &'a str) -> impl Iterator<Item = (ScriptDialect, &'a str)> {
    [(ScriptDialect::Mel, mel), (ScriptDialect::Python, python)]
        .into_iter()
        .filter(|(_, src)| !src.is_empty())
}

/// Validated export configuration.
///
/// Every enumerated field holds a value from its closed domain; invalid input has already been
/// replaced by its fallback by the time an `ExportOptions` exists.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ExportOptions {
    /// Collapse a transform and its single shape into one prim.
    pub merge_transform_and_shape: bool,
    /// Export host instances as USD instances.
    pub export_instances: bool,
    /// Mark referenced assets instanceable.
    pub export_refs_as_instanceable: bool,
    /// Author `displayColor` primvars.
    pub export_display_color: bool,
    /// Registered shading exporter name or `none`.
    pub shading_mode: String,
    /// Export mesh UV sets.
    pub export_mesh_uvs: bool,
    /// Export explicit NURBS UVs. Driven by the same flag as `export_mesh_uvs`.
    pub export_nurbs_explicit_uv: bool,
    /// Interpolation of explicit NURBS UVs.
    pub nurbs_explicit_uv_type: NurbsExplicitUvType,
    /// Normalize mesh UVs into the unit square.
    pub normalize_mesh_uvs: bool,
    /// Normalize NURBS parameterization.
    pub normalize_nurbs: bool,
    /// Export color sets.
    pub export_color_sets: bool,
    /// Scheme for meshes without an explicit one.
    pub default_mesh_scheme: MeshScheme,
    /// Author visibility.
    pub export_visibility: bool,
    /// Skin export mode.
    pub skin: SkinExportMode,
    /// Export material assignments as collections.
    pub export_material_collections: bool,
    /// Prim path that owns the material collections.
    pub material_collections_path: String,
    /// Bind materials through collections instead of direct bindings.
    pub export_collection_based_bindings: bool,
    /// Skip invisible nodes.
    pub exclude_invisible: bool,
    /// Export the default persp/top/front/side cameras.
    pub export_default_cameras: bool,
    /// Render layer handling.
    pub render_layer_mode: RenderLayerMode,
    /// `kind` authored on root prims. Empty for none.
    pub root_kind: String,
    /// Per-frame and post-job callbacks.
    pub callbacks: Callbacks,
    /// Chasers to run, in order. Duplicates are kept.
    pub chaser_names: Vec<String>,
    /// Arguments per chaser. Keys are always present in `chaser_names`.
    pub chaser_args: BTreeMap<String, BTreeMap<String, String>>,
    /// True iff a frame range was given, even a single-frame one.
    pub export_animation: bool,
    /// Nodes to export.
    pub targets: BTreeSet<NodePath>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            merge_transform_and_shape: true,
            export_instances: true,
            export_refs_as_instanceable: false,
            export_display_color: true,
            shading_mode: shading_mode::DISPLAY_COLOR.to_owned(),
            export_mesh_uvs: true,
            export_nurbs_explicit_uv: true,
            nurbs_explicit_uv_type: NurbsExplicitUvType::default(),
            normalize_mesh_uvs: false,
            normalize_nurbs: false,
            export_color_sets: true,
            default_mesh_scheme: MeshScheme::default(),
            export_visibility: true,
            skin: SkinExportMode::default(),
            export_material_collections: false,
            material_collections_path: String::new(),
            export_collection_based_bindings: false,
            exclude_invisible: false,
            export_default_cameras: false,
            render_layer_mode: RenderLayerMode::default(),
            root_kind: String::new(),
            callbacks: Callbacks::default(),
            chaser_names: Vec::new(),
            chaser_args: BTreeMap::new(),
            export_animation: false,
            targets: BTreeSet::new(),
        }
    }
}

/// Sub-frame sample offsets, deduplicated and kept in ascending order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct FrameSamples(Vec<f64>);

impl FrameSamples {
    /// Build from arbitrary offsets. An empty input yields `{0.0}`.
    pub fn new(offsets: impl IntoIterator<Item = f64>) -> Self {
        let mut v: Vec<f64> = offsets.into_iter().collect();
        v.sort_by(f64::total_cmp);
        v.dedup();
        if v.is_empty() {
            v.push(0.0);
        }
        Self(v)
    }

    /// Offsets in ascending order.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl Default for FrameSamples {
    fn default() -> Self {
        Self(vec![0.0])
    }
}

/// Parameters handed to the job driver alongside [`ExportOptions`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct JobParams {
    /// Output layer path, absolute when the host could resolve it.
    pub file: PathBuf,
    /// Add to an existing layer instead of replacing it.
    pub append: bool,
    /// First frame of the range.
    pub start_time: f64,
    /// Last frame of the range, inclusive.
    pub end_time: f64,
    /// Frames visited before `start_time` without capturing samples.
    pub pre_roll: f64,
    /// Sub-frame offsets applied to every frame.
    pub frame_samples: FrameSamples,
    /// Report every evaluated instant.
    pub verbose: bool,
}

impl JobParams {
    /// Parameters for a static export to `file`.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            append: false,
            start_time: 1.0,
            end_time: 1.0,
            pre_roll: 0.0,
            frame_samples: FrameSamples::default(),
            verbose: false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/options.rs"]
mod tests;
