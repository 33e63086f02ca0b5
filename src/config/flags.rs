//! Command flag table and the tokenizer that turns an argument vector into an [`ArgDatabase`].
//!
//! Flags use host command syntax: a single dash followed by either the short or the long name
//! (`-f out.usda`, `-file out.usda`). Everything that is neither a flag nor a flag argument is a
//! positional object (a node name or DAG path).

use crate::foundation::error::{UsdExportError, UsdExportResult};

/// Type of a single flag argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgType {
    /// `true/false`, `on/off`, `yes/no`, `1/0`.
    Bool,
    /// Finite floating point number.
    Double,
    /// Any token, taken verbatim.
    String,
}

/// Declaration of one flag.
#[derive(Clone, Copy, Debug)]
pub struct FlagSpec {
    /// Short name without the dash (`fr`).
    pub short: &'static str,
    /// Long name without the dash (`frameRange`). This is the lookup key in [`ArgDatabase`].
    pub long: &'static str,
    /// Argument types, in order. Empty for switches.
    pub args: &'static [ArgType],
    /// Whether the flag may appear more than once.
    pub multi_use: bool,
}

const fn flag(short: &'static str, long: &'static str, args: &'static [ArgType]) -> FlagSpec {
    FlagSpec {
        short,
        long,
        args,
        multi_use: false,
    }
}

const fn multi(short: &'static str, long: &'static str, args: &'static [ArgType]) -> FlagSpec {
    FlagSpec {
        short,
        long,
        args,
        multi_use: true,
    }
}

const NONE: &[ArgType] = &[];
const BOOL: &[ArgType] = &[ArgType::Bool];
const DOUBLE: &[ArgType] = &[ArgType::Double];
const STRING: &[ArgType] = &[ArgType::String];

const EXPORT_FLAGS: &[FlagSpec] = &[
    flag("v", "verbose", NONE),
    flag("mt", "mergeTransformAndShape", BOOL),
    flag("ein", "exportInstances", BOOL),
    flag("eri", "exportRefsAsInstanceable", BOOL),
    flag("dsp", "exportDisplayColor", BOOL),
    flag("shd", "shadingMode", STRING),
    flag("uvs", "exportUVs", BOOL),
    flag("mcs", "exportMaterialCollections", BOOL),
    flag("mcp", "materialCollectionsPath", STRING),
    flag("cbb", "exportCollectionBasedBindings", BOOL),
    flag("nuv", "normalizeMeshUVs", BOOL),
    flag("nnu", "normalizeNurbs", BOOL),
    flag("euv", "nurbsExplicitUVType", STRING),
    flag("cls", "exportColorSets", BOOL),
    flag("dms", "defaultMeshScheme", STRING),
    flag("vis", "exportVisibility", BOOL),
    flag("skn", "exportSkin", STRING),
    flag("fr", "frameRange", &[ArgType::Double, ArgType::Double]),
    flag("pr", "preRoll", DOUBLE),
    multi("fs", "frameSample", DOUBLE),
    flag("ro", "renderableOnly", NONE),
    flag("sl", "selection", NONE),
    flag("dc", "defaultCameras", NONE),
    flag("rlm", "renderLayerMode", STRING),
    flag("a", "append", BOOL),
    flag("f", "file", STRING),
    multi("chr", "chaser", STRING),
    multi(
        "cha",
        "chaserArgs",
        &[ArgType::String, ArgType::String, ArgType::String],
    ),
    flag("k", "kind", STRING),
    flag("mfc", "melPerFrameCallback", STRING),
    flag("pfc", "pythonPerFrameCallback", STRING),
    flag("mpc", "melPostJobCallback", STRING),
    flag("ppc", "pythonPostJobCallback", STRING),
];

/// A parsed flag argument.
#[derive(Clone, Debug, PartialEq)]
pub enum FlagValue {
    /// Boolean argument.
    Bool(bool),
    /// Double argument.
    Double(f64),
    /// String argument.
    String(String),
}

/// Declared flag table of a command.
#[derive(Clone, Debug)]
pub struct FlagSyntax {
    flags: &'static [FlagSpec],
}

impl FlagSyntax {
    /// The flag table of the export command.
    pub fn usd_export() -> Self {
        Self {
            flags: EXPORT_FLAGS,
        }
    }

    /// All declared flags.
    pub fn flags(&self) -> &[FlagSpec] {
        self.flags
    }

    /// Find a flag by short or long name (without the dash).
    pub fn lookup(&self, name: &str) -> Option<&FlagSpec> {
        self.flags
            .iter()
            .find(|f| f.long == name || f.short == name)
    }

    /// Tokenize `args` against this table.
    pub fn parse<S: AsRef<str>>(&self, args: &[S]) -> UsdExportResult<ArgDatabase> {
        let mut db = ArgDatabase::default();
        let mut tokens = args.iter().map(|s| s.as_ref());

        while let Some(token) = tokens.next() {
            let Some(name) = flag_name(token) else {
                db.objects.push(token.to_owned());
                continue;
            };
            let spec = self
                .lookup(name)
                .ok_or_else(|| UsdExportError::syntax(format!("unknown flag '{token}'")))?;

            let mut values = Vec::with_capacity(spec.args.len());
            for ty in spec.args {
                let raw = tokens.next().ok_or_else(|| {
                    UsdExportError::syntax(format!(
                        "flag '-{}' expects {} argument(s)",
                        spec.long,
                        spec.args.len()
                    ))
                })?;
                values.push(parse_value(spec, *ty, raw)?);
            }

            if !spec.multi_use {
                db.uses.retain(|u| u.flag != spec.long);
            }
            db.uses.push(FlagUse {
                flag: spec.long,
                args: values,
            });
        }

        Ok(db)
    }
}

fn flag_name(token: &str) -> Option<&str> {
    let rest = token.strip_prefix('-')?;
    rest.chars()
        .next()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|_| rest)
}

fn parse_value(spec: &FlagSpec, ty: ArgType, raw: &str) -> UsdExportResult<FlagValue> {
    match ty {
        ArgType::String => Ok(FlagValue::String(raw.to_owned())),
        ArgType::Bool => parse_bool(raw).map(FlagValue::Bool).ok_or_else(|| {
            UsdExportError::syntax(format!(
                "flag '-{}' expects a boolean, got '{raw}'",
                spec.long
            ))
        }),
        ArgType::Double => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(FlagValue::Double(v)),
            _ => Err(UsdExportError::syntax(format!(
                "flag '-{}' expects a number, got '{raw}'",
                spec.long
            ))),
        },
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    const TRUE: [&str; 4] = ["true", "on", "yes", "1"];
    const FALSE: [&str; 4] = ["false", "off", "no", "0"];
    if TRUE.iter().any(|t| raw.eq_ignore_ascii_case(t)) {
        Some(true)
    } else if FALSE.iter().any(|t| raw.eq_ignore_ascii_case(t)) {
        Some(false)
    } else {
        None
    }
}

#[derive(Clone, Debug, PartialEq)]
struct FlagUse {
    flag: &'static str,
    args: Vec<FlagValue>,
}

/// Ordered flag bag produced by [`FlagSyntax::parse`].
///
/// Lookups use long flag names. Names that were never declared simply read as unset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArgDatabase {
    uses: Vec<FlagUse>,
    objects: Vec<String>,
}

impl ArgDatabase {
    /// Whether `flag` appeared at least once.
    pub fn is_flag_set(&self, flag: &str) -> bool {
        self.uses.iter().any(|u| u.flag == flag)
    }

    /// How many times `flag` appeared.
    pub fn number_of_flag_uses(&self, flag: &str) -> usize {
        self.uses.iter().filter(|u| u.flag == flag).count()
    }

    /// Arguments of the `index`-th use of `flag`.
    pub fn flag_argument_list(&self, flag: &str, index: usize) -> Option<&[FlagValue]> {
        self.uses
            .iter()
            .filter(|u| u.flag == flag)
            .nth(index)
            .map(|u| u.args.as_slice())
    }

    /// Argument lists of every use of `flag`, in command-line order.
    pub fn flag_uses<'a>(&'a self, flag: &'a str) -> impl Iterator<Item = &'a [FlagValue]> + 'a {
        self.uses
            .iter()
            .filter(move |u| u.flag == flag)
            .map(|u| u.args.as_slice())
    }

    fn last_argument(&self, flag: &str, index: usize) -> Option<&FlagValue> {
        self.uses
            .iter()
            .rev()
            .find(|u| u.flag == flag)
            .and_then(|u| u.args.get(index))
    }

    /// Boolean argument `index` of `flag`, if set with that type.
    pub fn bool_argument(&self, flag: &str, index: usize) -> Option<bool> {
        match self.last_argument(flag, index)? {
            FlagValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Double argument `index` of `flag`, if set with that type.
    pub fn double_argument(&self, flag: &str, index: usize) -> Option<f64> {
        match self.last_argument(flag, index)? {
            FlagValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// String argument `index` of `flag`, if set with that type.
    pub fn string_argument(&self, flag: &str, index: usize) -> Option<&str> {
        match self.last_argument(flag, index)? {
            FlagValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Positional objects in command-line order.
    pub fn objects(&self) -> &[String] {
        &self.objects
    }
}

impl FlagValue {
    /// String payload, if this is a string argument.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Double payload, if this is a double argument.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FlagValue::Double(v) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/flags.rs"]
mod tests;
