use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Layer-level metadata written in the `#usda` header block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerMetadata {
    /// Prim targeted by references that do not name one.
    pub default_prim: Option<String>,
    /// `startTimeCode` / `endTimeCode`, present for animated exports.
    pub time_range: Option<(f64, f64)>,
    /// String entries of `customLayerData`, sorted by key.
    pub custom_strings: BTreeMap<String, String>,
    /// Chaser names, in run order.
    pub chasers: Vec<String>,
    /// Chaser arguments.
    pub chaser_args: BTreeMap<String, BTreeMap<String, String>>,
}

/// One `def Xform` prim.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Prim {
    /// `kind` metadata.
    pub kind: Option<String>,
    /// Default translation. `None` for pure containers.
    pub translate: Option<[f64; 3]>,
    /// Time-sampled translation, in evaluation order.
    pub translate_samples: Vec<(f64, [f64; 3])>,
    /// Authored visibility: `true` → `inherited`, `false` → `invisible`.
    pub visibility: Option<bool>,
    /// Child prims by name.
    pub children: BTreeMap<String, Prim>,
}

/// In-memory text layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UsdaLayer {
    /// Header metadata.
    pub metadata: LayerMetadata,
    /// Root prims by name.
    pub roots: BTreeMap<String, Prim>,
}

impl UsdaLayer {
    /// Get or create the prim at `names`, creating containers on the way.
    pub fn define(&mut self, names: &[String]) -> Option<&mut Prim> {
        let (first, rest) = names.split_first()?;
        let mut prim = self.roots.entry(first.clone()).or_default();
        for name in rest {
            prim = prim.children.entry(name.clone()).or_default();
        }
        Some(prim)
    }

    /// Existing prim at `names`.
    pub fn prim_mut(&mut self, names: &[String]) -> Option<&mut Prim> {
        let (first, rest) = names.split_first()?;
        let mut prim = self.roots.get_mut(first)?;
        for name in rest {
            prim = prim.children.get_mut(name)?;
        }
        Some(prim)
    }

    /// Full layer text, header included.
    pub fn to_text(&self) -> String {
        let mut out = String::from("#usda 1.0\n");
        self.write_header(&mut out);
        out.push_str(&self.prims_text());
        out
    }

    /// Prim definitions only, for appending to an existing layer.
    pub fn prims_text(&self) -> String {
        let mut out = String::new();
        for (name, prim) in &self.roots {
            out.push('\n');
            write_prim(&mut out, name, prim, 0);
        }
        out
    }

    fn write_header(&self, out: &mut String) {
        let m = &self.metadata;
        out.push_str("(\n");
        let has_custom = !m.custom_strings.is_empty() || !m.chasers.is_empty();
        if has_custom {
            out.push_str("    customLayerData = {\n");
            if !m.chaser_args.is_empty() {
                out.push_str("        dictionary chaserArgs = {\n");
                for (chaser, args) in &m.chaser_args {
                    let _ = writeln!(out, "            dictionary {} = {{", quote_key(chaser));
                    for (k, v) in args {
                        let _ = writeln!(
                            out,
                            "                string {} = {}",
                            quote_key(k),
                            quote(v)
                        );
                    }
                    out.push_str("            }\n");
                }
                out.push_str("        }\n");
            }
            if !m.chasers.is_empty() {
                let list: Vec<String> = m.chasers.iter().map(|c| quote(c)).collect();
                let _ = writeln!(out, "        string[] chasers = [{}]", list.join(", "));
            }
            for (k, v) in &m.custom_strings {
                let _ = writeln!(out, "        string {} = {}", quote_key(k), quote(v));
            }
            out.push_str("    }\n");
        }
        if let Some(name) = &m.default_prim {
            let _ = writeln!(out, "    defaultPrim = {}", quote(name));
        }
        if let Some((start, end)) = m.time_range {
            let _ = writeln!(out, "    endTimeCode = {}", num(end));
            let _ = writeln!(out, "    startTimeCode = {}", num(start));
        }
        out.push_str(")\n");
    }
}

fn write_prim(out: &mut String, name: &str, prim: &Prim, depth: usize) {
    let pad = "    ".repeat(depth);
    match &prim.kind {
        Some(kind) => {
            let _ = writeln!(out, "{pad}def Xform \"{name}\" (");
            let _ = writeln!(out, "{pad}    kind = {}", quote(kind));
            let _ = writeln!(out, "{pad})");
        }
        None => {
            let _ = writeln!(out, "{pad}def Xform \"{name}\"");
        }
    }
    let _ = writeln!(out, "{pad}{{");

    if let Some(v) = prim.visibility {
        let token = if v { "inherited" } else { "invisible" };
        let _ = writeln!(out, "{pad}    token visibility = \"{token}\"");
    }
    if let Some(t) = prim.translate {
        let _ = writeln!(out, "{pad}    double3 xformOp:translate = {}", vec3(t));
        if !prim.translate_samples.is_empty() {
            let _ = writeln!(out, "{pad}    double3 xformOp:translate.timeSamples = {{");
            for (time, v) in dedup_samples(&prim.translate_samples) {
                let _ = writeln!(out, "{pad}        {}: {},", num(time), vec3(v));
            }
            let _ = writeln!(out, "{pad}    }}");
        }
        let _ = writeln!(
            out,
            "{pad}    uniform token[] xformOpOrder = [\"xformOp:translate\"]"
        );
    }

    for (child_name, child) in &prim.children {
        out.push('\n');
        write_prim(out, child_name, child, depth + 1);
    }
    let _ = writeln!(out, "{pad}}}");
}

/// Sorted by time; a repeated time keeps the last captured value.
fn dedup_samples(samples: &[(f64, [f64; 3])]) -> Vec<(f64, [f64; 3])> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut out: Vec<(f64, [f64; 3])> = Vec::with_capacity(sorted.len());
    for s in sorted {
        match out.last_mut() {
            Some(last) if last.0 == s.0 => *last = s,
            _ => out.push(s),
        }
    }
    out
}

fn num(v: f64) -> String {
    format!("{v}")
}

fn vec3(v: [f64; 3]) -> String {
    format!("({}, {}, {})", num(v[0]), num(v[1]), num(v[2]))
}

/// Double-quoted string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn quote_key(s: &str) -> String {
    if is_identifier(s) { s.to_owned() } else { quote(s) }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Valid prim name for a host node name: invalid characters become `_`, and a leading digit gets
/// a `_` prefix.
pub fn prim_name(node_name: &str) -> String {
    let mut out: String = node_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/usda/layer.rs"]
mod tests;
