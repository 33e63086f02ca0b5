use super::*;

fn parse(args: &[&str]) -> UsdExportResult<ArgDatabase> {
    FlagSyntax::usd_export().parse(args)
}

#[test]
fn short_and_long_names_resolve_to_the_same_flag() {
    let a = parse(&["-f", "out.usda"]).unwrap();
    let b = parse(&["-file", "out.usda"]).unwrap();
    assert_eq!(a.string_argument("file", 0), Some("out.usda"));
    assert_eq!(a, b);
}

#[test]
fn typed_arguments_are_parsed() {
    let db = parse(&["-fr", "1", "24.5", "-uvs", "off", "-a", "yes", "-v"]).unwrap();
    assert_eq!(db.double_argument("frameRange", 0), Some(1.0));
    assert_eq!(db.double_argument("frameRange", 1), Some(24.5));
    assert_eq!(db.bool_argument("exportUVs", 0), Some(false));
    assert_eq!(db.bool_argument("append", 0), Some(true));
    assert!(db.is_flag_set("verbose"));
    assert!(!db.is_flag_set("selection"));
}

#[test]
fn negative_numbers_are_arguments_not_flags() {
    let db = parse(&["-frameRange", "-5", "-1", "-fs", "-0.25"]).unwrap();
    assert_eq!(db.double_argument("frameRange", 0), Some(-5.0));
    assert_eq!(db.double_argument("frameRange", 1), Some(-1.0));
    assert_eq!(db.double_argument("frameSample", 0), Some(-0.25));
}

#[test]
fn multi_use_flags_keep_every_use_in_order() {
    let db = parse(&[
        "-chr", "alembic", "-chaser", "bake", "-chr", "alembic", "-cha", "bake", "step", "2",
    ])
    .unwrap();
    assert_eq!(db.number_of_flag_uses("chaser"), 3);
    let names: Vec<_> = db
        .flag_uses("chaser")
        .filter_map(|args| args[0].as_str())
        .collect();
    assert_eq!(names, ["alembic", "bake", "alembic"]);
    let cha = db.flag_argument_list("chaserArgs", 0).unwrap();
    assert_eq!(cha.len(), 3);
    assert_eq!(cha[2].as_str(), Some("2"));
}

#[test]
fn repeated_single_use_flag_keeps_last_value() {
    let db = parse(&["-k", "component", "-kind", "assembly"]).unwrap();
    assert_eq!(db.number_of_flag_uses("kind"), 1);
    assert_eq!(db.string_argument("kind", 0), Some("assembly"));
}

#[test]
fn positional_tokens_become_objects() {
    let db = parse(&["pCube1", "-f", "a.usda", "|group1|pSphere1"]).unwrap();
    assert_eq!(db.objects(), ["pCube1", "|group1|pSphere1"]);
}

#[test]
fn string_arguments_are_taken_verbatim() {
    let db = parse(&["-shd", "Material Colors", "-mcp", "-odd"]).unwrap();
    assert_eq!(db.string_argument("shadingMode", 0), Some("Material Colors"));
    assert_eq!(db.string_argument("materialCollectionsPath", 0), Some("-odd"));
}

#[test]
fn unknown_flag_is_a_syntax_error() {
    let err = parse(&["-bogus"]).unwrap_err();
    assert!(matches!(err, UsdExportError::Syntax(_)));
    assert!(err.to_string().contains("-bogus"));
}

#[test]
fn missing_and_malformed_arguments_are_syntax_errors() {
    assert!(matches!(
        parse(&["-frameRange", "1"]).unwrap_err(),
        UsdExportError::Syntax(_)
    ));
    assert!(matches!(
        parse(&["-exportUVs", "maybe"]).unwrap_err(),
        UsdExportError::Syntax(_)
    ));
    assert!(matches!(
        parse(&["-preRoll", "soon"]).unwrap_err(),
        UsdExportError::Syntax(_)
    ));
    assert!(matches!(
        parse(&["-preRoll", "inf"]).unwrap_err(),
        UsdExportError::Syntax(_)
    ));
}

#[test]
fn undeclared_names_read_as_unset() {
    let db = parse(&["-f", "a.usda"]).unwrap();
    assert!(!db.is_flag_set("notAFlag"));
    assert_eq!(db.string_argument("notAFlag", 0), None);
    assert_eq!(db.flag_argument_list("file", 1), None);
}

#[test]
fn table_has_unique_names() {
    let syntax = FlagSyntax::usd_export();
    let mut names: Vec<&str> = syntax
        .flags()
        .iter()
        .flat_map(|f| [f.short, f.long])
        .collect();
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total);
}
