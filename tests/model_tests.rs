mod common;

use jsongen::config::Config;
use jsongen::model::{
    extract_unit, resolve_type, TypeAliasTable, TypeDescriptor, UnitModel, VarDescriptor,
};
use jsongen::syntax::parse;
use jsongen::ErrorType;

use common::{unit, units};

fn var(name: &str, ty: TypeDescriptor) -> VarDescriptor {
    VarDescriptor {
        name: name.to_string(),
        ty,
    }
}

fn named(name: &str) -> TypeDescriptor {
    TypeDescriptor::named(name)
}

#[test]
fn stored_properties_resolve_through_local_aliases() {
    let blog = unit("Blog.ast");
    assert_eq!(blog.type_aliases.get("BlogId"), Some("Int"));
    assert_eq!(blog.structs.len(), 1);

    let s = &blog.structs[0];
    assert_eq!(s.base_name, "Blog");
    assert!(s.type_arguments.is_empty());
    assert_eq!(
        s.var_decls,
        vec![
            var("id", named("Int").with_alias("BlogId")),
            var("name", named("String")),
            var("author", TypeDescriptor::optional(named("String"))),
            var("tags", TypeDescriptor::array(named("String")).with_alias("Tags")),
            var(
                "posts",
                TypeDescriptor::dictionary(named("String"), TypeDescriptor::array(named("Post")))
            ),
            var("title", named("String")),
        ]
    );
}

#[test]
fn aliases_from_other_units_resolve_in_extract_all() {
    let alone = unit("Post.ast");
    assert_eq!(alone.structs[0].var_decls[0], var("blog", named("BlogId")));

    let (all, _) = units(&["Blog.ast", "Post.ast"]);
    let post = &all[1].structs[0];
    assert_eq!(post.var_decls[0], var("blog", named("Int").with_alias("BlogId")));
    // The per-unit table still lists only the unit's own aliases.
    assert!(all[1].type_aliases.is_empty());
}

#[test]
fn generic_structs_and_generic_property_types() {
    let model = unit("Test09.ast");
    let names: Vec<_> = model.structs.iter().map(|s| s.base_name.as_str()).collect();
    assert_eq!(names, vec!["Test09", "Sub1", "Sub2", "Sub3"]);

    let test09 = &model.structs[0];
    assert_eq!(
        test09.var_decls[1],
        var("intSub1", TypeDescriptor::generic("Sub1", vec![named("Int")]))
    );
    assert_eq!(test09.var_decls[4].ty.to_string(), "Sub3<Int, Int, String>");

    assert_eq!(model.structs[1].type_arguments, vec!["T"]);
    assert_eq!(model.structs[2].type_arguments, vec!["A", "B"]);
    assert_eq!(model.structs[3].type_arguments, vec!["A", "B", "C"]);

    let sub2 = &model.structs[2];
    assert_eq!(sub2.var_decls[1].ty, TypeDescriptor::optional(named("B")));
    assert_eq!(
        sub2.var_decls[2].ty.to_string(),
        "Optional<Array<Optional<Array<Optional<B>>>>>"
    );
}

#[test]
fn nested_declarations_get_qualified_names() {
    let model = unit("Test11.ast");

    let structs: Vec<_> = model.structs.iter().map(|s| s.base_name.as_str()).collect();
    assert_eq!(structs, vec!["Test11a", "Test11a.Test11b.Test11c"]);
    assert_eq!(model.structs[1].name, "Test11c");

    let enums: Vec<_> = model
        .enums
        .iter()
        .map(|e| (e.base_name.as_str(), e.raw_type_name.as_str()))
        .collect();
    assert_eq!(
        enums,
        vec![
            ("Test11a.Test11b", "X"),
            ("Test11a.Test11b.Test11c.Test11d", "X")
        ]
    );
    assert!(model.enums[0].method_names.contains("decodeJson"));
    assert!(model.structs[1].method_names.contains("encodeJson"));
}

#[test]
fn implicit_members_are_recorded() {
    let model = unit("Test11.ast");
    let test11a = &model.structs[0];
    assert_eq!(test11a.constructor_params, vec!["s:||s: String"]);
    assert!(test11a.method_names.contains("hash"));
}

#[test]
fn extensions_come_from_the_top_level() {
    let model = unit("Test11.ast");
    assert_eq!(model.extensions.len(), 1);
    let ext = &model.extensions[0];
    assert_eq!(ext.type_base_name, "Test11a.Test11b.Test11c.Test11d");
    assert_eq!(ext.method_names.iter().collect::<Vec<_>>(), vec!["encodeJson"]);
    assert!(ext.constructor_params.is_empty());
}

#[test]
fn constructor_signatures_skip_private_ones() {
    let model = unit("Test14.ast");
    assert_eq!(
        model.structs[0].constructor_params,
        vec![
            "one:||one: Int",
            "two:||two: String",
            "two:one:||two: String, one: Int"
        ]
    );
    assert_eq!(model.structs[1].constructor_params, vec!["one:||one: Int"]);
    assert_eq!(
        model.extensions[0].constructor_params,
        vec!["one:two:||one: Int, two: String?"]
    );
}

#[test]
fn enum_without_raw_type_is_ignored() {
    let root = parse(r#"(source_file (enum_decl "E" type='E.Type' access=internal))"#).unwrap();
    let model = extract_unit(&root, &Config::default()).unwrap();
    assert!(model.enums.is_empty());
    assert!(model.is_empty());
}

#[test]
fn missing_type_attribute_fails_extraction() {
    let root = parse(r#"(source_file (struct_decl "S" (var_decl "x" access=internal)))"#).unwrap();
    let err = extract_unit(&root, &Config::default()).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Query);
}

#[test]
fn cyclic_aliases_fail_extraction() {
    let root = parse(
        r#"(source_file
             (typealias "A" type='B')
             (typealias "B" type='[A]')
             (struct_decl "S" (var_decl "x" type='A')))"#,
    )
    .unwrap();
    let err = extract_unit(&root, &Config::default()).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::AliasCycle);
    assert_eq!(err.message(), "A -> B -> A");
}

#[test]
fn custom_stored_kinds() {
    let config = Config::from_yaml_str(
        "stored_kinds:\n  - attribute: storage_kind\n    value: computed\n",
    )
    .unwrap();
    let root = parse(
        r#"(source_file (struct_decl "S"
             (var_decl "a" type='Int' storage_kind=stored)
             (var_decl "b" type='Int' storage_kind=computed)))"#,
    )
    .unwrap();
    let model = extract_unit(&root, &config).unwrap();
    let names: Vec<_> = model.structs[0].var_decls.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["b"]);
}

#[test]
fn resolve_type_examples() {
    let aliases: TypeAliasTable = [("MyInt", "Int")].into_iter().collect();
    assert_eq!(
        resolve_type("[String: MyInt?]", &aliases).unwrap(),
        TypeDescriptor::dictionary(
            named("String"),
            TypeDescriptor::optional(named("Int").with_alias("MyInt"))
        )
    );
    let err = resolve_type("[String: ]", &aliases).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::MalformedType);
}

#[test]
fn unit_model_serializes_with_camel_case_keys() {
    let model = unit("Blog.ast");
    let json = serde_json::to_value(&model).unwrap();
    assert_eq!(json["typeAliases"]["BlogId"], "Int");
    let id = &json["structs"][0]["varDecls"][0];
    assert_eq!(id["name"], "id");
    assert_eq!(id["type"]["baseName"], "Int");
    assert_eq!(id["type"]["alias"], "BlogId");
    assert!(json["structs"][0]["varDecls"][1]["type"].get("alias").is_none());

    let back: UnitModel = serde_json::from_value(json).unwrap();
    assert_eq!(back, model);
}

#[test]
fn declaration_root_is_described() {
    let config = Config::default();
    let foo = extract_unit(
        &parse(r#"(struct_decl "Foo" (var_decl "bar" type='Int'))"#).unwrap(),
        &config,
    )
    .unwrap();
    assert_eq!(foo.structs.len(), 1);
    assert_eq!(foo.structs[0].base_name, "Foo");
    assert_eq!(foo.structs[0].var_decls, vec![var("bar", named("Int"))]);

    let nested = extract_unit(
        &parse(r#"(struct_decl "Outer" (struct_decl "Inner" (var_decl "x" type='Int')))"#).unwrap(),
        &config,
    )
    .unwrap();
    let names: Vec<_> = nested
        .structs
        .iter()
        .map(|s| (s.name.as_str(), s.base_name.as_str()))
        .collect();
    assert_eq!(names, vec![("Outer", "Outer"), ("Inner", "Outer.Inner")]);
}

#[test]
fn closure_and_member_types_do_not_abort_extraction() {
    let root = parse(
        r#"(source_file (struct_decl "Handler"
             (var_decl "cb" type='(Result<Int, Error>) -> Void' storage_kind=stored)
             (var_decl "index" type='Outer<Int>.Inner' storage_kind=stored)
             (var_decl "pair" type='(Int, Set<String>)' storage_kind=stored)))"#,
    )
    .unwrap();
    let model = extract_unit(&root, &Config::default()).unwrap();
    let vars = &model.structs[0].var_decls;
    assert_eq!(
        vars[0].ty,
        TypeDescriptor::generic("(Result) -> Void", vec![named("Int"), named("Error")])
    );
    assert_eq!(vars[1].ty, TypeDescriptor::generic("Outer.Inner", vec![named("Int")]));
    assert_eq!(vars[2].ty, TypeDescriptor::generic("(Int, Set)", vec![named("String")]));
}
