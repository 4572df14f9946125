use serde_json::json;
use slash_schema_core::entity::{TextChannel, User};
use slash_schema_core::{
    declare_schema, validate_schema, Annotation, BindError, Binder, CanonicalOption, ChannelType,
    CommandSchema, OptionDescriptor, OptionKind, OptionValue, Param, SchemaBuilder, SchemaError,
    Signature, Snowflake, UnknownOptionPolicy,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn raw(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

fn greet_schema() -> CommandSchema {
    let signature = Signature::new()
        .context("ctx")
        .param(Param::typed::<User>("target"))
        .param(Param::typed::<String>("greeting").with_option(
            OptionDescriptor::new("How to greet").with_default("hi"),
        ));
    declare_schema("greet", "Greet someone", &signature).unwrap()
}

// ---------------------------------------------------------------------------
// Declaration
// ---------------------------------------------------------------------------

#[test]
fn test_required_options_precede_optional_ones() {
    let signature = Signature::new()
        .context("ctx")
        .param(Param::typed::<String>("a"))
        .param(Param::typed::<i64>("b"))
        .param(Param::typed::<bool>("c").with_default(false))
        .param(Param::typed::<Option<f64>>("d"));

    let schema = declare_schema("order", "Ordering", &signature).unwrap();
    assert_eq!(schema.option_names(), vec!["a", "b", "c", "d"]);
    assert_eq!(
        schema.options.iter().map(|o| o.required).collect::<Vec<_>>(),
        vec![true, true, false, false]
    );
}

#[test]
fn test_required_after_optional_fails() {
    let signature = Signature::new()
        .context("ctx")
        .param(Param::typed::<String>("a").with_default("x"))
        .param(Param::typed::<String>("b"));

    let err = declare_schema("order", "Ordering", &signature).unwrap_err();
    assert_eq!(err.command, "order");
    assert_eq!(
        err.source,
        SchemaError::SchemaOrdering {
            required: "b".into(),
            optional: "a".into(),
        }
    );
}

#[test]
fn test_explicit_name_is_used_and_bound_back() {
    let signature = Signature::new()
        .context("ctx")
        .param(Param::typed::<String>("long_parameter_name").with_option(
            OptionDescriptor::new("Short").with_name("x"),
        ));

    let schema = declare_schema("named", "Named option", &signature).unwrap();
    assert_eq!(schema.option_names(), vec!["x"]);

    let args = Binder::default()
        .bind(&schema, &raw(json!({"x": "value"})))
        .unwrap();
    assert_eq!(args.get::<String>("long_parameter_name").unwrap(), "value");
}

#[test]
fn test_declaration_is_idempotent() {
    let signature = Signature::new()
        .context("ctx")
        .param(Param::typed::<TextChannel>("channel"))
        .param(Param::typed::<i64>("limit").with_option(
            OptionDescriptor::new("How many")
                .with_default(10)
                .with_min_value(1.0)
                .with_max_value(100.0),
        ));

    let first = declare_schema("purge", "Delete messages", &signature).unwrap();
    let second = declare_schema("purge", "Delete messages", &signature).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(first.options[0].channel_types, Some(vec![ChannelType::GuildText]));
}

#[test]
fn test_plain_default_declares_optional_integer() {
    let signature = Signature::new()
        .context("ctx")
        .param(Param::new("count").with_annotation(Annotation::Int).with_default(5));

    let schema = declare_schema("count", "Count things", &signature).unwrap();
    let option = &schema.options[0];
    assert_eq!(option.kind, OptionKind::Integer);
    assert!(!option.required);
    assert_eq!(option.default, Some(OptionValue::Integer(5)));
}

#[test]
fn test_user_without_default_is_required() {
    let schema = greet_schema();
    let target = schema.find_option("target").unwrap();
    assert_eq!(target.kind, OptionKind::User);
    assert!(target.required);
}

#[test]
fn test_too_many_options_rejected() {
    let signature = (0..26).fold(Signature::new().context("ctx"), |sig, i| {
        sig.param(Param::typed::<String>(&format!("opt{i}")))
    });
    let err = declare_schema("wide", "Too wide", &signature).unwrap_err();
    assert_eq!(err.source, SchemaError::TooManyOptions { count: 26, max: 25 });
}

#[test]
fn test_doc_and_sidecar_descriptions() {
    let signature = Signature::new()
        .context("ctx")
        .param(Param::typed::<String>("text"))
        .describe("text", "Text to echo");

    let schema = declare_schema("echo", "Echo text", &signature).unwrap();
    assert_eq!(schema.options[0].description, "Text to echo");

    let undocumented = declare_schema(
        "echo",
        "Echo text",
        &Signature::new().context("ctx").param(Param::typed::<String>("text")),
    )
    .unwrap();
    assert_eq!(undocumented.options[0].description, "No Description Set");
}

// ---------------------------------------------------------------------------
// Serialized shape
// ---------------------------------------------------------------------------

#[test]
fn test_schema_serializes_to_protocol_json() {
    let value = serde_json::to_value(greet_schema()).unwrap();
    assert_eq!(value["type"], 1);
    assert_eq!(value["name"], "greet");
    assert_eq!(value["options"][0]["type"], 6);
    assert_eq!(value["options"][0]["required"], true);
    assert_eq!(value["options"][1]["type"], 3);
    assert_eq!(value["options"][1]["required"], false);
    assert!(value["options"][1].get("default").is_none());

    let back: CommandSchema = serde_json::from_value(value).unwrap();
    assert!(validate_schema(&back).is_empty());
}

#[test]
fn test_validate_schema_reports_every_violation() {
    let mut schema = CommandSchema::new("Bad Name", "");
    schema.options.push(CanonicalOption::new("dup", OptionKind::String, "One"));
    schema.options.push(CanonicalOption::new("dup", OptionKind::String, "Two"));

    let errors = validate_schema(&schema);
    assert!(errors.len() >= 3);
    assert!(errors.iter().any(|e| matches!(e, SchemaError::NameValidation { .. })));
    assert!(errors.iter().any(|e| matches!(e, SchemaError::DuplicateOption(n) if n == "dup")));
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

#[test]
fn test_default_used_when_absent() {
    let schema = greet_schema();
    let binder = Binder::default();

    let args = binder
        .bind(&schema, &raw(json!({"target": "80351110224678912"})))
        .unwrap();
    assert_eq!(args.get::<String>("greeting").unwrap(), "hi");
    assert_eq!(
        args.get::<User>("target").unwrap(),
        User(Snowflake(80351110224678912))
    );

    let args = binder
        .bind(&schema, &raw(json!({"target": 1, "greeting": "yo"})))
        .unwrap();
    assert_eq!(args.get::<String>("greeting").unwrap(), "yo");
}

#[test]
fn test_missing_required_option() {
    let err = Binder::default()
        .bind(&greet_schema(), &raw(json!({"greeting": "yo"})))
        .unwrap_err();
    assert_eq!(err, BindError::MissingOption("target".into()));
}

#[test]
fn test_unknown_option_ignored_by_default() {
    let args = Binder::default()
        .bind(&greet_schema(), &raw(json!({"target": "1", "extra": true})))
        .unwrap();
    assert_eq!(args.len(), 2);
    assert!(args.value("extra").is_none());
}

#[test]
fn test_unknown_option_rejected_when_configured() {
    let err = Binder::new(UnknownOptionPolicy::Reject)
        .bind(&greet_schema(), &raw(json!({"target": "1", "extra": true})))
        .unwrap_err();
    assert_eq!(err, BindError::UnknownOption("extra".into()));
}

#[test]
fn test_optional_annotation_binds_absence() {
    let schema = SchemaBuilder::new("note", "Take a note")
        .option(CanonicalOption::new("text", OptionKind::String, "Text").with_default(None))
        .build()
        .unwrap();

    let args = Binder::default().bind(&schema, &raw(json!({}))).unwrap();
    assert_eq!(args.value("text"), Some(None));
    assert_eq!(args.get::<Option<String>>("text").unwrap(), None);
}

#[test]
fn test_coercion_failure_names_option() {
    let signature = Signature::new()
        .context("ctx")
        .param(Param::typed::<i64>("count"));
    let schema = declare_schema("count", "Count", &signature).unwrap();

    let err = Binder::default()
        .bind(&schema, &raw(json!({"count": "many"})))
        .unwrap_err();
    assert!(matches!(
        err,
        BindError::Coercion { option, expected: OptionKind::Integer, .. } if option == "count"
    ));
}
