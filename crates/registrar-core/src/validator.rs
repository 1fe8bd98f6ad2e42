//! Field-by-field validation of bound values against a schema.
//!
//! Each field is checked in a fixed order: absence, type coercion, numeric
//! bounds, string length, format, enumeration membership, then nested
//! schemas. A field reports at most one violation of its own; a nested
//! object reports one per failing nested field. No field's outcome affects
//! another's, so every failing field of a request is reported together.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::bound::{BoundValue, BoundValues, RawValue};
use crate::failure::{ValidationErrors, Violation, ViolationKind};
use crate::schema::{FieldConstraint, FieldType, Schema, Source};
use crate::value::{Entity, FileHandle, FileInfo, Value};

/// Validates bound values against a schema.
///
/// Returns the typed entity when every field passes, or every violation
/// found otherwise. Bound values for names the schema does not declare are
/// ignored.
///
/// # Example
///
/// ```
/// use registrar_core::{validate, BoundValues, FieldConstraint, Schema, Source};
///
/// let schema = Schema::new("Query")
///     .field(FieldConstraint::integer("age").gt(0).source(Source::Query));
///
/// let entity = validate(&schema, BoundValues::new().with("age", Source::Query, "25")).unwrap();
/// assert_eq!(entity.get_i64("age"), Some(25));
///
/// let errors = validate(&schema, BoundValues::new().with("age", Source::Query, "0")).unwrap_err();
/// assert_eq!(errors.find("age").unwrap().constraint.as_deref(), Some("gt=0"));
/// ```
pub fn validate(schema: &Schema, mut bound: BoundValues) -> Result<Entity, ValidationErrors> {
    let mut entity = Entity::new();
    let mut errors = ValidationErrors::new();

    for field in schema.fields() {
        let raw = bound.take(field.name()).and_then(|b| b.raw);
        if let Some(value) = check_field(field, field.name(), field.location(), raw, &mut errors) {
            entity.insert(field.name(), value);
        }
    }

    errors.into_result().map(|()| entity)
}

/// Checks an already typed entity against a schema's constraints.
///
/// Used on the outbound side, where a handler's result must still honour
/// the bounds and lengths its output schema declares.
///
/// # Example
///
/// ```
/// use registrar_core::{validate_entity, Entity, FieldConstraint, Schema};
///
/// let schema = Schema::new("LoginOut").field(FieldConstraint::string("username").max_length(20));
///
/// assert!(validate_entity(&schema, &Entity::new().with("username", "miguel2021")).is_ok());
///
/// let errors = validate_entity(&schema, &Entity::new().with("username", "a".repeat(21))).unwrap_err();
/// assert_eq!(errors.find("username").unwrap().constraint.as_deref(), Some("max_length=20"));
/// ```
pub fn validate_entity(schema: &Schema, entity: &Entity) -> Result<Entity, ValidationErrors> {
    let mut bound = BoundValues::new();
    for field in schema.fields() {
        let raw = entity.get(field.name()).map(raw_from_value);
        bound.push(BoundValue::new(field.name(), field.location(), raw));
    }
    validate(schema, bound)
}

fn raw_from_value(value: &Value) -> RawValue {
    let handle = |info: &FileInfo| {
        FileHandle::from_bytes(
            info.file_name().map(String::from),
            info.content_type().map(String::from),
            info.data().clone(),
        )
    };
    match value {
        Value::File(info) => RawValue::File(handle(info)),
        Value::List(items) if !items.is_empty() && items.iter().all(|v| v.as_file().is_some()) => {
            RawValue::Files(items.iter().filter_map(Value::as_file).map(handle).collect())
        }
        other => RawValue::Json(other.to_json()),
    }
}

/// Validates a JSON object against a nested schema, prefixing failure paths.
fn validate_object(
    schema: &Schema,
    mut object: serde_json::Map<String, serde_json::Value>,
    prefix: &str,
    source: Source,
    errors: &mut ValidationErrors,
) -> Option<Entity> {
    let before = errors.len();
    let mut entity = Entity::new();

    for field in schema.fields() {
        let path = format!("{prefix}.{}", field.name());
        let raw = object.remove(&field.external_name()).map(RawValue::Json);
        if let Some(value) = check_field(field, &path, source, raw, errors) {
            entity.insert(field.name(), value);
        }
    }

    (errors.len() == before).then_some(entity)
}

/// Runs the full rule sequence for one field.
fn check_field(
    field: &FieldConstraint,
    path: &str,
    source: Source,
    raw: Option<RawValue>,
    errors: &mut ValidationErrors,
) -> Option<Value> {
    let raw = match raw {
        None | Some(RawValue::Json(serde_json::Value::Null)) => {
            return match field.default_value() {
                Some(default) => {
                    debug!(field = %path, %source, "field absent, applying default");
                    Some(default.clone())
                }
                None => {
                    errors.push(Violation::missing(path, source));
                    None
                }
            };
        }
        Some(raw) => raw,
    };

    let probe = Probe {
        path,
        source,
        secret: field.is_secret(),
    };
    let echo = probe.echo(&raw);

    let value = coerce(field.field_type(), &probe, raw, errors)?;

    match check_constraints(field, &probe, &value) {
        Ok(()) => Some(value),
        Err(pending) => {
            errors.push(pending.with_echo(echo));
            None
        }
    }
}

/// Location and redaction settings for the value under inspection.
struct Probe<'a> {
    path: &'a str,
    source: Source,
    secret: bool,
}

impl Probe<'_> {
    fn echo(&self, raw: &RawValue) -> Option<serde_json::Value> {
        (!self.secret).then(|| raw.echo())
    }

    fn item(&self, index: usize) -> String {
        format!("{}[{index}]", self.path)
    }

    fn violation(&self, kind: ViolationKind, message: impl Into<String>) -> Pending {
        Pending {
            violation: Violation::new(self.path, kind, self.source, message),
        }
    }

    fn mismatch(&self, expected: &FieldType, raw: &RawValue) -> Violation {
        self.violation(
            ViolationKind::TypeMismatch,
            format!("value is not a valid {}", expected.type_name()),
        )
        .with_echo(self.echo(raw))
    }
}

/// A violation awaiting the offending value.
struct Pending {
    violation: Violation,
}

impl Pending {
    fn constraint(mut self, constraint: impl Into<String>) -> Self {
        self.violation.constraint = Some(constraint.into());
        self
    }

    fn with_echo(mut self, echo: Option<serde_json::Value>) -> Violation {
        self.violation.value = echo;
        self.violation
    }
}

/// Converts a raw value to the declared type.
///
/// Pushes its own violations on failure. Nested objects and lists push one
/// violation per failing member.
fn coerce(
    ty: &FieldType,
    probe: &Probe<'_>,
    raw: RawValue,
    errors: &mut ValidationErrors,
) -> Option<Value> {
    let coerced = match (ty, raw) {
        (FieldType::String | FieldType::Email | FieldType::Enum(_), raw) => {
            coerce_text(raw).map(Value::String)
        }
        (FieldType::Integer, raw) => coerce_integer(raw).map(Value::Integer),
        (FieldType::Boolean, raw) => coerce_bool(raw).map(Value::Bool),
        (FieldType::Object(schema), RawValue::Json(serde_json::Value::Object(map))) => {
            return validate_object(schema, map, probe.path, probe.source, errors)
                .map(Value::Object);
        }
        (FieldType::List(item), RawValue::Json(serde_json::Value::Array(items))) => {
            let raws = items.into_iter().map(RawValue::Json).collect();
            return coerce_list(item, probe, raws, errors);
        }
        (FieldType::List(item), RawValue::Files(files)) => {
            let raws = files.into_iter().map(RawValue::File).collect();
            return coerce_list(item, probe, raws, errors);
        }
        (FieldType::List(item), RawValue::File(file)) => {
            return coerce_list(item, probe, vec![RawValue::File(file)], errors);
        }
        (FieldType::File, RawValue::File(file)) => return read_file(file, probe, errors),
        (FieldType::File, RawValue::Files(mut files)) if files.len() == 1 => {
            return read_file(files.remove(0), probe, errors);
        }
        (_, raw) => Err(raw),
    };

    match coerced {
        Ok(value) => Some(value),
        Err(raw) => {
            errors.push(probe.mismatch(ty, &raw));
            None
        }
    }
}

fn coerce_list(
    item: &FieldType,
    probe: &Probe<'_>,
    raws: Vec<RawValue>,
    errors: &mut ValidationErrors,
) -> Option<Value> {
    let before = errors.len();
    let mut values = Vec::with_capacity(raws.len());

    for (index, raw) in raws.into_iter().enumerate() {
        let path = probe.item(index);
        let item_probe = Probe {
            path: &path,
            source: probe.source,
            secret: probe.secret,
        };
        let echo = item_probe.echo(&raw);
        let Some(value) = coerce(item, &item_probe, raw, errors) else {
            continue;
        };
        match check_type_rules(item, &item_probe, &value) {
            Ok(()) => values.push(value),
            Err(pending) => errors.push(pending.with_echo(echo)),
        }
    }

    (errors.len() == before).then_some(Value::List(values))
}

fn read_file(file: FileHandle, probe: &Probe<'_>, errors: &mut ValidationErrors) -> Option<Value> {
    let name = file.file_name().map(ToString::to_string);
    match file.read_all() {
        Ok(info) => {
            debug!(field = %probe.path, size = info.size(), "read uploaded file");
            Some(Value::File(info))
        }
        Err(err) => {
            errors.push(
                probe
                    .violation(
                        ViolationKind::TypeMismatch,
                        format!("uploaded file could not be read: {err}"),
                    )
                    .with_echo(Some(serde_json::json!({ "filename": name }))),
            );
            None
        }
    }
}

fn coerce_text(raw: RawValue) -> Result<String, RawValue> {
    match raw {
        RawValue::Text(s) | RawValue::Json(serde_json::Value::String(s)) => Ok(s),
        RawValue::Json(serde_json::Value::Number(n)) => Ok(n.to_string()),
        other => Err(other),
    }
}

fn coerce_integer(raw: RawValue) -> Result<i64, RawValue> {
    let parsed = match &raw {
        RawValue::Text(s) | RawValue::Json(serde_json::Value::String(s)) => {
            s.trim().parse::<i64>().ok()
        }
        RawValue::Json(serde_json::Value::Number(n)) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        _ => None,
    };
    parsed.ok_or(raw)
}

fn coerce_bool(raw: RawValue) -> Result<bool, RawValue> {
    let parsed = match &raw {
        RawValue::Json(serde_json::Value::Bool(b)) => Some(*b),
        RawValue::Text(s) | RawValue::Json(serde_json::Value::String(s)) => {
            parse_bool(s.trim())
        }
        RawValue::Json(serde_json::Value::Number(n)) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    };
    parsed.ok_or(raw)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Field-level constraints: bounds, then length, then the type's own rules.
fn check_constraints(
    field: &FieldConstraint,
    probe: &Probe<'_>,
    value: &Value,
) -> Result<(), Pending> {
    if let Value::Integer(n) = value {
        if let Some(lower) = field.lower_bound() {
            if !lower.admits_lower(*n) {
                let label = lower.lower_label();
                return Err(probe
                    .violation(
                        ViolationKind::OutOfRange,
                        format!("ensure this value is {}", describe_bound(&label)),
                    )
                    .constraint(label));
            }
        }
        if let Some(upper) = field.upper_bound() {
            if !upper.admits_upper(*n) {
                let label = upper.upper_label();
                return Err(probe
                    .violation(
                        ViolationKind::OutOfRange,
                        format!("ensure this value is {}", describe_bound(&label)),
                    )
                    .constraint(label));
            }
        }
    }

    if let Value::String(s) = value {
        let len = s.chars().count();
        if let Some(min) = field.min_len() {
            if len < min {
                return Err(probe
                    .violation(
                        ViolationKind::LengthViolation,
                        format!("ensure this value has at least {min} characters"),
                    )
                    .constraint(format!("min_length={min}")));
            }
        }
        if let Some(max) = field.max_len() {
            if len > max {
                return Err(probe
                    .violation(
                        ViolationKind::LengthViolation,
                        format!("ensure this value has at most {max} characters"),
                    )
                    .constraint(format!("max_length={max}")));
            }
        }
    }

    check_type_rules(field.field_type(), probe, value)
}

/// Rules inherent to the type itself: email format and enumeration membership.
fn check_type_rules(ty: &FieldType, probe: &Probe<'_>, value: &Value) -> Result<(), Pending> {
    match (ty, value) {
        (FieldType::Email, Value::String(s)) if !email_pattern().is_match(s) => Err(probe
            .violation(ViolationKind::InvalidFormat, "value is not a valid email address")
            .constraint("format=email")),
        (FieldType::Enum(set), Value::String(s)) if !set.contains(s) => Err(probe
            .violation(
                ViolationKind::InvalidEnumeration,
                format!(
                    "value is not a valid enumeration member; permitted: {}",
                    set.variants()
                        .iter()
                        .map(|v| format!("'{v}'"))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )
            .constraint(format!("enum={}", set.name()))),
        _ => Ok(()),
    }
}

fn describe_bound(label: &str) -> String {
    let (op, n) = label.split_once('=').unwrap_or((label, ""));
    let phrase = match op {
        "gt" => "greater than",
        "ge" => "greater than or equal to",
        "lt" => "less than",
        "le" => "less than or equal to",
        _ => op,
    };
    format!("{phrase} {n}")
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
        )
        .expect("valid email regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EnumSet;
    use bytes::Bytes;
    use serde_json::json;

    fn hair_color() -> EnumSet {
        EnumSet::new("HairColor", ["white", "brown", "black", "blonde", "red"])
    }

    fn location() -> Schema {
        Schema::new("Location")
            .field(FieldConstraint::string("city"))
            .field(FieldConstraint::string("state"))
            .field(FieldConstraint::string("country"))
    }

    fn person() -> Schema {
        Schema::new("Person")
            .field(FieldConstraint::string("first_name").min_length(1).max_length(50))
            .field(FieldConstraint::string("last_name").min_length(1).max_length(50))
            .field(FieldConstraint::integer("age").gt(0).le(115))
            .field(FieldConstraint::enumeration("hair_color", hair_color()).optional())
            .field(FieldConstraint::boolean("is_married").optional())
            .field(FieldConstraint::string("password").min_length(8).secret())
    }

    fn body(json: serde_json::Value) -> BoundValues {
        let mut bound = BoundValues::new();
        if let serde_json::Value::Object(map) = json {
            for (k, v) in map {
                bound.push(BoundValue::new(k, Source::Body, Some(RawValue::Json(v))));
            }
        }
        bound
    }

    fn age_only() -> Schema {
        Schema::new("Age").field(FieldConstraint::integer("age").gt(0).le(115))
    }

    #[test]
    fn test_valid_person() {
        let entity = validate(
            &person(),
            body(json!({
                "first_name": "Miguel",
                "last_name": "Torres",
                "age": 25,
                "password": "12345678"
            })),
        )
        .unwrap();

        assert_eq!(entity.get_str("first_name"), Some("Miguel"));
        assert_eq!(entity.get_i64("age"), Some(25));
        assert_eq!(entity.get("hair_color"), Some(&Value::Null));
        assert_eq!(entity.get("is_married"), Some(&Value::Null));
        assert_eq!(
            entity.keys().collect::<Vec<_>>(),
            vec!["first_name", "last_name", "age", "hair_color", "is_married", "password"]
        );
    }

    #[test]
    fn test_missing_required_reported_alongside_others() {
        let errors = validate(&person(), body(json!({"age": 200}))).unwrap_err();

        assert_eq!(errors.find("first_name").unwrap().kind, ViolationKind::Missing);
        assert_eq!(errors.find("last_name").unwrap().kind, ViolationKind::Missing);
        assert_eq!(errors.find("password").unwrap().kind, ViolationKind::Missing);
        let age = errors.find("age").unwrap();
        assert_eq!(age.kind, ViolationKind::OutOfRange);
        assert_eq!(age.constraint.as_deref(), Some("le=115"));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_null_counts_as_absent() {
        let entity = validate(
            &person(),
            body(json!({
                "first_name": "A", "last_name": "B", "age": 1,
                "password": "12345678", "hair_color": null
            })),
        )
        .unwrap();
        assert_eq!(entity.get("hair_color"), Some(&Value::Null));

        let errors = validate(&age_only(), body(json!({"age": null}))).unwrap_err();
        assert_eq!(errors.find("age").unwrap().kind, ViolationKind::Missing);
    }

    #[test]
    fn test_bounds_edges() {
        for ok in [1, 115] {
            assert!(validate(&age_only(), body(json!({ "age": ok }))).is_ok());
        }
        let errors = validate(&age_only(), body(json!({"age": 0}))).unwrap_err();
        let v = errors.find("age").unwrap();
        assert_eq!(v.constraint.as_deref(), Some("gt=0"));
        assert_eq!(v.value, Some(json!(0)));
        assert_eq!(v.message, "ensure this value is greater than 0");

        let errors = validate(&age_only(), body(json!({"age": 116}))).unwrap_err();
        assert_eq!(errors.find("age").unwrap().constraint.as_deref(), Some("le=115"));
    }

    #[test]
    fn test_integer_coercion() {
        let schema = Schema::new("Q").field(FieldConstraint::integer("n").source(Source::Query));
        let ok = |raw: &str| validate(&schema, BoundValues::new().with("n", Source::Query, raw));

        assert_eq!(ok("42").unwrap().get_i64("n"), Some(42));
        assert_eq!(ok("-7").unwrap().get_i64("n"), Some(-7));
        let errors = ok("abc").unwrap_err();
        let v = errors.find("n").unwrap();
        assert_eq!(v.kind, ViolationKind::TypeMismatch);
        assert_eq!(v.source, Source::Query);
        assert_eq!(v.value, Some(json!("abc")));

        assert!(validate(&age_only(), body(json!({"age": "25"}))).is_ok());
        assert!(validate(&age_only(), body(json!({"age": 25.0}))).is_ok());
        assert!(validate(&age_only(), body(json!({"age": 25.5}))).is_err());
        assert!(validate(&age_only(), body(json!({"age": true}))).is_err());
    }

    #[test]
    fn test_bool_coercion() {
        let schema = Schema::new("B").field(FieldConstraint::boolean("flag"));
        for (raw, expected) in [("true", true), ("YES", true), ("on", true), ("0", false), ("off", false)] {
            let entity = validate(&schema, BoundValues::new().with("flag", Source::Body, raw)).unwrap();
            assert_eq!(entity.get("flag").and_then(Value::as_bool), Some(expected));
        }
        assert!(validate(&schema, BoundValues::new().with("flag", Source::Body, "maybe")).is_err());
        assert!(validate(&schema, body(json!({"flag": 2}))).is_err());
    }

    #[test]
    fn test_string_coerces_numbers_but_not_objects() {
        let schema = Schema::new("S").field(FieldConstraint::string("s"));
        let entity = validate(&schema, body(json!({"s": 12}))).unwrap();
        assert_eq!(entity.get_str("s"), Some("12"));

        let errors = validate(&schema, body(json!({"s": {"a": 1}}))).unwrap_err();
        assert_eq!(errors.find("s").unwrap().kind, ViolationKind::TypeMismatch);
    }

    #[test]
    fn test_length_counts_characters() {
        let schema = Schema::new("M").field(FieldConstraint::string("message").min_length(20));
        let exactly = "ñ".repeat(20);
        assert!(validate(&schema, body(json!({ "message": exactly }))).is_ok());

        let errors = validate(&schema, body(json!({ "message": "a".repeat(19) }))).unwrap_err();
        let v = errors.find("message").unwrap();
        assert_eq!(v.kind, ViolationKind::LengthViolation);
        assert_eq!(v.constraint.as_deref(), Some("min_length=20"));

        let schema = Schema::new("N").field(FieldConstraint::string("name").max_length(3));
        assert!(validate(&schema, body(json!({"name": "abc"}))).is_ok());
        assert!(validate(&schema, body(json!({"name": "abcd"}))).is_err());
    }

    #[test]
    fn test_enum_membership() {
        let schema = Schema::new("H").field(FieldConstraint::enumeration("hair_color", hair_color()));
        assert!(validate(&schema, body(json!({"hair_color": "blonde"}))).is_ok());

        let errors = validate(&schema, body(json!({"hair_color": "Blonde"}))).unwrap_err();
        let v = errors.find("hair_color").unwrap();
        assert_eq!(v.kind, ViolationKind::InvalidEnumeration);
        assert_eq!(v.constraint.as_deref(), Some("enum=HairColor"));
        assert!(v.message.contains("'blonde'"));
    }

    #[test]
    fn test_email_format() {
        let schema = Schema::new("E").field(FieldConstraint::email("email"));
        assert!(validate(&schema, body(json!({"email": "miguel@example.com"}))).is_ok());
        for bad in ["miguel", "miguel@", "@example.com", "miguel@example", "a b@example.com"] {
            let errors = validate(&schema, body(json!({ "email": bad }))).unwrap_err();
            assert_eq!(errors.find("email").unwrap().kind, ViolationKind::InvalidFormat, "{bad}");
        }
    }

    #[test]
    fn test_secret_values_are_not_echoed() {
        let errors = validate(&person(), body(json!({"password": "short"}))).unwrap_err();
        let v = errors.find("password").unwrap();
        assert_eq!(v.kind, ViolationKind::LengthViolation);
        assert_eq!(v.value, None);
    }

    #[test]
    fn test_nested_paths() {
        let schema = Schema::new("Update")
            .field(FieldConstraint::object("person", person()))
            .field(FieldConstraint::object("location", location()));

        let errors = validate(
            &schema,
            body(json!({
                "person": {"first_name": "", "last_name": "T", "age": 0, "password": "12345678"},
                "location": {"city": "Lima", "state": "Lima"}
            })),
        )
        .unwrap_err();

        assert_eq!(errors.find("person.first_name").unwrap().kind, ViolationKind::LengthViolation);
        assert_eq!(errors.find("person.age").unwrap().kind, ViolationKind::OutOfRange);
        assert_eq!(errors.find("location.country").unwrap().kind, ViolationKind::Missing);
        assert_eq!(errors.len(), 3);

        let errors = validate(&schema, body(json!({"person": "nope", "location": []}))).unwrap_err();
        assert_eq!(errors.find("person").unwrap().kind, ViolationKind::TypeMismatch);
        assert_eq!(errors.find("location").unwrap().kind, ViolationKind::TypeMismatch);
    }

    #[test]
    fn test_list_item_paths() {
        let schema = Schema::new("L").field(FieldConstraint::list(
            "colors",
            FieldType::Enum(hair_color()),
        ));
        let entity = validate(&schema, body(json!({"colors": ["red", "white"]}))).unwrap();
        assert_eq!(entity.get("colors").and_then(Value::as_list).map(<[Value]>::len), Some(2));

        let errors = validate(&schema, body(json!({"colors": ["red", "green", 3]}))).unwrap_err();
        assert_eq!(errors.find("colors[1]").unwrap().kind, ViolationKind::InvalidEnumeration);
        assert_eq!(errors.find("colors[2]").unwrap().kind, ViolationKind::InvalidEnumeration);
    }

    #[test]
    fn test_files() {
        let file = |name: &str, size: usize| {
            FileHandle::from_bytes(
                Some(name.to_string()),
                Some("image/png".to_string()),
                Bytes::from(vec![0_u8; size]),
            )
        };
        let schema = Schema::new("Upload")
            .field(FieldConstraint::file("image"))
            .field(FieldConstraint::files("images"));

        let mut bound = BoundValues::new();
        bound.push(BoundValue::new("image", Source::File, Some(RawValue::File(file("a.png", 2048)))));
        bound.push(BoundValue::new(
            "images",
            Source::File,
            Some(RawValue::Files(vec![file("b.png", 10), file("c.png", 20)])),
        ));
        let entity = validate(&schema, bound).unwrap();

        let image = entity.get("image").and_then(Value::as_file).unwrap();
        assert_eq!(image.size(), 2048);
        let images = entity.get("images").and_then(Value::as_list).unwrap();
        assert_eq!(images.len(), 2);

        let mut bound = BoundValues::new();
        bound.push(BoundValue::new("images", Source::File, Some(RawValue::Files(Vec::new()))));
        let errors = validate(&schema, bound).unwrap_err();
        assert_eq!(errors.find("image").unwrap().kind, ViolationKind::Missing);
        assert!(errors.find("images").is_none());

        let bound = BoundValues::new()
            .with("image", Source::Form, "not a file")
            .with("images", Source::Form, "nor this");
        let errors = validate(&schema, bound).unwrap_err();
        assert_eq!(errors.find("image").unwrap().kind, ViolationKind::TypeMismatch);
        assert_eq!(errors.find("images").unwrap().kind, ViolationKind::TypeMismatch);
    }

    #[test]
    fn test_undeclared_bound_values_ignored() {
        let entity = validate(&age_only(), body(json!({"age": 3, "extra": "x"}))).unwrap();
        assert!(!entity.contains_key("extra"));
    }

    #[test]
    fn test_default_is_applied() {
        let schema = Schema::new("Login")
            .field(FieldConstraint::string("message").default("Login Succesfully!"));
        let entity = validate(&schema, BoundValues::new()).unwrap();
        assert_eq!(entity.get_str("message"), Some("Login Succesfully!"));
    }

    #[test]
    fn test_validate_entity_enforces_output_constraints() {
        let schema = Schema::new("LoginOut")
            .field(FieldConstraint::string("username").max_length(20))
            .field(FieldConstraint::string("message").default("Login Succesfully!"));

        let ok = Entity::new().with("username", "a".repeat(20));
        let entity = validate_entity(&schema, &ok).unwrap();
        assert_eq!(entity.get_str("message"), Some("Login Succesfully!"));

        let long = Entity::new().with("username", "a".repeat(21));
        let errors = validate_entity(&schema, &long).unwrap_err();
        assert_eq!(errors.len(), 1);
        let violation = errors.find("username").unwrap();
        assert_eq!(violation.kind, ViolationKind::LengthViolation);
        assert_eq!(violation.constraint.as_deref(), Some("max_length=20"));
    }

    #[test]
    fn test_validate_entity_round_trips_typed_values() {
        let out = Schema::new("PersonLocationOut")
            .field(FieldConstraint::integer("age").gt(0).le(115))
            .field(FieldConstraint::enumeration("hair_color", hair_color()).optional())
            .field(FieldConstraint::object("location", location()))
            .field(FieldConstraint::files("images"));

        let entity = Entity::new()
            .with("age", 25)
            .with("hair_color", Value::Null)
            .with(
                "location",
                Entity::new()
                    .with("city", "Puerto Montt")
                    .with("state", "Décima")
                    .with("country", "Chile"),
            )
            .with(
                "images",
                vec![Value::File(FileInfo::new(
                    Some("a.png".to_string()),
                    Some("image/png".to_string()),
                    Bytes::from_static(b"png"),
                ))],
            );

        assert_eq!(validate_entity(&out, &entity).unwrap(), entity);

        let errors = validate_entity(&out, &entity.clone().with("age", 0)).unwrap_err();
        assert_eq!(errors.find("age").unwrap().constraint.as_deref(), Some("gt=0"));
    }
}
