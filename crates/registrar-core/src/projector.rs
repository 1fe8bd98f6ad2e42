//! Filtering validated entities through an outbound schema.

use tracing::debug;

use crate::schema::{FieldType, Schema};
use crate::value::{Entity, Value};

/// Projects an entity onto `schema`.
///
/// The result holds exactly the schema's fields in the schema's order.
/// Undeclared fields are dropped. Nested object fields are projected through
/// their own schema, list items likewise. A declared field the entity lacks
/// takes its default when optional; a required one is left out.
///
/// Projecting an already projected entity returns it unchanged.
///
/// # Example
///
/// ```
/// use registrar_core::{project, Entity, FieldConstraint, Schema};
///
/// let out = Schema::new("PersonOut").field(FieldConstraint::string("first_name"));
/// let person = Entity::new()
///     .with("first_name", "Miguel")
///     .with("password", "12345678");
///
/// let projected = project(&person, &out);
/// assert_eq!(projected.keys().collect::<Vec<_>>(), vec!["first_name"]);
/// ```
#[must_use]
pub fn project(entity: &Entity, schema: &Schema) -> Entity {
    let mut out = Entity::new();

    for field in schema.fields() {
        match entity.get(field.name()) {
            Some(value) => out.insert(field.name(), project_value(value, field.field_type())),
            None => match field.default_value() {
                Some(default) => out.insert(field.name(), default.clone()),
                None => debug!(
                    schema = schema.name(),
                    field = field.name(),
                    "required output field missing from entity, omitted"
                ),
            },
        }
    }

    out
}

fn project_value(value: &Value, ty: &FieldType) -> Value {
    match (ty, value) {
        (FieldType::Object(schema), Value::Object(nested)) => Value::Object(project(nested, schema)),
        (FieldType::List(item), Value::List(items)) => {
            Value::List(items.iter().map(|v| project_value(v, item)).collect())
        }
        _ => value.clone(),
    }
}
