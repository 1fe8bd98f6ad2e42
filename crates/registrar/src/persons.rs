//! The `persons` service: people, their locations, a login form, a contact
//! form and image uploads.
//!
//! # Example
//!
//! ```rust
//! use registrar::persons;
//! use http::Request;
//! use bytes::Bytes;
//!
//! # tokio_test::block_on(async {
//! let service = persons::service().unwrap();
//!
//! let response = service
//!     .handle(Request::get("/person/detail/3").body(Bytes::new()).unwrap())
//!     .await;
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.body().as_ref(), br#"{"3":"It exists!"}"#);
//! # });
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use http::{Method, StatusCode};
use registrar_core::{
    flatten, ApiError, Contract, Entity, EnumSet, FieldConstraint, FileInfo, Operation, Schema,
    Source, Value,
};
use registrar_config::RegistrarConfig;
use registrar_extract::Limits;

use crate::service::{BuildError, Service};

/// Message returned for an unknown person id.
pub const PERSON_NOT_FOUND: &str = "¡This person doesn't exist!";

/// Message returned on every login.
pub const LOGIN_MESSAGE: &str = "Login Succesfully!";

/// The known person ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDirectory {
    ids: BTreeSet<i64>,
}

impl PersonDirectory {
    /// Creates a directory holding exactly `ids`.
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Returns true if `id` is known.
    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }
}

impl Default for PersonDirectory {
    fn default() -> Self {
        Self::new(1..=5)
    }
}

/// Schema declarations.
pub mod schemas {
    use super::{EnumSet, FieldConstraint, Schema, Source, LOGIN_MESSAGE};

    /// Permitted hair colors.
    #[must_use]
    pub fn hair_color() -> EnumSet {
        EnumSet::new("HairColor", ["white", "brown", "black", "blonde", "red"])
    }

    /// Where a person lives.
    #[must_use]
    pub fn location() -> Schema {
        Schema::new("Location")
            .field(FieldConstraint::string("city"))
            .field(FieldConstraint::string("state"))
            .field(FieldConstraint::string("country"))
            .example(serde_json::json!({
                "city": "Puerto Montt",
                "state": "Décima",
                "country": "Chile",
            }))
    }

    /// Fields shared by every person schema.
    #[must_use]
    pub fn person_base() -> Schema {
        Schema::new("PersonBase")
            .field(
                FieldConstraint::string("first_name")
                    .min_length(1)
                    .max_length(50)
                    .example("Miguel"),
            )
            .field(
                FieldConstraint::string("last_name")
                    .min_length(1)
                    .max_length(50)
                    .example("Torres"),
            )
            .field(FieldConstraint::integer("age").gt(0).le(115).example(25))
            .field(
                FieldConstraint::enumeration("hair_color", hair_color())
                    .optional()
                    .example("black"),
            )
            .field(FieldConstraint::boolean("is_married").optional().example(false))
    }

    /// A person as submitted, password included.
    #[must_use]
    pub fn person() -> Schema {
        Schema::extend("Person", &person_base()).field(
            FieldConstraint::string("password")
                .min_length(8)
                .secret()
                .example("12345678"),
        )
    }

    /// A person as returned.
    #[must_use]
    pub fn person_out() -> Schema {
        Schema::extend("PersonOut", &person_base())
    }

    /// An updated person merged with their location.
    #[must_use]
    pub fn person_with_location_out() -> Schema {
        location()
            .fields()
            .fold(Schema::extend("PersonLocationOut", &person_base()), |schema, field| {
                schema.field(field.clone())
            })
    }

    /// Login response.
    #[must_use]
    pub fn login_out() -> Schema {
        Schema::new("LoginOut")
            .field(FieldConstraint::string("username").max_length(20).example("miguel2021"))
            .field(FieldConstraint::string("message").default(LOGIN_MESSAGE))
    }

    /// Login form input.
    #[must_use]
    pub fn login_form() -> Schema {
        Schema::new("LoginForm")
            .field(FieldConstraint::string("username").source(Source::Form))
            .field(FieldConstraint::string("password").source(Source::Form).secret())
    }

    /// Contact form input, with the caller's user agent and ads cookie.
    #[must_use]
    pub fn contact_form() -> Schema {
        Schema::new("ContactForm")
            .field(
                FieldConstraint::string("first_name")
                    .source(Source::Form)
                    .min_length(1)
                    .max_length(20),
            )
            .field(
                FieldConstraint::string("last_name")
                    .source(Source::Form)
                    .min_length(1)
                    .max_length(20),
            )
            .field(FieldConstraint::email("email").source(Source::Form))
            .field(FieldConstraint::string("message").source(Source::Form).min_length(20))
            .field(
                FieldConstraint::string("user_agent")
                    .source(Source::Header)
                    .optional()
                    .example("me"),
            )
            .field(
                FieldConstraint::string("ads")
                    .source(Source::Cookie)
                    .optional()
                    .example("Cookies values"),
            )
    }

    /// Query of the person lookup by name.
    #[must_use]
    pub fn person_query() -> Schema {
        Schema::new("PersonQuery")
            .field(
                FieldConstraint::string("name")
                    .source(Source::Query)
                    .optional()
                    .min_length(1)
                    .max_length(50)
                    .title("Person Name")
                    .description("This is the person name. It's between 1 and 50 characters")
                    .example("Rocío"),
            )
            .field(
                FieldConstraint::string("age")
                    .source(Source::Query)
                    .title("Person Age")
                    .description("This is the person age. It's required")
                    .example(25),
            )
    }

    /// A positive person id taken from the path.
    #[must_use]
    pub fn person_id() -> FieldConstraint {
        FieldConstraint::integer("person_id")
            .source(Source::Path)
            .gt(0)
            .title("Person ID")
            .description("This is the person ID")
            .example(123)
    }

    /// Update input: id, person and location.
    #[must_use]
    pub fn person_update() -> Schema {
        Schema::new("PersonUpdate")
            .field(person_id())
            .field(FieldConstraint::object("person", person()))
            .field(FieldConstraint::object("location", location()))
    }

    /// A single image upload.
    #[must_use]
    pub fn image_upload() -> Schema {
        Schema::new("ImageUpload").field(FieldConstraint::file("image"))
    }

    /// Several image uploads under one name.
    #[must_use]
    pub fn images_upload() -> Schema {
        Schema::new("ImagesUpload").field(FieldConstraint::files("images"))
    }
}

/// The operations of the service.
#[must_use]
pub fn contract() -> Contract {
    Contract::builder("persons")
        .version("1.0.0")
        .operation(
            Operation::builder("home")
                .method(Method::GET)
                .path("/")
                .summary("Home Title")
                .tag("Home")
                .build(),
        )
        .operation(
            Operation::builder("createPerson")
                .method(Method::POST)
                .path("/person/new")
                .input(schemas::person().from_source(Source::Body))
                .output(schemas::person_out())
                .status(StatusCode::CREATED)
                .summary("Create Person in App")
                .description("Creates a person in the application.")
                .tag("Persons")
                .build(),
        )
        .operation(
            Operation::builder("showPerson")
                .method(Method::GET)
                .path("/person/detail")
                .input(schemas::person_query())
                .tag("Persons")
                .deprecated()
                .build(),
        )
        .operation(
            Operation::builder("showPersonById")
                .method(Method::GET)
                .path("/person/detail/{person_id}")
                .input(Schema::new("PersonById").field(schemas::person_id()))
                .tag("Persons")
                .build(),
        )
        .operation(
            Operation::builder("updatePerson")
                .method(Method::PUT)
                .path("/person/{person_id}")
                .input(schemas::person_update())
                .output(schemas::person_with_location_out())
                .tag("Persons")
                .build(),
        )
        .operation(
            Operation::builder("login")
                .method(Method::POST)
                .path("/login")
                .input(schemas::login_form())
                .output(schemas::login_out())
                .tag("Auth")
                .build(),
        )
        .operation(
            Operation::builder("contact")
                .method(Method::POST)
                .path("/contact")
                .input(schemas::contact_form())
                .tag("Contact")
                .build(),
        )
        .operation(
            Operation::builder("postImage")
                .method(Method::POST)
                .path("/post-image")
                .input(schemas::image_upload())
                .tag("Files")
                .build(),
        )
        .operation(
            Operation::builder("postMultipleImages")
                .method(Method::POST)
                .path("/post-multiple-images")
                .input(schemas::images_upload())
                .tag("Files")
                .build(),
        )
        .build()
}

/// Builds the service with default limits and the default directory.
///
/// # Errors
///
/// Returns [`BuildError`] if an operation lacks a handler.
pub fn service() -> Result<Service, BuildError> {
    service_with(PersonDirectory::default(), Limits::default())
}

/// Builds the service with the limits of `config`.
///
/// # Errors
///
/// Returns [`BuildError`] if an operation lacks a handler.
pub fn service_from_config(config: &RegistrarConfig) -> Result<Service, BuildError> {
    service_with(PersonDirectory::default(), Limits::from(&config.limits))
}

/// Builds the service around `directory` with the given limits.
///
/// # Errors
///
/// Returns [`BuildError`] if an operation lacks a handler.
pub fn service_with(directory: PersonDirectory, limits: Limits) -> Result<Service, BuildError> {
    let directory = Arc::new(directory);

    Service::builder(contract())
        .limits(limits)
        .handler("home", |_ctx, _input| async {
            Ok(Value::Object(Entity::new().with("Hello", "World")))
        })
        .handler("createPerson", |_ctx, input| async move { Ok(Value::Object(input)) })
        .handler("showPerson", |_ctx, input| async move { Ok(show_person(&input)) })
        .handler("showPersonById", move |_ctx, input| {
            let directory = Arc::clone(&directory);
            async move { show_person_by_id(&directory, &input) }
        })
        .handler("updatePerson", |_ctx, input| async move {
            Ok(Value::Object(flatten(&input, &["person", "location"])))
        })
        .handler("login", |_ctx, input| async move {
            let username = input.get("username").cloned().unwrap_or(Value::Null);
            Ok(Value::Object(Entity::new().with("username", username)))
        })
        .handler("contact", |_ctx, input| async move {
            Ok(input.get("user_agent").cloned().unwrap_or(Value::Null))
        })
        .handler("postImage", |_ctx, input| async move {
            match input.get("image").and_then(Value::as_file) {
                Some(image) => Ok(Value::Object(image_summary(image, "Filename"))),
                None => Err(ApiError::internal("validated image missing")),
            }
        })
        .handler("postMultipleImages", |_ctx, input| async move {
            let images = input.get("images").and_then(Value::as_list).unwrap_or_default();
            Ok(Value::List(
                images
                    .iter()
                    .filter_map(Value::as_file)
                    .map(|image| Value::Object(image_summary(image, "filename")))
                    .collect(),
            ))
        })
        .build()
}

/// `{name: age}`; an absent name becomes the key `null`.
fn show_person(input: &Entity) -> Value {
    let name = input.get_str("name").unwrap_or("null").to_string();
    let age = input.get("age").cloned().unwrap_or(Value::Null);
    Entity::new().with(name, age).into()
}

fn show_person_by_id(directory: &PersonDirectory, input: &Entity) -> Result<Value, ApiError> {
    let id = input
        .get_i64("person_id")
        .ok_or_else(|| ApiError::internal("validated person_id missing"))?;
    if !directory.contains(id) {
        return Err(ApiError::not_found(PERSON_NOT_FOUND));
    }
    Ok(Entity::new().with(id.to_string(), "It exists!").into())
}

fn image_summary(image: &FileInfo, name_key: &str) -> Entity {
    Entity::new()
        .with(name_key, image.file_name().map(String::from))
        .with("Format", image.content_type().map(String::from))
        .with("Size(kb)", image.size_kb())
}
