//! Operation contracts.
//!
//! A [`Contract`] lists the operations a service exposes. Each
//! [`Operation`] pairs a method and path template with the schema its input
//! is validated against and, optionally, the schema its output is projected
//! through.
//!
//! # Example
//!
//! ```
//! use registrar_core::contract::{Contract, Operation};
//! use registrar_core::{FieldConstraint, Schema, Source};
//! use http::Method;
//!
//! let contract = Contract::builder("persons")
//!     .version("1.0.0")
//!     .operation(
//!         Operation::builder("showPersonById")
//!             .method(Method::GET)
//!             .path("/person/detail/{person_id}")
//!             .input(Schema::new("ShowPersonById").field(
//!                 FieldConstraint::integer("person_id").gt(0).source(Source::Path),
//!             ))
//!             .build(),
//!     )
//!     .build();
//!
//! let (operation, params) = contract.resolve(&Method::GET, "/person/detail/3").unwrap();
//! assert_eq!(operation.operation_id(), "showPersonById");
//! assert_eq!(params.get("person_id"), Some("3"));
//! ```

use http::{Method, StatusCode};
use std::collections::HashMap;

use crate::error::ApiError;
use crate::path::{Params, PathTemplate};
use crate::schema::{Schema, Source};

/// The operations of one service.
#[derive(Debug, Clone)]
pub struct Contract {
    name: String,
    version: String,
    operations: Vec<Operation>,
    operation_index: HashMap<String, usize>,
}

impl Contract {
    /// Creates a new contract builder.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ContractBuilder {
        ContractBuilder::new(name)
    }

    /// Returns the service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the contract version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns all operations, in declaration order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Looks up an operation by its ID.
    #[must_use]
    pub fn get_operation(&self, operation_id: &str) -> Option<&Operation> {
        self.operation_index
            .get(operation_id)
            .and_then(|&idx| self.operations.get(idx))
    }

    /// Finds the operation for a method and request path.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when no template matches the path, and
    /// [`ApiError::MethodNotAllowed`] when templates match but none for this
    /// method.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<(&Operation, Params), ApiError> {
        let mut allowed = Vec::new();

        for operation in &self.operations {
            if let Some(params) = operation.path.matches(path) {
                if operation.method == *method {
                    return Ok((operation, params));
                }
                allowed.push(operation.method.clone());
            }
        }

        if allowed.is_empty() {
            Err(ApiError::not_found(format!("no route for {path}")))
        } else {
            Err(ApiError::method_not_allowed(method.clone(), allowed))
        }
    }

    /// Documentation for every operation, keyed by path then method.
    #[must_use]
    pub fn describe(&self) -> serde_json::Value {
        let mut paths = serde_json::Map::new();
        for operation in &self.operations {
            let entry = paths
                .entry(operation.path.as_str().to_string())
                .or_insert_with(|| serde_json::json!({}));
            if let Some(methods) = entry.as_object_mut() {
                methods.insert(
                    operation.method.as_str().to_ascii_lowercase(),
                    operation.describe(),
                );
            }
        }
        serde_json::json!({
            "info": { "title": self.name, "version": self.version },
            "paths": paths,
        })
    }
}

/// Builder for creating [`Contract`] instances.
#[derive(Debug)]
pub struct ContractBuilder {
    name: String,
    version: String,
    operations: Vec<Operation>,
}

impl ContractBuilder {
    /// Creates a new contract builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "0.0.0".to_string(),
            operations: Vec::new(),
        }
    }

    /// Sets the contract version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Adds an operation.
    #[must_use]
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Builds the contract.
    #[must_use]
    pub fn build(self) -> Contract {
        let operation_index = self
            .operations
            .iter()
            .enumerate()
            .map(|(idx, op)| (op.operation_id.clone(), idx))
            .collect();
        Contract {
            name: self.name,
            version: self.version,
            operations: self.operations,
            operation_index,
        }
    }
}

/// One endpoint: method, path template, input and output schemas.
#[derive(Debug, Clone)]
pub struct Operation {
    operation_id: String,
    method: Method,
    path: PathTemplate,
    input: Schema,
    output: Option<Schema>,
    status: StatusCode,
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    deprecated: bool,
}

impl Operation {
    /// Creates a new operation builder.
    #[must_use]
    pub fn builder(operation_id: impl Into<String>) -> OperationBuilder {
        OperationBuilder::new(operation_id)
    }

    /// Returns the operation ID.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path template.
    #[must_use]
    pub fn path(&self) -> &PathTemplate {
        &self.path
    }

    /// The combined input schema. Each field carries its own source.
    #[must_use]
    pub fn input(&self) -> &Schema {
        &self.input
    }

    /// The schema results are projected through, if any.
    #[must_use]
    pub fn output(&self) -> Option<&Schema> {
        self.output.as_ref()
    }

    /// Status returned on success.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// One-line summary.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Returns the operation tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns true if the operation is deprecated.
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    /// Documentation for this operation.
    #[must_use]
    pub fn describe(&self) -> serde_json::Value {
        let parameters: Vec<serde_json::Value> = self
            .input
            .fields()
            .filter(|f| {
                matches!(
                    f.location(),
                    Source::Path | Source::Query | Source::Header | Source::Cookie
                )
            })
            .map(|f| {
                serde_json::json!({
                    "name": f.external_name(),
                    "in": f.location(),
                    "required": f.is_required(),
                    "schema": f.describe(),
                })
            })
            .collect();

        let mut responses = serde_json::Map::new();
        responses.insert(
            self.status.as_u16().to_string(),
            serde_json::json!({ "schema": self.output.as_ref().map(Schema::describe) }),
        );

        let mut doc = serde_json::json!({
            "operationId": self.operation_id,
            "tags": self.tags,
            "deprecated": self.deprecated,
            "parameters": parameters,
            "responses": responses,
        });

        if let Some(obj) = doc.as_object_mut() {
            if let Some(summary) = &self.summary {
                obj.insert("summary".to_string(), summary.clone().into());
            }
            if let Some(description) = &self.description {
                obj.insert("description".to_string(), description.clone().into());
            }
            let body: Vec<_> = self
                .input
                .fields()
                .filter(|f| matches!(f.location(), Source::Body | Source::Form | Source::File))
                .collect();
            if !body.is_empty() {
                let mut request = Schema::new(format!("{}Request", self.operation_id));
                for field in body {
                    request = request.field(field.clone());
                }
                obj.insert("requestBody".to_string(), request.describe());
            }
        }
        doc
    }
}

/// Builder for creating [`Operation`] instances.
#[derive(Debug)]
pub struct OperationBuilder {
    operation_id: String,
    method: Method,
    path: String,
    input: Option<Schema>,
    output: Option<Schema>,
    status: StatusCode,
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    deprecated: bool,
}

impl OperationBuilder {
    /// Creates a new operation builder.
    #[must_use]
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            method: Method::GET,
            path: "/".to_string(),
            input: None,
            output: None,
            status: StatusCode::OK,
            summary: None,
            description: None,
            tags: Vec::new(),
            deprecated: false,
        }
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the path template.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the input schema.
    #[must_use]
    pub fn input(mut self, schema: Schema) -> Self {
        self.input = Some(schema);
        self
    }

    /// Sets the output schema.
    #[must_use]
    pub fn output(mut self, schema: Schema) -> Self {
        self.output = Some(schema);
        self
    }

    /// Sets the success status.
    #[must_use]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Sets the summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Marks the operation deprecated.
    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Builds the operation. Without an input schema the operation takes no input.
    #[must_use]
    pub fn build(self) -> Operation {
        let input = self
            .input
            .unwrap_or_else(|| Schema::new(format!("{}Input", self.operation_id)));
        Operation {
            path: PathTemplate::parse(self.path),
            operation_id: self.operation_id,
            method: self.method,
            input,
            output: self.output,
            status: self.status,
            summary: self.summary,
            description: self.description,
            tags: self.tags,
            deprecated: self.deprecated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::schema::FieldConstraint;

    fn contract() -> Contract {
        Contract::builder("persons")
            .version("1.0.0")
            .operation(Operation::builder("home").path("/").build())
            .operation(
                Operation::builder("showPersonById")
                    .path("/person/detail/{person_id}")
                    .input(Schema::new("ById").field(
                        FieldConstraint::integer("person_id").gt(0).source(Source::Path),
                    ))
                    .tag("Persons")
                    .build(),
            )
            .operation(
                Operation::builder("updatePerson")
                    .method(Method::PUT)
                    .path("/person/{person_id}")
                    .build(),
            )
            .operation(
                Operation::builder("createPerson")
                    .method(Method::POST)
                    .path("/person/new")
                    .status(StatusCode::CREATED)
                    .input(Schema::new("Person").field(FieldConstraint::string("first_name")))
                    .output(Schema::new("PersonOut").field(FieldConstraint::string("first_name")))
                    .build(),
            )
            .operation(
                Operation::builder("showPerson")
                    .path("/person/detail")
                    .summary("Show person")
                    .deprecated()
                    .build(),
            )
            .build()
    }

    #[test]
    fn test_lookup_by_id() {
        let contract = contract();
        assert_eq!(contract.operations().len(), 5);
        assert_eq!(
            contract.get_operation("createPerson").unwrap().status(),
            StatusCode::CREATED
        );
        assert!(contract.get_operation("nope").is_none());
        assert!(contract.get_operation("showPerson").unwrap().is_deprecated());
    }

    #[test]
    fn test_resolve() {
        let contract = contract();

        let (op, params) = contract.resolve(&Method::GET, "/").unwrap();
        assert_eq!(op.operation_id(), "home");
        assert!(params.is_empty());

        let (op, params) = contract.resolve(&Method::PUT, "/person/7").unwrap();
        assert_eq!(op.operation_id(), "updatePerson");
        assert_eq!(params.get("person_id"), Some("7"));

        let (op, _) = contract.resolve(&Method::POST, "/person/new").unwrap();
        assert_eq!(op.operation_id(), "createPerson");

        let (op, _) = contract.resolve(&Method::GET, "/person/detail").unwrap();
        assert_eq!(op.operation_id(), "showPerson");
    }

    #[test]
    fn test_resolve_failures() {
        let contract = contract();

        let err = contract.resolve(&Method::GET, "/missing").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);

        let err = contract.resolve(&Method::DELETE, "/person/7").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::MethodNotAllowed);
        assert!(matches!(
            err,
            ApiError::MethodNotAllowed { ref allowed, .. } if allowed == &vec![Method::PUT]
        ));
    }

    #[test]
    fn test_describe() {
        let doc = contract().describe();
        assert_eq!(doc["info"]["version"], "1.0.0");

        let by_id = &doc["paths"]["/person/detail/{person_id}"]["get"];
        assert_eq!(by_id["operationId"], "showPersonById");
        assert_eq!(by_id["parameters"][0]["in"], "path");
        assert_eq!(by_id["parameters"][0]["schema"]["exclusiveMinimum"], 0);

        let create = &doc["paths"]["/person/new"]["post"];
        assert_eq!(create["requestBody"]["required"], serde_json::json!(["first_name"]));
        assert_eq!(create["responses"]["201"]["schema"]["title"], "PersonOut");

        assert_eq!(doc["paths"]["/person/detail"]["get"]["deprecated"], true);
        assert_eq!(doc["paths"]["/person/detail"]["get"]["summary"], "Show person");
    }
}
