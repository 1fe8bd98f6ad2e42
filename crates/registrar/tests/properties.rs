//! Property tests over the persons service.

use bytes::Bytes;
use http::{header, Request, StatusCode};
use proptest::prelude::*;
use registrar::persons;
use serde_json::json;

fn create_person(age: i64, password: &str) -> (StatusCode, serde_json::Value) {
    let body = json!({
        "first_name": "Miguel",
        "last_name": "Torres",
        "age": age,
        "password": password,
    });
    let request = Request::post("/person/new")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Bytes::from(body.to_string()))
        .unwrap();

    let service = persons::service().unwrap();
    let response = tokio_test::block_on(service.handle(request));
    let status = response.status();
    (status, serde_json::from_slice(response.body()).unwrap())
}

proptest! {
    #[test]
    fn secret_never_leaves_the_service(password in "[a-zA-Z0-9]{0,24}") {
        let (_, body) = create_person(25, &password);
        let text = body.to_string();
        prop_assert!(body.get("password").is_none());
        if password.len() >= 8 {
            prop_assert!(!text.contains(&password));
        } else {
            prop_assert!(body["error"]["details"][0].get("value").is_none());
        }
    }

    #[test]
    fn age_accepted_exactly_within_bounds(age in -50_i64..200) {
        let (status, body) = create_person(age, "12345678");
        if (1..=115).contains(&age) {
            prop_assert_eq!(status, StatusCode::CREATED);
            prop_assert_eq!(&body["age"], &json!(age));
        } else {
            prop_assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            prop_assert_eq!(&body["error"]["details"][0]["path"], &json!("age"));
        }
    }

    #[test]
    fn known_ids_exist_and_others_do_not(id in 1_i64..1000) {
        let request = Request::get(format!("/person/detail/{id}"))
            .body(Bytes::new())
            .unwrap();
        let service = persons::service().unwrap();
        let response = tokio_test::block_on(service.handle(request));
        let expected = if id <= 5 { StatusCode::OK } else { StatusCode::NOT_FOUND };
        prop_assert_eq!(response.status(), expected);
    }
}
