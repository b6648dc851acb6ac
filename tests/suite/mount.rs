//! Route table construction and mounting.

use std::sync::Arc;

use gangway::decorator::{auth_required, get, post, query_param};
use gangway::session::NoSessions;
use gangway::{
    Application, Arguments, Controller, Error, Registration, Result, RouteTable, Verb,
    async_trait,
};
use serde_json::Value;

use super::fixture::{Items, test_config};

/// A controller whose route table is supplied by the test.
struct Table {
    base: &'static str,
    routes: fn() -> Result<RouteTable>,
}

#[async_trait]
impl Controller for Table {
    fn base_path(&self) -> &str {
        self.base
    }

    fn routes(&self) -> Result<RouteTable> {
        (self.routes)()
    }

    async fn invoke(&self, _method: &str, _args: Arguments) -> Result<Value> {
        Ok(Value::Null)
    }
}

fn app() -> Application {
    Application::with_sessions(test_config(), Arc::new(NoSessions))
}

#[test]
fn mounts_exactly_one_registration_per_entry() {
    let mut app = app();
    app.mount(Table {
        base: "/api",
        routes: || {
            RouteTable::builder()
                .route("a", [get("/a")])
                .route("b", [post("/b")])
                .build()
        },
    })
    .unwrap();

    assert_eq!(
        app.registrations(),
        [
            Registration {
                verb: Verb::Get,
                path: "/api/a".to_string(),
                method: "a".to_string(),
            },
            Registration {
                verb: Verb::Post,
                path: "/api/b".to_string(),
                method: "b".to_string(),
            },
        ]
    );
}

#[test]
fn registrations_follow_decoration_order() {
    let mut app = app();
    app.mount(Items::default()).unwrap();

    let bound: Vec<_> = app
        .registrations()
        .iter()
        .map(|r| (r.verb, r.path.as_str()))
        .collect();
    assert_eq!(
        bound,
        [
            (Verb::Get, "/api/items"),
            (Verb::Post, "/api/items"),
            (Verb::Put, "/api/items"),
            (Verb::Delete, "/api/items"),
            (Verb::Get, "/api/locked"),
            (Verb::Delete, "/api/admin/items"),
        ]
    );
}

#[test]
fn route_without_mapping_aborts_mount() {
    let mut app = app();
    let result = app.mount(Table {
        base: "/api",
        routes: || {
            RouteTable::builder()
                .route("listed", [get("/listed")])
                .route("guarded", [auth_required(), query_param(0, "id")])
                .build()
        },
    });

    let err = result.err().expect("mount must fail");
    assert!(err.is_configuration());
    assert!(matches!(err, Error::MissingRoute { ref method } if method == "guarded"));
    assert!(app.registrations().is_empty());
}

#[test]
fn negative_parameter_index_aborts_mount() {
    let mut app = app();
    let result = app.mount(Table {
        base: "",
        routes: || {
            RouteTable::builder()
                .route("search", [get("/search"), query_param(-2, "q")])
                .build()
        },
    });

    assert!(matches!(
        result.err(),
        Some(Error::InvalidParameterIndex { index: -2, .. })
    ));
}

#[test]
fn static_and_parameter_paths_register_separately() {
    let mut app = app();
    app.mount(Table {
        base: "/api",
        routes: || {
            RouteTable::builder()
                .route("find", [get("/items/{id}")])
                .route("search", [get("/items/search")])
                .build()
        },
    })
    .unwrap();

    let methods: Vec<_> = app.registrations().iter().map(|r| r.method.as_str()).collect();
    assert_eq!(methods, ["find", "search"]);
}

#[test]
fn duplicate_verb_and_path_aborts_mount() {
    let mut app = app();
    let result = app.mount(Table {
        base: "/api",
        routes: || {
            RouteTable::builder()
                .route("first", [get("/a")])
                .route("second", [get("/a")])
                .build()
        },
    });

    let err = result.err().expect("mount must fail");
    assert!(err.is_configuration());
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn controllers_sharing_a_route_conflict() {
    let mut app = app();
    app.mount(Items::default()).unwrap();

    let result = app.mount(Table {
        base: "/api",
        routes: || RouteTable::builder().route("shadow", [get("/items")]).build(),
    });
    assert!(matches!(result.err(), Some(Error::Config(_))));
}
