//! Dispatcher behaviour tests.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use rstest::{fixture, rstest};

use super::*;
use crate::dispatch::response::Status;

const NOW: i64 = 1_700_000_000;

fn request(method: &str, path: &str) -> Request {
    Request::new(method, path, NOW)
}

fn body_of(response: &Response) -> &str {
    response.body.as_deref().unwrap_or_default()
}

#[fixture]
fn dispatcher() -> Dispatcher {
    Dispatcher::new(CategoryStore::seeded())
}

#[fixture]
fn empty_dispatcher() -> Dispatcher {
    Dispatcher::new(CategoryStore::empty())
}

#[rstest]
fn reads_seeded_collection(dispatcher: Dispatcher) {
    let response = dispatcher.handle(&request("read", "/api/categories"));
    assert_eq!(response.status, Status::Ok);
    assert_eq!(
        body_of(&response),
        r#"[{"cid":1,"name":"Beverages"},{"cid":2,"name":"Condiments"},{"cid":3,"name":"Confections"}]"#
    );
}

#[rstest]
fn reads_single_category(dispatcher: Dispatcher) {
    let response = dispatcher.handle(&request("Read", "/api/categories/2"));
    assert_eq!(
        response,
        Response::ok(Some(r#"{"cid":2,"name":"Condiments"}"#.to_owned()))
    );
}

#[rstest]
fn reading_unknown_id_is_not_found(dispatcher: Dispatcher) {
    let response = dispatcher.handle(&request("read", "/api/categories/99"));
    assert_eq!(response, Response::not_found());
}

#[rstest]
fn empty_store_lists_as_empty_array(empty_dispatcher: Dispatcher) {
    let response = empty_dispatcher.handle(&request("read", "/api/categories"));
    assert_eq!(response, Response::ok(Some("[]".to_owned())));
}

#[rstest]
#[case::plain("Hello World")]
#[case::empty("")]
#[case::json_text(r#"{"name":"not parsed"}"#)]
fn echo_returns_body_verbatim(dispatcher: Dispatcher, #[case] text: &str) {
    let response = dispatcher.handle(&Request::new("echo", "", NOW).with_body(text));
    assert_eq!(response, Response::ok(Some(text.to_owned())));
    assert_eq!(dispatcher.store().list().len(), 3);
}

#[rstest]
fn create_assigns_next_id_after_seed(dispatcher: Dispatcher) {
    let response =
        dispatcher.handle(&request("create", "/api/categories").with_body(r#"{"name":"Seafood"}"#));
    assert_eq!(
        response,
        Response::ok(Some(r#"{"cid":4,"name":"Seafood"}"#.to_owned()))
    );
    assert_eq!(dispatcher.store().get(4), Some(Category::new(4, "Seafood")));
}

#[rstest]
fn create_on_empty_store_starts_at_one(empty_dispatcher: Dispatcher) {
    let response = empty_dispatcher
        .handle(&request("create", "/api/categories").with_body(r#"{"name":"Produce"}"#));
    assert_eq!(body_of(&response), r#"{"cid":1,"name":"Produce"}"#);
}

#[rstest]
fn create_ignores_body_id(dispatcher: Dispatcher) {
    let response = dispatcher
        .handle(&request("create", "/api/categories").with_body(r#"{"id":42,"name":"Grains"}"#));
    assert_eq!(body_of(&response), r#"{"cid":4,"name":"Grains"}"#);
    assert_eq!(dispatcher.store().get(42), None);
}

#[rstest]
fn deleted_max_id_is_reused(dispatcher: Dispatcher) {
    let created =
        dispatcher.handle(&request("create", "/api/categories").with_body(r#"{"name":"A"}"#));
    assert_eq!(body_of(&created), r#"{"cid":4,"name":"A"}"#);

    let deleted = dispatcher.handle(&request("delete", "/api/categories/4"));
    assert_eq!(deleted, Response::ok(Some(String::new())));

    let recreated =
        dispatcher.handle(&request("create", "/api/categories").with_body(r#"{"name":"B"}"#));
    assert_eq!(body_of(&recreated), r#"{"cid":4,"name":"B"}"#);
}

#[rstest]
fn deleting_below_max_does_not_reuse_id(dispatcher: Dispatcher) {
    dispatcher.handle(&request("delete", "/api/categories/2"));
    let created =
        dispatcher.handle(&request("create", "/api/categories").with_body(r#"{"name":"C"}"#));
    assert_eq!(body_of(&created), r#"{"cid":4,"name":"C"}"#);
}

#[rstest]
fn update_renames_existing_category(dispatcher: Dispatcher) {
    let response = dispatcher
        .handle(&request("update", "/api/categories/3").with_body(r#"{"id":3,"name":"Sweets"}"#));
    assert_eq!(response, Response::updated());
    assert_eq!(dispatcher.store().get(3), Some(Category::new(3, "Sweets")));
}

#[rstest]
fn update_of_unknown_id_is_not_found(dispatcher: Dispatcher) {
    let response =
        dispatcher.handle(&request("update", "/api/categories/77").with_body(r#"{"name":"X"}"#));
    assert_eq!(response, Response::not_found());
}

#[rstest]
fn delete_of_unknown_id_is_not_found(dispatcher: Dispatcher) {
    assert_eq!(
        dispatcher.handle(&request("delete", "/api/categories/8")),
        Response::not_found()
    );
}

#[rstest]
#[case::create_with_id(
    request("create", "/api/categories/5").with_body(r#"{"name":"X"}"#),
    "CREATE operation cannot have ID in URL"
)]
#[case::update_without_id(
    request("update", "/api/categories").with_body(r#"{"name":"X"}"#),
    "UPDATE operation requires ID in URL"
)]
#[case::update_non_numeric(
    request("update", "/api/categories/abc").with_body(r#"{"name":"X"}"#),
    "UPDATE operation requires ID in URL"
)]
#[case::delete_without_id(request("delete", "/api/categories"), "DELETE operation requires ID in URL")]
#[case::delete_non_numeric(request("delete", "/api/categories/abc"), "DELETE operation requires ID in URL")]
#[case::missing_name(request("create", "/api/categories").with_body("{}"), "Missing 'name' field in request body")]
#[case::empty_name(
    request("create", "/api/categories").with_body(r#"{"name":""}"#),
    "Name cannot be empty"
)]
#[case::update_empty_name(
    request("update", "/api/categories/1").with_body(r#"{"name":""}"#),
    "Name cannot be empty"
)]
#[case::blank_path(request("read", "   "), "Invalid URL format")]
fn rejects_with_reason(dispatcher: Dispatcher, #[case] input: Request, #[case] reason: &str) {
    assert_eq!(dispatcher.handle(&input), Response::bad_request(reason));
}

#[rstest]
fn reads_of_non_numeric_members_are_not_found(dispatcher: Dispatcher) {
    let response = dispatcher.handle(&request("read", "/api/categories/abc"));
    assert_eq!(response, Response::not_found());
}

#[rstest]
#[case::other_collection("/api/products")]
#[case::nested("/api/categories/1/items")]
#[case::root("/")]
fn unknown_resources_are_not_found(dispatcher: Dispatcher, #[case] path: &str) {
    assert_eq!(dispatcher.handle(&request("read", path)), Response::not_found());
}

#[rstest]
fn grammar_failures_are_returned_verbatim(dispatcher: Dispatcher) {
    let response = dispatcher.handle(&Request::new("", "/api/categories", 0));
    assert_eq!(
        response,
        Response::bad_request("missing method, missing date")
    );
}

#[rstest]
fn concurrent_creates_receive_distinct_ids(empty_dispatcher: Dispatcher) {
    const WRITERS: u64 = 16;

    let dispatcher = Arc::new(empty_dispatcher);
    let handles: Vec<_> = (0..WRITERS)
        .map(|index| {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || {
                let body = format!(r#"{{"name":"writer-{index}"}}"#);
                dispatcher.handle(&request("create", "/api/categories").with_body(body))
            })
        })
        .collect();

    let ids: BTreeSet<u64> = handles
        .into_iter()
        .map(|handle| {
            let response = handle.join().expect("writer thread");
            assert_eq!(response.status, Status::Ok);
            let value: serde_json::Value =
                serde_json::from_str(body_of(&response)).expect("category json");
            value["cid"].as_u64().expect("cid")
        })
        .collect();

    assert_eq!(ids, (1..=WRITERS).collect());
}

#[rstest]
#[case(None, 1)]
#[case(Some(3), 4)]
#[case(Some(u64::MAX), u64::MAX)]
fn next_id_follows_largest_key(#[case] max: Option<CategoryId>, #[case] expected: CategoryId) {
    assert_eq!(next_id(max), expected);
}

#[rstest]
#[case::create_positional(request("create", "/api/categories").with_body(r#"[7,"Evil"]"#))]
#[case::create_empty_array(request("create", "/api/categories").with_body("[]"))]
#[case::update_positional(request("update", "/api/categories/1").with_body(r#"[1,"Renamed"]"#))]
fn array_bodies_leave_the_store_untouched(dispatcher: Dispatcher, #[case] input: Request) {
    assert_eq!(dispatcher.handle(&input), Response::bad_request("illegal body"));
    assert_eq!(
        dispatcher.store().list(),
        CategoryStore::seeded().list(),
        "store changed after a rejected body"
    );
}

#[rstest]
fn echo_ignores_the_store_and_path(empty_dispatcher: Dispatcher) {
    let response =
        empty_dispatcher.handle(&request("echo", "/not/a/resource").with_body("ping"));
    assert_eq!(response, Response::ok(Some("ping".to_owned())));
}
