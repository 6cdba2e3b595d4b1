//! End-to-end runs of the binary against a stub SSM endpoint.

mod common;

use common::{run_gather, StubResponse, StubStore};
use serde_json::json;

#[test]
fn assembles_paginated_parameters_into_json() {
    let stub = StubStore::serve(vec![
        StubResponse::ok(json!({
            "Parameters": [
                { "Name": "/app/db/password", "Value": "hunter2", "Type": "SecureString" },
                { "Name": "/app/db/user", "Value": "admin", "Type": "String" },
            ],
            "NextToken": "page-2",
        })),
        StubResponse::ok(json!({
            "Parameters": [
                { "Name": "/app/flag", "Value": "on", "Type": "String" },
            ],
        })),
    ]);

    let output = run_gather(&stub.endpoint, &["/app"]);
    let requests = stub.finish();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(
        tree,
        json!({ "db": { "password": "hunter2", "user": "admin" }, "flag": "on" })
    );

    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body["Path"], json!("/app"));
    assert_eq!(requests[0].body["Recursive"], json!(true));
    assert_eq!(requests[0].body["WithDecryption"], json!(true));
    assert!(requests[0].body.get("NextToken").is_none());
    assert_eq!(requests[1].body["NextToken"], json!("page-2"));
}

#[test]
fn plain_type_filter_disables_decryption() {
    let stub = StubStore::serve(vec![StubResponse::ok(json!({ "Parameters": [] }))]);

    let output = run_gather(&stub.endpoint, &["/app", "--type", "String"]);
    let requests = stub.finish();

    assert!(output.status.success());
    assert_eq!(requests[0].body["WithDecryption"], json!(false));
    assert_eq!(
        requests[0].body["ParameterFilters"],
        json!([{ "Key": "Type", "Values": ["String"] }])
    );
}

#[test]
fn secret_type_filter_requests_decryption() {
    let stub = StubStore::serve(vec![StubResponse::ok(json!({ "Parameters": [] }))]);

    let output = run_gather(&stub.endpoint, &["/app", "-t", "SecureString"]);
    let requests = stub.finish();

    assert!(output.status.success());
    assert_eq!(requests[0].body["WithDecryption"], json!(true));
    assert_eq!(
        requests[0].body["ParameterFilters"],
        json!([{ "Key": "Type", "Values": ["SecureString"] }])
    );
}

#[test]
fn empty_result_prints_an_empty_object() {
    let stub = StubStore::serve(vec![StubResponse::ok(json!({ "Parameters": [] }))]);

    let output = run_gather(&stub.endpoint, &["/nothing"]);
    stub.finish();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim_end(), "{}");
}

#[test]
fn yaml_output_renders_nested_mappings() {
    let stub = StubStore::serve(vec![StubResponse::ok(json!({
        "Parameters": [
            { "Name": "/app/db/password", "Value": "hunter2", "Type": "SecureString" },
        ],
    }))]);

    let output = run_gather(&stub.endpoint, &["/app", "--format", "yaml"]);
    stub.finish();

    assert!(output.status.success());
    let rendered = String::from_utf8_lossy(&output.stdout);
    assert_eq!(rendered.trim_end(), "db:\n  password: hunter2");
}

#[test]
fn requests_carry_a_signature_and_operation_target() {
    let stub = StubStore::serve(vec![StubResponse::ok(json!({ "Parameters": [] }))]);

    let output = run_gather(&stub.endpoint, &["/app"]);
    let requests = stub.finish();

    assert!(output.status.success());
    let authorization = requests[0]
        .authorization
        .as_deref()
        .expect("authorization header");
    assert!(
        authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"),
        "authorization: {authorization}"
    );
    assert!(authorization.contains("/us-east-1/ssm/aws4_request"));
    assert_eq!(
        requests[0].target.as_deref(),
        Some("AmazonSSM.GetParametersByPath")
    );
}
