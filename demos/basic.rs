//! Basic example demonstrating servicemock usage.
//!
//! Run with: cargo run --example basic

use serde_json::{json, Value};
use servicemock::{MockServer, Request, Response, ResponseBody, ServiceMock};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sm = ServiceMock::new();
    let server = MockServer::start(&sm).await?;

    println!("Mock server started at {}", server.url());
    println!();

    // Declare the requests the client is expected to make
    sm.expect(server.url(), &server)
        .to_receive(Request::get("/v1/status-check"))
        .and_responds(Response::ok(ResponseBody::json(json!({"status": "ok"}))));

    sm.expect(server.url(), &server)
        .to_receive(Request::post("/v1/users").with_json(json!({"name": "mika"})))
        .and_responds(Response::new(201));

    sm.expect(server.url(), &server)
        .to_receive(Request::delete("/v1/users/1"));

    println!("Expected requests:");
    for expectation in sm.expectations() {
        println!("  - {}", expectation);
    }
    println!();

    let client = reqwest::Client::new();

    println!("=== GET /v1/status-check ===");
    let status: Value = client
        .get(format!("{}/v1/status-check", server.url()))
        .send()
        .await?
        .json()
        .await?;
    println!("Response: {}\n", status);

    println!("=== POST /v1/users ===");
    let created = client
        .post(format!("{}/v1/users", server.url()))
        .json(&json!({"name": "mika"}))
        .send()
        .await?;
    println!("Status: {}\n", created.status());

    println!("=== GET /v1/unknown ===");
    let unknown = client
        .get(format!("{}/v1/unknown", server.url()))
        .send()
        .await?;
    println!("Status: {}", unknown.status());
    println!("{}\n", unknown.text().await?);

    // DELETE /v1/users/1 was never sent
    match sm.verify() {
        Ok(()) => println!("All expected requests were made."),
        Err(e) => println!("Verification failed: {}", e),
    }

    Ok(())
}
