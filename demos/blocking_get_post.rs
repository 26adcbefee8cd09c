//! Fetch a post and create one against a public JSON API.
//!
//! Run:
//! `cargo run --example blocking_get_post`
//!
//! Optional env vars:
//! - `REST_BASE_URL` (defaults to `https://jsonplaceholder.typicode.com`)

use restful_client::{ClientError, RestClient};
use serde_json::json;

fn main() {
    let base_url = std::env::var("REST_BASE_URL")
        .unwrap_or_else(|_| "https://jsonplaceholder.typicode.com".to_owned());

    let mut client = RestClient::new(base_url);
    client.add_header("Accept", "application/json");
    client.add_header("Content-Type", "application/json");

    let outcome = client.get("/posts/1").and_then(|response| {
        println!("Status Code: {}", response.status_code());
        println!("Body: {}", response.body());

        client.post("/posts", &json!({ "title": "hello", "body": "world", "userId": 1 }))
    });

    match outcome {
        Ok(created) => println!("Created: {}", created.json()),
        Err(ClientError::HttpStatus { status, message }) => {
            eprintln!("HTTP Request Exception: {message} (Status Code: {status})");
        }
        Err(ClientError::JsonParse(message)) => eprintln!("JSON Parse Exception: {message}"),
        Err(ClientError::Network(message)) => eprintln!("Network Exception: {message}"),
    }
}
