//! API integration tests
//!
//! These run against a live server with a migrated database and a seeded
//! staff account (admin/admin). Run with: cargo test -- --ignored

use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080";

/// Client with a cookie store and no automatic redirects, so session
/// cookies stick and 303s stay observable.
fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

/// Log in as the seeded staff account
async fn login_as_staff(client: &Client) {
    let response = client
        .post(format!("{}/login/", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

/// Sign up a fresh non-staff user and leave its session on the client
async fn signup_reader(client: &Client) -> String {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let username = format!("reader{}", suffix);

    let response = client
        .post(format!("{}/signup/", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "correct horse battery",
            "password_confirm": "correct horse battery"
        }))
        .send()
        .await
        .expect("Failed to send signup request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    username
}

async fn create_book(client: &Client, body: Value) -> Value {
    let response = client
        .post(format!("{}/books/create/", BASE_URL))
        .json(&body)
        .send()
        .await
        .expect("Failed to send create request");

    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse book")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let response = client()
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_about_is_public() {
    let response = client()
        .get(format!("{}/about/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_home_redirects_unauthenticated_to_login() {
    let response = client()
        .get(format!("{}/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get("location").unwrap().to_str().unwrap(),
        "/login/"
    );
}

#[tokio::test]
#[ignore]
async fn test_listing_is_public() {
    let response = client()
        .get(format!("{}/books/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"].is_array());
    assert!(body["total"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_create_gate_redirect_then_forbidden() {
    // Unauthenticated: sent to the login entry point
    let anonymous = client();
    let response = anonymous
        .get(format!("{}/books/create/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get("location").unwrap().to_str().unwrap(),
        "/login/"
    );

    // Authenticated but not staff: forbidden, no redirect
    let reader = client();
    signup_reader(&reader).await;
    let response = reader
        .get(format!("{}/books/create/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_signup_establishes_session() {
    let client = client();
    let username = signup_reader(&client).await;

    let response = client
        .get(format!("{}/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], username.as_str());
    assert_eq!(body["is_staff"], false);
}

#[tokio::test]
#[ignore]
async fn test_create_with_new_authors_is_idempotent() {
    let client = client();
    login_as_staff(&client).await;

    let book = create_book(
        &client,
        json!({
            "title": "Collected Stories",
            "publication_date": "1995-05-01",
            "new_authors": "John Doe, Jane Smith"
        }),
    )
    .await;

    let authors = book["authors"].as_array().unwrap();
    assert_eq!(authors.len(), 2);
    assert!(authors
        .iter()
        .any(|a| a["first_name"] == "John" && a["last_name"] == "Doe"));
    assert!(authors
        .iter()
        .any(|a| a["first_name"] == "Jane" && a["last_name"] == "Smith"));

    // Resubmitting the same names must reuse the existing author rows
    let book_id = book["id"].as_i64().unwrap();
    let response = client
        .post(format!("{}/books/{}/edit/", BASE_URL, book_id))
        .json(&json!({
            "title": "Collected Stories",
            "publication_date": "1995-05-01",
            "new_authors": "John Doe, Jane Smith"
        }))
        .send()
        .await
        .expect("Failed to send update request");
    assert!(response.status().is_success());

    let updated: Value = response.json().await.expect("Failed to parse book");
    let updated_authors = updated["authors"].as_array().unwrap();
    assert_eq!(updated_authors.len(), 2);
    let ids: Vec<_> = authors.iter().map(|a| a["id"].as_i64().unwrap()).collect();
    for author in updated_authors {
        assert!(ids.contains(&author["id"].as_i64().unwrap()));
    }

    // Cleanup
    let _ = client
        .post(format!("{}/books/{}/delete/", BASE_URL, book_id))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_duplicate_copy_number_rejected() {
    let client = client();
    login_as_staff(&client).await;

    let response = client
        .post(format!("{}/books/create/", BASE_URL))
        .json(&json!({
            "title": "Duplicated Copies",
            "publication_date": "2001-01-01",
            "copies": [
                {"copy_number": 1, "copy_type": "Printed"},
                {"copy_number": 1, "copy_type": "PDF"}
            ]
        }))
        .send()
        .await
        .expect("Failed to send create request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["fields"]["copies[1].copy_number"].is_array());

    // Nothing was persisted
    let list: Value = client
        .get(format!("{}/books/?q=Duplicated Copies", BASE_URL))
        .send()
        .await
        .expect("Failed to send list request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(list["books"].as_array().unwrap().len(), 0);
}

#[tokio::test]
#[ignore]
async fn test_detail_counts_by_availability() {
    let client = client();
    login_as_staff(&client).await;

    let book = create_book(
        &client,
        json!({
            "title": "Counted Copies",
            "publication_date": "2010-03-14",
            "copies": [
                {"copy_number": 1, "copy_type": "Printed"},
                {"copy_number": 2, "copy_type": "Printed"},
                {"copy_number": 3, "copy_type": "PDF", "availability_status": "Reference Only"},
                {"copy_number": 4, "copy_type": "eBook", "availability_status": "Unavailable"}
            ]
        }),
    )
    .await;
    let book_id = book["id"].as_i64().unwrap();

    let detail: Value = client
        .get(format!("{}/books/{}/", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send detail request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(detail["total_copies"], 4);
    assert_eq!(detail["available_copies"], 2);
    assert_eq!(detail["reference_only_copies"], 1);
    assert_eq!(detail["unavailable_copies"], 1);

    // Copies come back ordered by copy_number
    let numbers: Vec<_> = detail["book"]["copies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["copy_number"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);

    let _ = client
        .post(format!("{}/books/{}/delete/", BASE_URL, book_id))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_search_matches_once_across_links() {
    let client = client();
    login_as_staff(&client).await;

    // "Doe" matches both the author and the category of the same book
    let book = create_book(
        &client,
        json!({
            "title": "Single Hit",
            "publication_date": "1988-11-11",
            "new_authors": "John Doe",
            "new_categories": "Doe Studies"
        }),
    )
    .await;
    let book_id = book["id"].as_i64().unwrap();

    let list: Value = client
        .get(format!("{}/books/?q=Doe", BASE_URL))
        .send()
        .await
        .expect("Failed to send list request")
        .json()
        .await
        .expect("Failed to parse response");

    let occurrences = list["books"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|b| b["id"].as_i64() == Some(book_id))
        .count();
    assert_eq!(occurrences, 1);

    let _ = client
        .post(format!("{}/books/{}/delete/", BASE_URL, book_id))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_delete_redirects_to_listing_and_cascades() {
    let client = client();
    login_as_staff(&client).await;

    let book = create_book(
        &client,
        json!({
            "title": "Short Lived",
            "publication_date": "2020-02-02",
            "copies": [{"copy_number": 1, "copy_type": "eBook"}]
        }),
    )
    .await;
    let book_id = book["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/books/{}/delete/", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send delete request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get("location").unwrap().to_str().unwrap(),
        "/books/"
    );

    let response = client
        .get(format!("{}/books/{}/", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send detail request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_copy_formset_add_edit_delete() {
    let client = client();
    login_as_staff(&client).await;

    let book = create_book(
        &client,
        json!({
            "title": "Mutable Copies",
            "publication_date": "2015-06-15",
            "copies": [
                {"copy_number": 1, "copy_type": "Printed"},
                {"copy_number": 2, "copy_type": "PDF"}
            ]
        }),
    )
    .await;
    let book_id = book["id"].as_i64().unwrap();
    let copies = book["copies"].as_array().unwrap();
    let first_id = copies[0]["id"].as_i64().unwrap();
    let second_id = copies[1]["id"].as_i64().unwrap();

    // Delete copy 1, flip copy 2 to Reference Only, add copy 3
    let response = client
        .post(format!("{}/books/{}/edit/", BASE_URL, book_id))
        .json(&json!({
            "title": "Mutable Copies",
            "publication_date": "2015-06-15",
            "copies": [
                {"id": first_id, "copy_number": 1, "copy_type": "Printed", "delete": true},
                {"id": second_id, "copy_number": 2, "copy_type": "PDF",
                 "availability_status": "Reference Only"},
                {"copy_number": 3, "copy_type": "eBook"}
            ]
        }))
        .send()
        .await
        .expect("Failed to send update request");
    assert!(response.status().is_success());

    let updated: Value = response.json().await.expect("Failed to parse book");
    let updated_copies = updated["copies"].as_array().unwrap();
    assert_eq!(updated_copies.len(), 2);
    assert_eq!(updated_copies[0]["copy_number"], 2);
    assert_eq!(updated_copies[0]["availability_status"], "Reference Only");
    assert_eq!(updated_copies[1]["copy_number"], 3);

    let _ = client
        .post(format!("{}/books/{}/delete/", BASE_URL, book_id))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_logout_clears_session() {
    let client = client();
    signup_reader(&client).await;

    let response = client
        .post(format!("{}/logout/", BASE_URL))
        .send()
        .await
        .expect("Failed to send logout request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = client
        .get(format!("{}/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
