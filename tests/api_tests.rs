//! API integration tests
//!
//! These run against a live server with a migrated database and an admin
//! account whose password is "admin". Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
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
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/tables/genero/rows", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unknown_table_is_terminal() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/tables/inventario/rows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_composite_key_table_is_terminal() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/tables/livro_autor/rows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_genero_lists_in_ascending_order() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    for genero in ["Ficção", "Terror"] {
        let response = client
            .post(format!("{}/tables/genero/rows", BASE_URL))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "ge_genero": genero }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 201);
    }

    let response = client
        .get(format!("{}/tables/genero/rows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let names: Vec<&str> = body["rows"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["ge_genero"].as_str())
        .filter(|g| *g == "Ficção" || *g == "Terror")
        .collect();
    assert_eq!(names, ["Ficção", "Terror"]);

    // Cleanup
    for genero in ["Ficção", "Terror"] {
        let response = client
            .delete(format!("{}/tables/genero/rows/{}", BASE_URL, genero))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 204);
    }
}

#[tokio::test]
#[ignore]
async fn test_repeated_delete_is_a_noop() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/tables/genero/rows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "ge_genero": "Efémero" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    for _ in 0..2 {
        let response = client
            .delete(format!("{}/tables/genero/rows/Efémero", BASE_URL))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 204);
    }
}

#[tokio::test]
#[ignore]
async fn test_zero_match_search_is_empty_not_an_error() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!(
            "{}/tables/genero/rows?search=nada-disto-existe",
            BASE_URL
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["rows"].as_array().unwrap().len(), 0);
}

#[tokio::test]
#[ignore]
async fn test_form_round_trip_resolves_foreign_key_display() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let auth = |req: reqwest::RequestBuilder| req.header("Authorization", format!("Bearer {}", token));

    // Referenced row first, then an author pointing at it
    let response = auth(client.post(format!("{}/tables/pais/rows", BASE_URL)))
        .json(&json!({ "pa_pais": "Portugal" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = auth(client.post(format!("{}/tables/autor/rows", BASE_URL)))
        .json(&json!({ "au_nome": "José Saramago", "au_pais": "Portugal" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Find the created author on the list
    let body: Value = auth(client.get(format!("{}/tables/autor/rows?search=saramago", BASE_URL)))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let au_cod = body["rows"][0]["au_cod"].as_i64().expect("No author code");

    // Edit form shows stored values and display-equivalent FK text
    let form: Value = auth(client.get(format!("{}/tables/autor/form/{}", BASE_URL, au_cod)))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(form["values"]["au_nome"], "José Saramago");
    assert_eq!(form["values"]["au_pais"], "Portugal");
    assert_eq!(form["display"]["au_pais"], "Portugal");

    // Cleanup
    let response = auth(client.delete(format!("{}/tables/autor/rows/{}", BASE_URL, au_cod)))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
    let _ = auth(client.delete(format!("{}/tables/pais/rows/Portugal", BASE_URL)))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_book_with_zero_authors_is_rejected_without_writes() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "isbn": "978-0-00-000000-0",
            "titulo": "Teste",
            "autores": [],
            "num_exemplares": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    // No book row was written
    let body: Value = client
        .get(format!("{}/tables/livro/rows?search=978-0-00-000000-0", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["rows"].as_array().unwrap().len(), 0);
}

#[tokio::test]
#[ignore]
async fn test_register_book_creates_links_and_copies() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let auth = |req: reqwest::RequestBuilder| req.header("Authorization", format!("Bearer {}", token));

    let response = auth(client.post(format!("{}/tables/autor/rows", BASE_URL)))
        .json(&json!({ "au_nome": "Sophia de Mello Breyner" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = auth(client.get(format!("{}/tables/autor/rows?search=breyner", BASE_URL)))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let au_cod = body["rows"][0]["au_cod"].as_i64().expect("No author code");

    let response = auth(client.post(format!("{}/books", BASE_URL)))
        .json(&json!({
            "isbn": "978-972-1-00000-1",
            "titulo": "O Cavaleiro da Dinamarca",
            "autores": [au_cod],
            "num_exemplares": 2
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let li_cod = body["li_cod"].as_i64().expect("No book code");

    let book: Value = auth(client.get(format!("{}/books/{}", BASE_URL, li_cod)))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(book["li_titulo"], "O Cavaleiro da Dinamarca");
    assert_eq!(book["autores"][0]["au_cod"], au_cod);
    assert_eq!(book["num_exemplares"], 2);

    // Cleanup (copies and links cascade)
    let response = auth(client.delete(format!("{}/tables/livro/rows/{}", BASE_URL, li_cod)))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
    let _ = auth(client.delete(format!("{}/tables/autor/rows/{}", BASE_URL, au_cod)))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_requisition_moves_through_queues() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let auth = |req: reqwest::RequestBuilder| req.header("Authorization", format!("Bearer {}", token));

    // A patron, a book with one copy, and a requisition for that copy
    let response = auth(client.post(format!("{}/tables/utente/rows", BASE_URL)))
        .json(&json!({ "ut_nome": "Ana Teste" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = auth(client.get(format!("{}/tables/utente/rows?search=ana teste", BASE_URL)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ut_cod = body["rows"][0]["ut_cod"].as_i64().expect("No patron code");

    let response = auth(client.post(format!("{}/tables/autor/rows", BASE_URL)))
        .json(&json!({ "au_nome": "Autor Requisição" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = auth(client.get(format!("{}/tables/autor/rows?search=requisição", BASE_URL)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let au_cod = body["rows"][0]["au_cod"].as_i64().unwrap();

    let body: Value = auth(client.post(format!("{}/books", BASE_URL)))
        .json(&json!({
            "isbn": "978-972-1-00000-2",
            "titulo": "Fila de Espera",
            "autores": [au_cod],
            "num_exemplares": 1
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let li_cod = body["li_cod"].as_i64().unwrap();

    let body: Value = auth(client.get(format!("{}/tables/livro_exemplar/lookup?q={}", BASE_URL, li_cod)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    // The lookup query is numeric, so it matched the copy code exactly only if
    // the codes coincide; fall back to the title search otherwise.
    let lex_cod = if body["rows"].as_array().is_some_and(|r| !r.is_empty()) {
        body["rows"][0]["key"].as_i64().unwrap()
    } else {
        let body: Value = auth(client.get(format!(
            "{}/tables/livro_exemplar/lookup?q=fila de espera",
            BASE_URL
        )))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
        body["rows"][0]["key"].as_i64().expect("No available copy")
    };

    let response = auth(client.post(format!("{}/tables/requisicao/rows", BASE_URL)))
        .json(&json!({
            "re_ut_cod": ut_cod,
            "re_lex_cod": lex_cod,
            "re_data_requisicao": "2026-08-06",
            "re_emprestado": false
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let in_queue = |dash: &Value, queue: &str, title: &str| {
        dash[queue]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["li_titulo"] == title)
    };

    // Only in the pickup queue before pickup
    let dash: Value = auth(client.get(format!("{}/requisitions/dashboard?q=fila de espera", BASE_URL)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(in_queue(&dash, "para_levantar", "Fila de Espera"));
    assert!(!in_queue(&dash, "para_devolver", "Fila de Espera"));
    let re_cod = dash["para_levantar"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["li_titulo"] == "Fila de Espera")
        .unwrap()["re_cod"]
        .as_i64()
        .unwrap();

    // Pickup moves it out of the pickup queue
    let response = auth(client.post(format!("{}/requisitions/{}/pickup", BASE_URL, re_cod)))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let dash: Value = auth(client.get(format!("{}/requisitions/dashboard?q=fila de espera", BASE_URL)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!in_queue(&dash, "para_levantar", "Fila de Espera"));

    // Return removes it from both queues
    let response = auth(client.post(format!("{}/requisitions/{}/return", BASE_URL, re_cod)))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let dash: Value = auth(client.get(format!("{}/requisitions/dashboard?q=fila de espera", BASE_URL)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!in_queue(&dash, "para_levantar", "Fila de Espera"));
    assert!(!in_queue(&dash, "para_devolver", "Fila de Espera"));

    // Cleanup
    let _ = auth(client.delete(format!("{}/tables/requisicao/rows/{}", BASE_URL, re_cod)))
        .send()
        .await;
    let _ = auth(client.delete(format!("{}/tables/livro/rows/{}", BASE_URL, li_cod)))
        .send()
        .await;
    let _ = auth(client.delete(format!("{}/tables/autor/rows/{}", BASE_URL, au_cod)))
        .send()
        .await;
    let _ = auth(client.delete(format!("{}/tables/utente/rows/{}", BASE_URL, ut_cod)))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_get_stats() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["active"].is_number());
    assert!(body["overdue"].is_number());
    assert!(body["recent"].is_array());
}
