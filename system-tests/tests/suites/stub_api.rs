// system-tests/tests/suites/stub_api.rs
// ============================================================================
// Module: Stub API Tests
// Description: Direct HTTP checks of the in-process company stub.
// Purpose: Pin the stub's rules so catalog suites test the runner, not the stub.
// Dependencies: reqwest, serde_json, system-tests
// ============================================================================

use reqwest::StatusCode;
use serde_json::Value;
use serde_json::json;
use system_tests::stub::spawn_company_stub;

fn seed(cnpj: &str) -> Value {
    json!({
        "name": "Empresa Teste",
        "cnpj": cnpj,
        "state": "São Paulo",
        "city": "São Paulo",
        "address": "Rua Deodoro da Fonseca",
        "sector": "Facção",
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn stub_enforces_creation_rules() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_company_stub()?;
    let http = reqwest::Client::new();
    let url = format!("{}/company", stub.base_url());

    let created = http.post(&url).json(&seed("12.345.678/0001-95")).send().await?;
    if created.status() != StatusCode::CREATED {
        return Err(format!("expected 201, got {}", created.status()).into());
    }
    let body: Value = created.json().await?;
    if body["id"].as_u64() != Some(1) || body["name"] != "Empresa Teste" {
        return Err(format!("unexpected created body: {body}").into());
    }

    let cases = [
        (seed("12.345.678/0001-95"), StatusCode::CONFLICT),
        (seed("CNPJ-Inválido"), StatusCode::BAD_REQUEST),
        (seed("12.345.678/0001-00"), StatusCode::BAD_REQUEST),
        (json!({ "cnpj": "11.222.333/0001-81" }), StatusCode::BAD_REQUEST),
        (json!({ "name": "Empresa Teste" }), StatusCode::BAD_REQUEST),
        (json!({}), StatusCode::BAD_REQUEST),
        (
            json!({ "name": "Empresa", "cnpj": "11.222.333/0001-81", "extraField": "x" }),
            StatusCode::BAD_REQUEST,
        ),
        (json!({ "name": 7, "cnpj": "11.222.333/0001-81" }), StatusCode::BAD_REQUEST),
    ];
    for (payload, expected) in cases {
        let response = http.post(&url).json(&payload).send().await?;
        if response.status() != expected {
            return Err(format!("{payload}: expected {expected}, got {}", response.status()).into());
        }
    }
    if stub.company_count() != 1 {
        let stored = Value::Array(stub.companies());
        return Err(format!("rejected payloads were stored: {stored}").into());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn stub_serves_reads_updates_and_deletes() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_company_stub()?;
    let http = reqwest::Client::new();
    let first = stub.seed(&seed("12.345.678/0001-95")).ok_or("seed failed")?;
    let _ = stub.seed(&json!({ "name": "Outra", "cnpj": "11.222.333/0001-81" }));
    let base = stub.base_url();

    let filtered: Value = http
        .get(format!("{base}/company?name=Empresa%20Teste"))
        .send()
        .await?
        .json()
        .await?;
    if filtered.as_array().map(Vec::len) != Some(1) {
        return Err(format!("filter should match one record: {filtered}").into());
    }

    let status = http.get(format!("{base}/company/{first}")).send().await?.status();
    if status != StatusCode::OK {
        return Err(format!("fetch expected 200, got {status}").into());
    }
    let status = http.get(format!("{base}/company/abc")).send().await?.status();
    if status != StatusCode::NOT_FOUND {
        return Err(format!("non-numeric id expected 404, got {status}").into());
    }

    let status = http
        .put(format!("{base}/company/{first}"))
        .json(&json!({ "name": "Empresa Atualizada", "cnpj": "12.345.678/0001-95" }))
        .send()
        .await?
        .status();
    if status != StatusCode::OK {
        return Err(format!("update keeping own cnpj expected 200, got {status}").into());
    }
    let status = http
        .put(format!("{base}/company/{first}"))
        .json(&json!({ "cnpj": "11.222.333/0001-81" }))
        .send()
        .await?
        .status();
    if status != StatusCode::CONFLICT {
        return Err(format!("update onto taken cnpj expected 409, got {status}").into());
    }

    let status = http.delete(format!("{base}/company/{first}")).send().await?.status();
    if status != StatusCode::OK {
        return Err(format!("delete expected 200, got {status}").into());
    }
    let status = http.delete(format!("{base}/company/{first}")).send().await?.status();
    if status != StatusCode::NOT_FOUND {
        return Err(format!("second delete expected 404, got {status}").into());
    }
    if stub.company_count() != 1 {
        return Err("only the second record should remain".into());
    }
    Ok(())
}
