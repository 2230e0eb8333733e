mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{assert_evidence_path, token_for};

async fn post(url: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
    let res = reqwest::Client::new()
        .post(url)
        .bearer_auth(token)
        .json(&body)
        .send()
        .await?;
    let status = res.status();
    Ok((status, res.json().await?))
}

#[tokio::test]
async fn member_signs_evidence_and_outsider_is_forbidden() -> Result<()> {
    let server = common::ensure_server().await?;
    let base = &server.base_url;
    let u = token_for("scenario-user-u");
    let v = token_for("scenario-user-v");

    let (status, body) = post(&format!("{}/api/orgs", base), &u, json!({ "name": "Acme Bank" })).await?;
    assert_eq!(status, StatusCode::OK);
    let org = body["org"]["id"].as_str().unwrap().to_string();

    let (status, body) = post(
        &format!("{}/api/systems", base),
        &u,
        json!({ "organizationId": org, "name": "Loan approval model" }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["system"]["org_id"], org.as_str());
    let system = body["system"]["id"].as_str().unwrap().to_string();

    let (status, body) = post(
        &format!("{}/api/assessments", base),
        &u,
        json!({ "organizationId": org, "systemId": system }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assessment"]["status"], "draft");
    let assessment = body["assessment"]["id"].as_str().unwrap().to_string();

    let sign = json!({
        "assessmentId": assessment,
        "questionId": 1,
        "filename": "report.pdf",
        "mime": "application/pdf"
    });

    let (status, body) = post(&format!("{}/api/evidence/sign", base), &u, sign.clone()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_evidence_path(
        body["storagePath"].as_str().unwrap(),
        &org,
        &assessment,
        1,
        "report.pdf",
    );
    assert!(!body["token"].as_str().unwrap().is_empty());

    let (status, body) = post(&format!("{}/api/evidence/sign", base), &v, sign).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    Ok(())
}
