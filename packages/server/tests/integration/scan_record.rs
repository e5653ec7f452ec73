use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;
use uuid::Uuid;

use promptgate::entity::{prompt_input, prompt_output};

use crate::common::{TestApp, routes};

fn summary_json(total_entities: i32) -> serde_json::Value {
    json!({
        "total_scanners": 3,
        "failed_scanners": 0,
        "invalid_results": 0,
        "total_entities_detected": total_entities,
    })
}

/// Insert an input scan record directly, `offset_secs` in the past.
async fn insert_input(
    app: &TestApp,
    prompt: &str,
    offset_secs: i64,
    summary: serde_json::Value,
) -> Uuid {
    let id = Uuid::new_v4();
    let at = Utc::now() - Duration::seconds(offset_secs);
    let record = prompt_input::ActiveModel {
        id: Set(id),
        original_prompt: Set(prompt.into()),
        final_prompt: Set(prompt.into()),
        overall_valid: Set(true),
        max_risk_score: Set(0.1),
        scanners_run: Set(3),
        scanner_results: Set(json!([])),
        all_detected_entities: Set(json!([])),
        summary: Set(summary),
        timestamp: Set(at),
        linked_message_id: Set(None),
        created_at: Set(at),
        ..Default::default()
    };
    record.insert(&app.db).await.expect("insert prompt_input");
    id
}

async fn insert_output(app: &TestApp, prompt: &str, output: &str, offset_secs: i64) -> Uuid {
    let id = Uuid::new_v4();
    let at = Utc::now() - Duration::seconds(offset_secs);
    let record = prompt_output::ActiveModel {
        id: Set(id),
        original_prompt: Set(prompt.into()),
        original_model_output: Set(output.into()),
        final_model_output: Set(output.into()),
        overall_valid: Set(true),
        max_risk_score: Set(0.0),
        scanners_run: Set(2),
        scanner_results: Set(json!([])),
        all_detected_entities: Set(json!([])),
        summary: Set(summary_json(0)),
        timestamp: Set(at),
        created_at: Set(at),
        ..Default::default()
    };
    record.insert(&app.db).await.expect("insert prompt_output");
    id
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn pagination_reports_page_shape() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("pager1", "password123").await;

        for i in 0..25 {
            insert_input(&app, &format!("prompt {i}"), i, summary_json(0)).await;
        }

        let res = app
            .get_with_token(
                &format!("{}?page=2&limit=10", routes::PROMPT_INPUTS),
                &token,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 10);

        let pagination = &res.body["pagination"];
        assert_eq!(pagination["page"], 2);
        assert_eq!(pagination["limit"], 10);
        assert_eq!(pagination["totalCount"], 25);
        assert_eq!(pagination["totalPages"], 3);
        assert_eq!(pagination["hasNext"], true);
        assert_eq!(pagination["hasPrev"], true);
    }

    #[tokio::test]
    async fn default_listing_is_newest_first() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("pager2", "password123").await;

        insert_input(&app, "older", 100, summary_json(0)).await;
        insert_input(&app, "newest", 0, summary_json(2)).await;

        let res = app.get_with_token(routes::PROMPT_INPUTS, &token).await;

        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data[0]["prompt"], "newest");
        assert_eq!(data[0]["total_entities_detected"], 2);
        assert_eq!(data[1]["prompt"], "older");
    }

    #[tokio::test]
    async fn ascending_sort_flips_the_order() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("pager3", "password123").await;

        insert_input(&app, "older", 100, summary_json(0)).await;
        insert_input(&app, "newest", 0, summary_json(0)).await;

        let res = app
            .get_with_token(
                &format!("{}?sortOrder=asc", routes::PROMPT_INPUTS),
                &token,
            )
            .await;

        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data[0]["prompt"], "older");
    }

    #[tokio::test]
    async fn unknown_sort_column_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("pager4", "password123").await;

        let res = app
            .get_with_token(
                &format!("{}?sortBy=evil_column", routes::PROMPT_INPUTS),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn missing_summary_defaults_entity_count_to_zero() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("pager5", "password123").await;

        insert_input(&app, "sparse", 0, serde_json::Value::Null).await;

        let res = app.get_with_token(routes::PROMPT_INPUTS, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"][0]["total_entities_detected"], 0);
    }

    #[tokio::test]
    async fn output_listing_carries_the_model_output() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("pager6", "password123").await;

        insert_output(&app, "a prompt", "a model answer", 0).await;

        let res = app.get_with_token(routes::PROMPT_OUTPUTS, &token).await;

        assert_eq!(res.status, 200);
        let item = &res.body["data"][0];
        assert_eq!(item["prompt"], "a prompt");
        assert_eq!(item["model_output"], "a model answer");
    }

    #[tokio::test]
    async fn listing_requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::PROMPT_INPUTS).await;

        assert_eq!(res.status, 401);
    }
}

mod retrieval {
    use super::*;

    #[tokio::test]
    async fn full_input_record_is_returned_by_id() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("getter1", "password123").await;

        let id = insert_input(&app, "stored prompt", 0, summary_json(1)).await;

        let res = app
            .get_with_token(&routes::prompt_input(&id.to_string()), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["data"]["original_prompt"], "stored prompt");
        assert_eq!(res.body["data"]["summary"]["total_entities_detected"], 1);
    }

    #[tokio::test]
    async fn full_output_record_is_returned_by_id() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("getter2", "password123").await;

        let id = insert_output(&app, "q", "a", 0).await;

        let res = app
            .get_with_token(&routes::prompt_output(&id.to_string()), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"]["final_model_output"], "a");
    }

    #[tokio::test]
    async fn malformed_id_is_a_bad_request() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("getter3", "password123").await;

        let res = app
            .get_with_token(&routes::prompt_input("not-a-uuid"), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_ID");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("getter4", "password123").await;

        let res = app
            .get_with_token(&routes::prompt_input(&Uuid::new_v4().to_string()), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
