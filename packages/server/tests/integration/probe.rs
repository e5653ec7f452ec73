use crate::common::{TestApp, routes};

#[tokio::test]
async fn model_listing_needs_no_authentication() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::MODELS).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["models"][0]["name"], "models/gemini-test");
}
