use serde_json::json;

use crate::common::{TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn register_creates_a_user() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "alice", "password": "password123"}),
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["username"], "alice");
        assert!(res.body["id"].is_number());
    }

    #[tokio::test]
    async fn register_rejects_short_passwords() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "bob", "password": "short"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn register_rejects_bad_username_characters() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "no spaces!", "password": "password123"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let app = TestApp::spawn().await;
        let body = json!({"username": "carol", "password": "password123"});

        let first = app.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(first.status, 201);

        let second = app.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(second.status, 409);
        assert_eq!(second.body["code"], "USERNAME_TAKEN");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn login_returns_token_and_session_cookie() {
        let app = TestApp::spawn().await;
        let body = json!({"username": "dave", "password": "password123"});
        app.post_without_token(routes::REGISTER, &body).await;

        let res = app
            .client
            .post(app.url(routes::LOGIN))
            .json(&body)
            .send()
            .await
            .expect("login request");

        let cookie = res
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(cookie.starts_with("token="), "missing token cookie: {cookie}");
        assert!(cookie.contains("HttpOnly"));

        let parsed = crate::common::TestResponse::from_response(res).await;
        assert_eq!(parsed.status, 200);
        assert_eq!(parsed.body["username"], "dave");
        assert!(parsed.body["token"].is_string());
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = TestApp::spawn().await;
        app.post_without_token(
            routes::REGISTER,
            &json!({"username": "erin", "password": "password123"}),
        )
        .await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "erin", "password": "wrong-password"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_user_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "nobody", "password": "password123"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }
}

mod sessions {
    use super::*;

    #[tokio::test]
    async fn me_requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn me_rejects_garbage_tokens() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not-a-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn bearer_token_authenticates() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("frank", "password123").await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["username"], "frank");
    }

    #[tokio::test]
    async fn session_cookie_authenticates_without_bearer_header() {
        let app = TestApp::spawn().await;
        let body = json!({"username": "grace", "password": "password123"});
        app.post_without_token(routes::REGISTER, &body).await;

        // A cookie-jar client mimics the browser flow: login sets the cookie,
        // subsequent requests carry it automatically.
        let browser = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("cookie client");

        let login = browser
            .post(app.url(routes::LOGIN))
            .json(&body)
            .send()
            .await
            .expect("login request");
        assert_eq!(login.status().as_u16(), 200);

        let me = browser
            .get(app.url(routes::ME))
            .send()
            .await
            .expect("me request");
        assert_eq!(me.status().as_u16(), 200);

        let profile: serde_json::Value = me.json().await.expect("me body");
        assert_eq!(profile["username"], "grace");
    }
}
