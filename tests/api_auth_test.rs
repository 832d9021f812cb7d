//! Integration tests for login and token validation

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::util::ServiceExt;

    use crate::test_utils::{body_to_json, test_app};

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn it_logs_in_the_configured_admin() {
        let app = test_app();

        let response = app
            .router()
            .oneshot(post_json(
                "/api/v1/auth/login",
                json!({
                    "email": " Admin@Localhost ",
                    "password": "anything",
                    "type": "Admin",
                    "device_category": "Web",
                    "device_type": "WEB"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["status"], true);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["data"]["id"], 1);
        assert_eq!(body["data"]["name"], "Admin");
        assert_eq!(body["data"]["email"], "admin@localhost");

        // The issued access token opens the calendar routes
        let access_token = body["access_token"].as_str().unwrap();
        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/calendar/configured-users")
                    .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn it_rejects_unknown_admins() {
        let app = test_app();

        let response = app
            .router()
            .oneshot(post_json(
                "/api/v1/auth/login",
                json!({"email": "someone@example.com", "password": "x"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["status"], false);
        assert_eq!(body["message"], "Invalid email or password.");
    }

    #[tokio::test]
    async fn it_requires_an_email_to_log_in() {
        let app = test_app();

        let response = app
            .router()
            .oneshot(post_json("/api/v1/auth/login", json!({"password": "x"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn it_reissues_tokens_from_a_refresh_token() {
        let app = test_app();
        let login = body_to_json(
            app.router()
                .oneshot(post_json(
                    "/api/v1/auth/login",
                    json!({"email": "admin@localhost"}),
                ))
                .await
                .unwrap()
                .into_body(),
        )
        .await;

        let response = app
            .router()
            .oneshot(post_json(
                "/api/v1/auth/validate-tokens",
                json!({
                    "access_token": "expired-or-garbage",
                    "refresh_token": login["refresh_token"],
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["status"], true);
        assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
        assert!(body["refresh_token"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn it_fails_validation_without_usable_tokens() {
        let app = test_app();

        let response = app
            .router()
            .oneshot(post_json(
                "/api/v1/auth/validate-tokens",
                json!({"access_token": "a", "refresh_token": "b"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["status"], false);
        assert_eq!(body["message"], "Session expired. Please log in again.");

        let response = app
            .router()
            .oneshot(post_json("/api/v1/auth/validate-tokens", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["message"], "Tokens required.");
    }

    #[tokio::test]
    async fn it_does_not_accept_a_refresh_token_as_bearer() {
        let app = test_app();
        let login = body_to_json(
            app.router()
                .oneshot(post_json(
                    "/api/v1/auth/login",
                    json!({"email": "admin@localhost"}),
                ))
                .await
                .unwrap()
                .into_body(),
        )
        .await;

        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/calendar/configured-users")
                    .header(
                        header::AUTHORIZATION,
                        format!("Bearer {}", login["refresh_token"].as_str().unwrap()),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
