//! Integration tests for the calendar API endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use std::fs;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::util::ServiceExt;

    use crate::test_utils::{TestApp, body_to_json, test_app};

    fn get(app: &TestApp, uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", app.access_token()))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn it_reports_health_without_a_token() {
        let app = test_app();

        let response = app
            .router()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["status"], true);
        assert_eq!(body["message"], "API is running");
        assert!(body["version"].is_string());
    }

    #[tokio::test]
    async fn it_requires_a_bearer_token() {
        let app = test_app();

        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/calendar/configured-users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["status"], false);
        assert_eq!(body["error"], "UNAUTHORIZED");

        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/calendar/configured-users")
                    .header(header::AUTHORIZATION, "Bearer ")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["message"], "Access token is required");
    }

    #[tokio::test]
    async fn it_rejects_invalid_tokens() {
        let app = test_app();

        for value in ["Bearer not-a-jwt", "Basic YWRtaW46c2VjcmV0"] {
            let response = app
                .router()
                .oneshot(
                    Request::builder()
                        .uri("/api/v1/calendar/employees")
                        .header(header::AUTHORIZATION, value)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", value);
        }
    }

    #[tokio::test]
    async fn it_lists_configured_users_in_file_order() {
        let app = test_app();

        let response = app
            .router()
            .oneshot(get(&app, "/api/v1/calendar/configured-users"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Configured users");
        let emails: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["email"].as_str().unwrap())
            .collect();
        assert_eq!(
            emails,
            vec!["alice@example.com", "fail@example.com", "carol@example.com"]
        );
        assert_eq!(body["data"][0]["name"], "Alice Smith");
        assert!(body["data"][2]["name"].is_null());
    }

    #[tokio::test]
    async fn it_serves_employees_from_the_same_list() {
        let app = test_app();

        let users = body_to_json(
            app.router()
                .oneshot(get(&app, "/api/v1/calendar/configured-users"))
                .await
                .unwrap()
                .into_body(),
        )
        .await;
        let employees = body_to_json(
            app.router()
                .oneshot(get(&app, "/api/v1/calendar/employees"))
                .await
                .unwrap()
                .into_body(),
        )
        .await;

        assert_eq!(employees["message"], "Employees list");
        assert_eq!(users["data"], employees["data"]);
    }

    #[tokio::test]
    async fn it_returns_503_without_users_file() {
        let app = test_app();
        fs::remove_file(app.dir.path().join("users.xml")).unwrap();

        let response = app
            .router()
            .oneshot(get(&app, "/api/v1/calendar/configured-users"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn it_validates_event_params() {
        let app = test_app();

        let cases = [
            (
                "/api/v1/calendar/events?email=alice@example.com",
                "Query params email and date (YYYY-MM-DD) are required.",
            ),
            (
                "/api/v1/calendar/events?email=alice@example.com&date=2024-2-1",
                "Invalid date format. Use YYYY-MM-DD.",
            ),
            (
                "/api/v1/calendar/events?email=alice@example.com&date=2024-02-30",
                "Invalid date format. Use YYYY-MM-DD.",
            ),
            (
                "/api/v1/calendar/events-by-date",
                "Query param date (YYYY-MM-DD) is required.",
            ),
            (
                "/api/v1/calendar/events-month?email=alice@example.com&year=2024",
                "Query params email, year and month are required.",
            ),
        ];

        for (uri, message) in cases {
            let response = app.router().oneshot(get(&app, uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body = body_to_json(response.into_body()).await;
            assert_eq!(body["status"], "error");
            assert_eq!(body["message"], message, "{}", uri);
        }
    }

    #[tokio::test]
    async fn it_validates_year_and_month() {
        let app = test_app();

        for uri in [
            "/api/v1/calendar/events-month?email=alice@example.com&year=2024&month=13",
            "/api/v1/calendar/events-month?email=alice@example.com&year=2024&month=0",
            "/api/v1/calendar/events-month?email=alice@example.com&year=next&month=2",
        ] {
            let response = app.router().oneshot(get(&app, uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[tokio::test]
    async fn it_rejects_years_outside_the_calendar_range() {
        let app = test_app();

        for uri in [
            "/api/v1/calendar/events-month?email=alice@example.com&year=999999&month=2",
            "/api/v1/calendar/events-month?email=alice@example.com&year=-999999&month=2",
        ] {
            let response = app.router().oneshot(get(&app, uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body = body_to_json(response.into_body()).await;
            assert_eq!(body["message"], "Year is out of range.");
        }
    }

    #[tokio::test]
    async fn it_returns_events_for_a_date() {
        let app = test_app();

        let response = app
            .router()
            .oneshot(get(
                &app,
                "/api/v1/calendar/events?email=alice%40example.com&date=2024-02-01",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["date"], "2024-02-01");
        assert_eq!(body["data"][0]["summary"], "Standup");
        assert_eq!(body["data"][0]["start"], "2024-02-01T09:00:00+00:00");
        assert_eq!(body["data"][0]["allDay"], false);
    }

    #[tokio::test]
    async fn it_surfaces_provider_errors_as_500() {
        let app = test_app();

        let response = app
            .router()
            .oneshot(get(
                &app,
                "/api/v1/calendar/events?email=fail@example.com&date=2024-02-01",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn it_isolates_failures_in_the_batch() {
        let app = test_app();

        let response = app
            .router()
            .oneshot(get(&app, "/api/v1/calendar/events-by-date?date=2024-02-01"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["date"], "2024-02-01");

        let entries = body["data"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["email"], "alice@example.com");
        assert_eq!(entries[0]["events"].as_array().unwrap().len(), 1);
        assert!(entries[0].get("error").is_none());

        assert_eq!(entries[1]["email"], "fail@example.com");
        assert_eq!(entries[1]["events"], serde_json::json!([]));
        assert!(!entries[1]["error"].as_str().unwrap().is_empty());

        assert_eq!(entries[2]["email"], "carol@example.com");
        assert_eq!(entries[2]["events"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn it_returns_events_for_a_month() {
        let app = test_app();

        let response = app
            .router()
            .oneshot(get(
                &app,
                "/api/v1/calendar/events-month?email=alice@example.com&year=2024&month=2",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["message"], "Events for month");
        assert_eq!(body["year"], 2024);
        assert_eq!(body["month"], 2);
        // The fake source dates its event on the first day of the window
        assert_eq!(body["data"][0]["start"], "2024-02-01T09:00:00+00:00");
    }

    #[tokio::test]
    async fn it_answers_unknown_routes_with_404() {
        let app = test_app();

        let response = app
            .router()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
