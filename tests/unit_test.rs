// Unit tests for user-manager against a local mock of the remote services

#[cfg(test)]
mod http_api_tests {
    use serde_json::json;
    use user_manager::api::{ApiEndpoints, HttpUserApi, UserApi};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> HttpUserApi {
        HttpUserApi::new(ApiEndpoints {
            users_base_url: server.uri(),
            email_validation_url: format!("{}/email/", server.uri()),
            phone_validation_url: format!("{}/phone/", server.uri()),
            email_api_key: Some("ekey".into()),
            phone_api_key: Some("pkey".into()),
        })
    }

    #[tokio::test]
    async fn test_fetch_users_sends_paging_and_maps_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(query_param("limit", "100"))
            .and(query_param("skip", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [
                    {
                        "id": 1,
                        "firstName": "Emily",
                        "lastName": "Johnson",
                        "email": "emily.johnson@x.dummyjson.com",
                        "phone": "+81 965-431-3024",
                        "image": "https://dummyjson.com/icon/emilys/128",
                        "age": 28
                    },
                    { "id": 2, "firstName": "Michael", "lastName": "Williams", "email": "m@x.io" }
                ],
                "total": 208,
                "skip": 0,
                "limit": 100
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = api_for(&server).fetch_users(100, 0).await.expect("fetch");
        assert_eq!(page.total, 208);
        assert_eq!(page.users.len(), 2);
        let emily = &page.users[0];
        assert_eq!(emily.id, Some(1));
        assert_eq!(emily.full_name(), "Emily Johnson");
        assert!(!emily.is_new);
        assert_eq!(page.users[1].phone, "");
        assert_eq!(page.users[1].image, None);
    }

    #[tokio::test]
    async fn test_fetch_users_non_success_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = api_for(&server).fetch_users(10, 0).await.unwrap_err();
        assert!(err.to_string().contains("503"), "got: {err}");
    }

    #[tokio::test]
    async fn test_fetch_users_bad_payload_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        assert!(api_for(&server).fetch_users(10, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_validate_email_needs_format_and_mx() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/email/"))
            .and(query_param("api_key", "ekey"))
            .and(query_param("email", "good@x.io"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "email": "good@x.io",
                "is_valid_format": { "value": true, "text": "TRUE" },
                "is_mx_found": { "value": true, "text": "TRUE" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/email/"))
            .and(query_param("email", "nomx@x.io"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "is_valid_format": { "value": true },
                "is_mx_found": { "value": false }
            })))
            .mount(&server)
            .await;

        let api = api_for(&server);
        assert!(api.validate_email("good@x.io").await.unwrap().is_valid());
        let nomx = api.validate_email("nomx@x.io").await.unwrap();
        assert!(nomx.valid_format);
        assert!(!nomx.is_valid());
    }

    #[tokio::test]
    async fn test_validate_email_missing_flags_read_as_false() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/email/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "quota" })))
            .mount(&server)
            .await;

        let check = api_for(&server).validate_email("a@b.co").await.unwrap();
        assert!(!check.is_valid());
    }

    #[tokio::test]
    async fn test_validate_phone_reads_valid_flag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/phone/"))
            .and(query_param("api_key", "pkey"))
            .and(query_param("phone", "14152007986"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "phone": "14152007986",
                "valid": true,
                "country": { "code": "US" }
            })))
            .mount(&server)
            .await;

        let check = api_for(&server).validate_phone("14152007986").await.unwrap();
        assert!(check.valid);
    }

    #[tokio::test]
    async fn test_validation_rejected_by_service_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/phone/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        assert!(api_for(&server).validate_phone("1").await.is_err());
    }
}

#[cfg(test)]
mod search_tests {
    use user_manager::model::User;
    use user_manager::search::{PAGE_SIZE, visible_page};

    fn user(first: &str, email: &str, is_new: bool) -> User {
        User {
            id: None,
            first_name: first.into(),
            last_name: "Doe".into(),
            email: email.into(),
            phone: String::new(),
            image: None,
            is_new,
        }
    }

    #[test]
    fn test_local_users_lead_every_view() {
        let mut users: Vec<User> = (0..15).map(|i| user(&format!("R{i}"), &format!("r{i}@x.io"), false)).collect();
        users.push(user("Local", "local@x.io", true));
        let view = visible_page(&users, "", 1);
        assert_eq!(view.rows.len(), PAGE_SIZE);
        assert_eq!(view.rows[0].email, "local@x.io");
        assert_eq!(view.total_pages, 2);
    }

    #[test]
    fn test_query_matches_email_case_insensitively() {
        let users = vec![user("Ann", "ANN@corp.io", false), user("Bob", "bob@home.io", false)];
        let view = visible_page(&users, "corp", 1);
        assert_eq!(view.matched, 1);
        assert_eq!(view.rows[0].first_name, "Ann");
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let users = vec![user("Ann", "a@x.io", false)];
        let view = visible_page(&users, "", 2);
        assert!(view.rows.is_empty());
        assert_eq!(view.total_pages, 1);
    }
}
