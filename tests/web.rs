//! Router-level tests run against the real templates and an in-memory
//! SQLite database.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use sha2::{Digest, Sha512};
use tower::ServiceExt;

use podium::models::{self, entry, survey};
use podium::{router, AppState, Config};

const PASSWORD: &str = "letmein";

fn test_config() -> Config {
    let digest = Sha512::digest(PASSWORD.as_bytes());
    Config {
        database_url: "sqlite::memory:".to_owned(),
        bind_addr: "127.0.0.1:0".to_owned(),
        admin_password_hash: digest.iter().map(|byte| format!("{byte:02x}")).collect(),
        secret_key: "a-test-secret-key-that-is-long-enough!!".to_owned(),
        upload_dir: "static/images".to_owned(),
        static_dir: "static".to_owned(),
        site_width: 800,
        template_glob: "templates/**/*.html".to_owned(),
    }
}

async fn test_app() -> (Router, AppState) {
    let config = test_config();
    // One pooled connection keeps the in-memory database alive across queries.
    let mut options = sea_orm::ConnectOptions::new(config.database_url.clone());
    options.max_connections(1).min_connections(1);
    let database = sea_orm::Database::connect(options).await.unwrap();
    models::create_tables(&database).await.unwrap();
    let state = AppState::new(config, database).unwrap();
    (router(state.clone()), state)
}

fn entry_model(title: &str, published: bool, tags: &str) -> entry::ActiveModel {
    entry::ActiveModel {
        title: Set(title.to_owned()),
        slug: Set(String::new()),
        content: Set("body text".to_owned()),
        tags: Set(tags.to_owned()),
        published: Set(published),
        is_highlight: Set(false),
        category: Set(String::new()),
        date: Set(String::new()),
        time: Set(String::new()),
        contact: Set(String::new()),
        fee: Set(String::new()),
        image: Set(String::new()),
        timestamp: Set(Utc::now()),
        ..Default::default()
    }
}

fn session_cookie(state: &AppState) -> String {
    let mut jar = cookie::CookieJar::new();
    jar.signed_mut(&state.key)
        .add(cookie::Cookie::new("session", "1"));
    jar.get("session").unwrap().encoded().to_string()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

const BOUNDARY: &str = "------------------------d74496d66958873e";

fn multipart_body(fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn create_request(state: &AppState, fields: &[(&str, &str)]) -> Request<Body> {
    Request::post("/create/")
        .header(header::COOKIE, session_cookie(state))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields)))
        .unwrap()
}

#[tokio::test]
async fn test_unmatched_route_renders_not_found() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(Request::get("/totally/unknown").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("<h3>Not found</h3>"));
}

#[tokio::test]
async fn test_create_requires_login() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(Request::get("/create/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers()[header::LOCATION],
        "/login/?next=/create/"
    );
}

#[tokio::test]
async fn test_index_hides_drafts() {
    let (app, state) = test_app().await;
    entry_model("Visible Post", true, "")
        .save(&state.database)
        .await
        .unwrap();
    entry_model("Hidden Post", false, "")
        .save(&state.database)
        .await
        .unwrap();

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Visible Post"));
    assert!(!body.contains("Hidden Post"));
}

#[tokio::test]
async fn test_events_hides_drafts() {
    let (app, state) = test_app().await;
    entry_model("Open Day", true, "").save(&state.database).await.unwrap();
    entry_model("Unannounced", false, "")
        .save(&state.database)
        .await
        .unwrap();

    let response = app
        .oneshot(Request::get("/events").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Open Day"));
    assert!(!body.contains("Unannounced"));
}

#[tokio::test]
async fn test_unpublished_detail_needs_login() {
    let (app, state) = test_app().await;
    entry_model("Hidden Post", false, "")
        .save(&state.database)
        .await
        .unwrap();

    let anonymous = app
        .clone()
        .oneshot(Request::get("/hidden-post/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::NOT_FOUND);

    let logged_in = app
        .oneshot(
            Request::get("/hidden-post/")
                .header(header::COOKIE, session_cookie(&state))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(logged_in.status(), StatusCode::OK);
    assert!(body_string(logged_in).await.contains("Hidden Post"));
}

#[tokio::test]
async fn test_drafts_listing_for_admin() {
    let (app, state) = test_app().await;
    entry_model("Work in Progress", false, "")
        .save(&state.database)
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::get("/drafts/")
                .header(header::COOKIE, session_cookie(&state))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Work in Progress"));
}

#[tokio::test]
async fn test_login_with_correct_password_sets_session() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(
            Request::post("/login/")
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(Body::from(format!(
                    "password={PASSWORD}&next=%2Fcreate%2F"
                )))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/create/");
    let cookies: Vec<_> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    assert!(cookies.iter().any(|cookie| cookie.starts_with("session=")));
}

#[tokio::test]
async fn test_login_with_wrong_password_redisplays_form() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(
            Request::post("/login/")
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(Body::from("password=wrong&next="))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Incorrect password."));
}

#[tokio::test]
async fn test_create_published_entry_redirects_to_detail() {
    let (app, state) = test_app().await;
    let response = app
        .oneshot(create_request(
            &state,
            &[
                ("title", "Launch Party"),
                ("content", "Doors open at seven."),
                ("tags", "Future"),
                ("published", "y"),
            ],
        ))
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/launch-party/");

    let stored = entry::Entity::find()
        .one(&state.database)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.slug, "launch-party");
    assert!(stored.published);
    assert_eq!(stored.tags, "Future");
}

#[tokio::test]
async fn test_create_draft_redirects_back_to_edit() {
    let (app, state) = test_app().await;
    let response = app
        .oneshot(create_request(
            &state,
            &[("title", "Quiet Work"), ("content", "Not ready yet.")],
        ))
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/quiet-work/edit/");

    let stored = entry::Entity::find()
        .one(&state.database)
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.published);
}

#[tokio::test]
async fn test_create_with_duplicate_title_redisplays_form() {
    let (app, state) = test_app().await;
    entry_model("Launch Party", true, "")
        .save(&state.database)
        .await
        .unwrap();

    let response = app
        .oneshot(create_request(
            &state,
            &[
                ("title", "Launch Party"),
                ("content", "A second take."),
                ("published", "y"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Error: this title is already in use."));
    assert!(body.contains("Launch Party"));

    let stored = entry::Entity::find().all(&state.database).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_create_without_content_is_rejected() {
    let (app, state) = test_app().await;
    let response = app
        .oneshot(create_request(&state, &[("title", "All Title No Body")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response)
        .await
        .contains("Title and Content are required."));
    assert!(entry::Entity::find()
        .one(&state.database)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_survey_stores_stripped_tags_and_recommends() {
    let (app, state) = test_app().await;
    entry_model("Keynote", true, "highlight")
        .save(&state.database)
        .await
        .unwrap();
    entry_model("Hyperloop", true, "Future, transport")
        .save(&state.database)
        .await
        .unwrap();
    entry_model("Cooking 101", true, "food")
        .save(&state.database)
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::post("/survey/")
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(Body::from(
                    "name=Alice&department=CS&year=2\
                     &tags_input=1_Future&tags_input=2_transport",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Alice"));
    assert!(body.contains("Keynote"));
    assert!(body.contains("Hyperloop"));
    assert!(!body.contains("Cooking 101"));

    let stored = survey::Entity::find()
        .one(&state.database)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Alice");
    assert_eq!(stored.tags, "Future, transport");
}

#[tokio::test]
async fn test_survey_without_name_is_rejected() {
    let (app, state) = test_app().await;
    let response = app
        .oneshot(
            Request::post("/survey/")
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(Body::from("department=CS&tags_input=1_Future"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Name required."));
    assert!(survey::Entity::find()
        .one(&state.database)
        .await
        .unwrap()
        .is_none());
}
