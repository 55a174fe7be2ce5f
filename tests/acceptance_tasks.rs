use axum::body::to_bytes;
use axum::Router;
use serde_json::{json, Value};
use taskboard::application::{task_service::TaskServiceImpl, theme::ThemePreference};
use taskboard::domain::store::KeyValueStore;
use taskboard::http::{routes::tasks, routing};
use taskboard::infrastructure::sqlite_store::SqliteStore;

async fn app() -> Router {
    // use in-memory sqlite for tests
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
    store.init().await.unwrap();
    let service = TaskServiceImpl::load(store.clone()).await.unwrap();
    routing::app(tasks::router(tasks::AppState::new(service, ThemePreference::new(store))))
}

#[tokio::test]
async fn acceptance_add_view_edit_toggle_delete() {
    let app = app().await;

    // add
    let res = request(&app, "POST", "/tasks", Some(json!({ "title": "Write report", "description": "Quarterly", "dueDate": "2024-05-01", "priority": "high" }))).await;
    assert_eq!(res.status(), 201);
    let created = body(res).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["priorityLabel"], "High");
    assert_eq!(created["dueLabel"], "01 May 2024");

    let res = request(&app, "POST", "/tasks", Some(json!({ "title": "   " }))).await;
    assert_eq!(res.status(), 400);
    assert_eq!(body(res).await["message"], "Please enter a task title.");

    // view
    let res = request(&app, "GET", "/tasks?page=pending&q=REPORT&sort=priority", None).await;
    assert_eq!(res.status(), 200);
    let view = body(res).await;
    assert_eq!(view["items"].as_array().unwrap().len(), 1);
    assert_eq!(view["stats"]["label"], "Pending page • 1 total • 1 pending • 0 done");

    // edit
    let res = request(&app, "PUT", &format!("/tasks/{}", id), Some(json!({ "title": "Final report", "priority": "nonsense" }))).await;
    assert_eq!(res.status(), 200);
    let edited = body(res).await;
    assert_eq!(edited["title"], "Final report");
    assert_eq!(edited["priority"], "high");
    assert_eq!(edited["description"], "Quarterly");

    let res = request(&app, "PUT", &format!("/tasks/{}", id), Some(json!({ "title": "" }))).await;
    assert_eq!(res.status(), 400);

    // toggle
    let res = request(&app, "POST", &format!("/tasks/{}/toggle", id), None).await;
    assert_eq!(body(res).await["completed"], true);
    let res = request(&app, "GET", "/tasks?page=completed", None).await;
    assert_eq!(body(res).await["items"][0]["id"], id.as_str());

    // delete
    let res = request(&app, "DELETE", &format!("/tasks/{}", id), None).await;
    assert_eq!(res.status(), 409);
    let res = request(&app, "DELETE", &format!("/tasks/{}?confirm=true", id), None).await;
    assert_eq!(res.status(), 204);

    // get 404
    let res = request(&app, "GET", &format!("/tasks/{}", id), None).await;
    assert_eq!(res.status(), 404);
    let res = request(&app, "POST", &format!("/tasks/{}/toggle", id), None).await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn acceptance_status_filter_and_clear_all() {
    let app = app().await;
    for title in ["A", "B", "C"] {
        request(&app, "POST", "/tasks", Some(json!({ "title": title }))).await;
    }
    let res = request(&app, "GET", "/tasks?sort=createdAsc", None).await;
    let items = body(res).await["items"].clone();
    let first = items[0]["id"].as_str().unwrap().to_string();
    request(&app, "POST", &format!("/tasks/{}/toggle", first), None).await;

    let res = request(&app, "GET", "/tasks?status=pending&sort=createdAsc", None).await;
    let view = body(res).await;
    let titles: Vec<&str> = view["items"].as_array().unwrap().iter().map(|t| t["title"].as_str().unwrap()).collect();
    assert_eq!(titles, ["B", "C"]);
    assert_eq!(view["stats"]["label"], "3 total • 2 pending • 1 done");

    let res = request(&app, "GET", "/tasks?sort=sideways", None).await;
    assert_eq!(res.status(), 400);

    let res = request(&app, "DELETE", "/tasks", None).await;
    assert_eq!(res.status(), 409);
    let res = request(&app, "DELETE", "/tasks?confirm=true", None).await;
    assert_eq!(res.status(), 204);
    let res = request(&app, "GET", "/tasks", None).await;
    assert_eq!(body(res).await["stats"]["label"], "No tasks yet");
}

#[tokio::test]
async fn acceptance_theme_toggle() {
    let app = app().await;
    let res = request(&app, "GET", "/theme", None).await;
    assert_eq!(body(res).await["theme"], "dark");
    let res = request(&app, "POST", "/theme/toggle", None).await;
    assert_eq!(body(res).await, json!({ "theme": "light", "label": "Light" }));
    let res = request(&app, "GET", "/theme", None).await;
    assert_eq!(body(res).await["theme"], "light");
}

async fn body(res: hyper::Response<axum::body::Body>) -> Value {
    serde_json::from_slice(&to_bytes(res.into_body(), 1024 * 1024).await.unwrap()).unwrap()
}

async fn request(app: &Router, method: &str, path: &str, body: Option<Value>) -> hyper::Response<axum::body::Body> {
    use axum::body::Body;
    use axum::http::{Request, Method};
    use tower::ServiceExt;

    let req = Request::builder().method(Method::from_bytes(method.as_bytes()).unwrap()).uri(path);
    let req = match body {
        Some(json) => req.header("content-type", "application/json").body(Body::from(json.to_string())).unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
}
