use std::{fmt, fs::File, net::SocketAddr, sync::Mutex};

use anyhow::Context;
use async_trait::async_trait;
use cucumber::{given, then, when, World as _};
use tempfile::TempDir;
use tokio::{net::TcpListener, task::JoinHandle};
use trip_planner::{
    client::{ClientError, HttpTripClient, TripDateApi},
    config::AppConfig,
    controller::{DateMode, Phase, TripDateController},
    db::{init_pool, migrate},
    models::trip::{NewTrip, Trip},
    routes::create_router,
    state::AppState,
};

#[derive(Debug, cucumber::World, Default)]
struct TripWorld {
    state: Option<TestState>,
    controller: TripDateController,
    host_trip: Option<Trip>,
    host_updates: usize,
    http_error: Option<ClientError>,
    page: Option<String>,
}

impl TripWorld {
    fn test_state(&self) -> &TestState {
        self.state.as_ref().expect("state must be initialised first")
    }

    fn host_trip(&self) -> &Trip {
        self.host_trip.as_ref().expect("a trip must exist first")
    }
}

/// Wraps the real client so steps can count calls and force failures.
#[derive(Debug)]
struct RecordingApi {
    inner: HttpTripClient,
    failure: Option<String>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl RecordingApi {
    fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl TripDateApi for RecordingApi {
    async fn update_start_date(
        &self,
        trip_id: &str,
        new_date: Option<&str>,
    ) -> Result<Trip, ClientError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((trip_id.to_string(), new_date.map(str::to_string)));
        if let Some(message) = &self.failure {
            return Err(ClientError::Server(message.clone()));
        }
        self.inner.update_start_date(trip_id, new_date).await
    }
}

struct TestState {
    api: RecordingApi,
    base_url: String,
    server: JoinHandle<()>,
    _root: TempDir,
}

impl fmt::Debug for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestState")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Drop for TestState {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl TestState {
    async fn new() -> anyhow::Result<Self> {
        let root = TempDir::new().context("create temp dir for bdd world")?;
        let db_path = root.path().join("bdd.sqlite");
        File::create(&db_path)?;
        let database_url = format!("sqlite://{}", db_path.to_string_lossy());

        let config = AppConfig {
            database_url,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        };

        let db = init_pool(&config.database_url).await?;
        migrate(&db).await?;

        let listener = TcpListener::bind(config.listen_addr).await?;
        let addr = listener.local_addr()?;
        let app = create_router(AppState::new(db));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app.into_make_service()).await;
        });

        let base_url = format!("http://{addr}");
        let inner = HttpTripClient::new(&format!("{base_url}/api"), Some("bdd-token".into()))?;
        Ok(Self {
            api: RecordingApi {
                inner,
                failure: None,
                calls: Mutex::new(Vec::new()),
            },
            base_url,
            server,
            _root: root,
        })
    }

    fn client(&self) -> &HttpTripClient {
        &self.api.inner
    }
}

#[given("a running trip api")]
async fn given_running_api(world: &mut TripWorld) {
    world.state = Some(TestState::new().await.expect("state"));
    world.controller = TripDateController::new();
    world.host_trip = None;
    world.host_updates = 0;
}

#[given(regex = r#"^a trip \"([^\"]+)\" without a start date$"#)]
async fn given_trip_without_date(world: &mut TripWorld, title: String) {
    create_trip(world, title, None).await;
}

#[given(regex = r#"^a trip \"([^\"]+)\" starting on \"([^\"]+)\"$"#)]
async fn given_trip_with_date(world: &mut TripWorld, title: String, date: String) {
    create_trip(world, title, Some(date)).await;
}

#[given(regex = r#"^the API fails with \"([^\"]+)\"$"#)]
async fn given_api_fails(world: &mut TripWorld, message: String) {
    world
        .state
        .as_mut()
        .expect("state must be initialised first")
        .api
        .failure = Some(message);
}

#[when("I open the date editor")]
async fn when_open_editor(world: &mut TripWorld) {
    let trip = world.host_trip().clone();
    world.controller.open(&trip).expect("open editor");
}

#[when(regex = r#"^I enter \"([^\"]*)\"$"#)]
async fn when_enter_date(world: &mut TripWorld, value: String) {
    world.controller.edit(value).expect("edit draft");
}

#[when("I submit the date")]
async fn when_submit(world: &mut TripWorld) {
    let TripWorld {
        state,
        controller,
        host_trip,
        host_updates,
        ..
    } = world;
    let api = &state.as_ref().expect("state").api;
    // Validation failures are reported through the editor's error message.
    if let Ok(Some(trip)) = controller.submit(api).await {
        *host_trip = Some(trip);
        *host_updates += 1;
    }
}

#[when("I clear the date")]
async fn when_clear(world: &mut TripWorld) {
    let TripWorld {
        state,
        controller,
        host_trip,
        host_updates,
        ..
    } = world;
    let api = &state.as_ref().expect("state").api;
    if let Some(trip) = controller.clear(api).await.expect("clear") {
        *host_trip = Some(trip);
        *host_updates += 1;
    }
}

#[when("I cancel the editor")]
async fn when_cancel(world: &mut TripWorld) {
    world.controller.cancel().expect("cancel");
}

#[when(regex = r#"^I patch the start date to \"([^\"]*)\" over HTTP$"#)]
async fn when_patch_date(world: &mut TripWorld, value: String) {
    let trip_id = world.host_trip().id.clone();
    patch_over_http(world, trip_id, value).await;
}

#[when(regex = r#"^I patch trip \"([^\"]+)\" start date to \"([^\"]*)\" over HTTP$"#)]
async fn when_patch_trip_date(world: &mut TripWorld, trip_id: String, value: String) {
    patch_over_http(world, trip_id, value).await;
}

#[when(regex = r#"^I patch trip \"([^\"]+)\" start date to \"([^\"]*)\" outside the API$"#)]
async fn when_patch_outside_api(world: &mut TripWorld, trip_id: String, value: String) {
    // The server root has no `/trips` route, so axum answers with an empty 404.
    let client =
        HttpTripClient::new(&world.test_state().base_url, None).expect("root client");
    world.http_error = client
        .update_start_date(&trip_id, Some(value.as_str()))
        .await
        .err();
}

#[when("I load the host page")]
async fn when_load_page(world: &mut TripWorld) {
    let url = format!("{}/", world.test_state().base_url);
    let body = reqwest::get(url)
        .await
        .expect("load page")
        .error_for_status()
        .expect("page status")
        .text()
        .await
        .expect("page body");
    world.page = Some(body);
}

#[then(regex = r#"^the editor is in \"(set|update)\" mode$"#)]
async fn then_editor_mode(world: &mut TripWorld, mode: String) {
    let expected = if mode == "set" {
        DateMode::Set
    } else {
        DateMode::Update
    };
    assert_eq!(world.controller.mode(), Some(expected));
}

#[then(regex = r#"^the draft is \"([^\"]*)\"$"#)]
async fn then_draft_is(world: &mut TripWorld, expected: String) {
    assert_eq!(world.controller.draft_value(), Some(expected.as_str()));
}

#[then(regex = r#"^the preview reads \"([^\"]+)\"$"#)]
async fn then_preview(world: &mut TripWorld, expected: String) {
    assert_eq!(world.controller.preview(), Some(expected));
}

#[then("the editor is closed")]
async fn then_editor_closed(world: &mut TripWorld) {
    assert_eq!(world.controller.phase(), Phase::Closed);
}

#[then("the editor is open")]
async fn then_editor_open(world: &mut TripWorld) {
    assert_eq!(world.controller.phase(), Phase::Open);
}

#[then(regex = r#"^the editor shows the error \"([^\"]+)\"$"#)]
async fn then_editor_error(world: &mut TripWorld, expected: String) {
    assert_eq!(world.controller.error_message(), Some(expected.as_str()));
}

#[then("no API call was made")]
async fn then_no_api_call(world: &mut TripWorld) {
    assert!(world.test_state().api.calls().is_empty());
}

#[then("the API was called with no date")]
async fn then_called_with_null(world: &mut TripWorld) {
    let calls = world.test_state().api.calls();
    let (trip_id, date) = calls.last().expect("one api call");
    assert_eq!(trip_id, &world.host_trip().id);
    assert_eq!(date, &None);
}

#[then(regex = r"^the host received (\d+) updated trips?$")]
async fn then_host_updates(world: &mut TripWorld, expected: usize) {
    assert_eq!(world.host_updates, expected);
}

#[then(regex = r#"^the host trip has start date \"([^\"]+)\"$"#)]
async fn then_host_trip_date(world: &mut TripWorld, expected: String) {
    assert_eq!(world.host_trip().start_date.as_deref(), Some(expected.as_str()));
}

#[then("the host trip has no start date")]
async fn then_host_trip_no_date(world: &mut TripWorld) {
    assert_eq!(world.host_trip().start_date, None);
}

#[then(regex = r#"^the stored trip has start date \"([^\"]+)\"$"#)]
async fn then_stored_date(world: &mut TripWorld, expected: String) {
    let stored = world
        .test_state()
        .client()
        .get_trip(&world.host_trip().id)
        .await
        .expect("load stored trip");
    assert_eq!(stored.start_date.as_deref(), Some(expected.as_str()));
}

#[then(regex = r#"^the HTTP client reports \"([^\"]+)\"$"#)]
async fn then_http_error(world: &mut TripWorld, expected: String) {
    let err = world.http_error.as_ref().expect("an http error");
    assert_eq!(err.to_string(), expected);
}

#[then(regex = r"^the HTTP client error is (not found|validation|server)$")]
async fn then_http_error_kind(world: &mut TripWorld, kind: String) {
    let err = world.http_error.as_ref().expect("an http error");
    let matched = match kind.as_str() {
        "not found" => matches!(err, ClientError::NotFound(_)),
        "validation" => matches!(err, ClientError::Validation(_)),
        _ => matches!(err, ClientError::Server(_)),
    };
    assert!(matched, "expected a {kind} error, got {err:?}");
}

#[then(regex = r#"^the page contains \"([^\"]+)\"$"#)]
async fn then_page_contains(world: &mut TripWorld, expected: String) {
    let page = world.page.as_deref().expect("page must be loaded first");
    assert!(page.contains(&expected), "page did not contain {expected:?}");
}

async fn create_trip(world: &mut TripWorld, title: String, start_date: Option<String>) {
    let trip = world
        .test_state()
        .client()
        .create_trip(&NewTrip {
            title,
            start_date,
            ..NewTrip::default()
        })
        .await
        .expect("create trip");
    world.host_trip = Some(trip);
}

async fn patch_over_http(world: &mut TripWorld, trip_id: String, value: String) {
    let result = world
        .test_state()
        .client()
        .update_start_date(&trip_id, Some(value.as_str()))
        .await;
    match result {
        Ok(trip) => {
            world.host_trip = Some(trip);
            world.http_error = None;
        }
        Err(err) => world.http_error = Some(err),
    }
}

#[tokio::main]
async fn main() {
    TripWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}
