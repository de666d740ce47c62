//! Observable drink view state and the controller that drives it.
//!
//! # Overview
//! `DrinkViewModel` turns user intents (open a screen, tap a category, type
//! in the search box) into `DrinkApi` calls and publishes the outcome as a
//! `ViewState` through a `tokio::sync::watch` channel. Views hold a
//! `watch::Receiver` and re-render on change.
//!
//! # Design
//! - `DrinkApi` calls are blocking; each one runs on the runtime's blocking
//!   pool and its completion is applied from an async task.
//! - A new intent never waits for the previous one. The featured drink and
//!   the drink list each carry a request generation; a completion whose
//!   generation is no longer current is dropped, so the last *issued*
//!   request wins rather than the last to finish.
//! - Search-text changes go through `spawn_debouncer` before reaching
//!   `search`.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::config::DrinkConfig;
use crate::debounce::spawn_debouncer;
use crate::error::ApiError;
use crate::service::DrinkApi;
use crate::types::{Drink, DrinkCategory};

/// Everything a drink screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub drinks: Vec<Drink>,
    pub featured: Option<Drink>,
    pub loading: bool,
    pub error: Option<String>,
    pub search_text: String,
}

/// What `retry` re-issues.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Intent {
    Featured,
    Search(String),
    Category(DrinkCategory),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Featured,
    List,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    pending: bool,
}

impl Slot {
    fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.pending = true;
        self.generation
    }

    /// Returns false for a completion that has been superseded.
    fn finish(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.pending = false;
        true
    }

    fn cancel(&mut self) {
        self.generation += 1;
        self.pending = false;
    }
}

#[derive(Debug, Default)]
struct Requests {
    featured: Slot,
    list: Slot,
    last_intent: Option<Intent>,
}

impl Requests {
    fn slot(&mut self, field: Field) -> &mut Slot {
        match field {
            Field::Featured => &mut self.featured,
            Field::List => &mut self.list,
        }
    }

    fn any_pending(&self) -> bool {
        self.featured.pending || self.list.pending
    }
}

struct Shared {
    api: Arc<dyn DrinkApi>,
    runtime: Handle,
    state: watch::Sender<ViewState>,
    requests: Mutex<Requests>,
}

impl Shared {
    fn spawn_request<R, F, A>(self: &Arc<Self>, intent: Intent, field: Field, fetch: F, apply: A) -> JoinHandle<()>
    where
        R: Send + 'static,
        F: FnOnce(&dyn DrinkApi) -> Result<R, ApiError> + Send + 'static,
        A: FnOnce(&mut ViewState, R) + Send + 'static,
    {
        let generation = {
            let mut requests = self.requests.lock();
            requests.last_intent = Some(intent);
            let generation = requests.slot(field).begin();
            self.state.send_modify(|state| {
                state.loading = true;
                state.error = None;
            });
            generation
        };

        let shared = Arc::clone(self);
        self.runtime.spawn(async move {
            let api = Arc::clone(&shared.api);
            match tokio::task::spawn_blocking(move || fetch(api.as_ref())).await {
                Ok(result) => shared.complete(field, generation, result, apply),
                Err(join_error) => {
                    error!(?field, %join_error, "drink request task failed");
                    shared.abandon(field, generation);
                }
            }
        })
    }

    fn complete<R, A>(&self, field: Field, generation: u64, result: Result<R, ApiError>, apply: A)
    where
        A: FnOnce(&mut ViewState, R),
    {
        let mut requests = self.requests.lock();
        if !requests.slot(field).finish(generation) {
            debug!(?field, generation, "discarding stale completion");
            return;
        }
        let loading = requests.any_pending();
        self.state.send_modify(|state| {
            state.loading = loading;
            match result {
                Ok(value) => apply(state, value),
                Err(err) => {
                    warn!(?field, error = %err, "drink request failed");
                    state.error = Some(err.to_string());
                }
            }
        });
    }

    fn abandon(&self, field: Field, generation: u64) {
        let mut requests = self.requests.lock();
        if requests.slot(field).finish(generation) {
            let loading = requests.any_pending();
            self.state.send_modify(|state| state.loading = loading);
        }
    }

    fn load_featured(self: &Arc<Self>) -> JoinHandle<()> {
        self.spawn_request(
            Intent::Featured,
            Field::Featured,
            |api| api.random_drink(),
            |state, drink| state.featured = drink,
        )
    }

    fn search(self: &Arc<Self>, text: &str) -> Option<JoinHandle<()>> {
        if text.is_empty() {
            let mut requests = self.requests.lock();
            requests.list.cancel();
            let loading = requests.any_pending();
            self.state.send_modify(|state| {
                state.drinks.clear();
                state.loading = loading;
            });
            return None;
        }

        let query = text.to_string();
        Some(self.spawn_request(
            Intent::Search(query.clone()),
            Field::List,
            move |api| api.search_drinks(&query),
            |state, drinks| state.drinks = drinks,
        ))
    }

    fn load_by_category(self: &Arc<Self>, category: DrinkCategory) -> JoinHandle<()> {
        self.spawn_request(
            Intent::Category(category),
            Field::List,
            move |api| api.drinks_by_category(category),
            |state, drinks| state.drinks = drinks,
        )
    }
}

/// Controller for one drink screen. Dropping it stops the search debouncer;
/// requests already in flight still run to completion.
pub struct DrinkViewModel {
    shared: Arc<Shared>,
    search_tx: mpsc::UnboundedSender<String>,
}

impl DrinkViewModel {
    /// Build a view model on the current Tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn new(api: Arc<dyn DrinkApi>, config: &DrinkConfig) -> Self {
        Self::with_runtime(api, config, Handle::current())
    }

    /// Build a view model whose requests run on `runtime`. Its methods may
    /// then be called from any thread, including one outside the runtime.
    pub fn with_runtime(api: Arc<dyn DrinkApi>, config: &DrinkConfig, runtime: Handle) -> Self {
        let initial = ViewState::default();
        let initial_text = initial.search_text.clone();
        let (state, _) = watch::channel(initial);
        let shared = Arc::new(Shared {
            api,
            runtime,
            state,
            requests: Mutex::new(Requests::default()),
        });

        let (search_tx, search_rx) = mpsc::unbounded_channel();
        let debounced = Arc::clone(&shared);
        spawn_debouncer(
            &shared.runtime,
            config.search_debounce(),
            Some(initial_text),
            search_rx,
            move |text: String| {
                debounced.search(&text);
            },
        );

        Self { shared, search_tx }
    }

    /// Shorthand for a view model over `DrinkService::with_ureq`.
    #[cfg(feature = "ureq")]
    pub fn connect(config: &DrinkConfig) -> Self {
        let api = crate::service::DrinkService::with_ureq(&config.base_url);
        Self::new(Arc::new(api), config)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ViewState {
        self.shared.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.shared.state.subscribe()
    }

    /// Fetch a random drink into `featured`.
    pub fn load_featured(&self) -> JoinHandle<()> {
        self.shared.load_featured()
    }

    /// Search by name. Empty text clears the list right away and returns
    /// `None` without issuing a request.
    pub fn search(&self, text: &str) -> Option<JoinHandle<()>> {
        self.shared.search(text)
    }

    pub fn load_by_category(&self, category: DrinkCategory) -> JoinHandle<()> {
        self.shared.load_by_category(category)
    }

    /// Fetch one drink and hand it to `callback`. State is untouched; on
    /// failure the error is logged and `callback` is never called.
    pub fn lookup<F>(&self, id: &str, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Option<Drink>) + Send + 'static,
    {
        let api = Arc::clone(&self.shared.api);
        let id = id.to_string();
        self.shared.runtime.spawn(async move {
            let lookup_id = id.clone();
            match tokio::task::spawn_blocking(move || api.drink(&lookup_id)).await {
                Ok(Ok(drink)) => callback(drink),
                Ok(Err(err)) => warn!(%id, error = %err, "error fetching drink details"),
                Err(join_error) => error!(%id, %join_error, "drink lookup task failed"),
            }
        })
    }

    /// Record new search-box text. The search itself runs once the text
    /// has been stable for the debounce window and differs from the last
    /// text searched.
    pub fn set_search_text(&self, text: &str) {
        self.shared
            .state
            .send_modify(|state| state.search_text = text.to_string());
        if self.search_tx.send(text.to_string()).is_err() {
            warn!("search debouncer has stopped");
        }
    }

    /// Empty the list, the search text and the error.
    pub fn clear_results(&self) {
        {
            let mut requests = self.shared.requests.lock();
            requests.list.cancel();
            let loading = requests.any_pending();
            self.shared.state.send_modify(|state| {
                state.drinks.clear();
                state.search_text.clear();
                state.error = None;
                state.loading = loading;
            });
        }
        if self.search_tx.send(String::new()).is_err() {
            warn!("search debouncer has stopped");
        }
    }

    /// Re-issue the last featured, search or category request. `None` when
    /// nothing has been requested yet.
    pub fn retry(&self) -> Option<JoinHandle<()>> {
        let intent = self.shared.requests.lock().last_intent.clone()?;
        debug!(?intent, "retrying");
        match intent {
            Intent::Featured => Some(self.load_featured()),
            Intent::Search(text) => self.search(&text),
            Intent::Category(category) => Some(self.load_by_category(category)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Condvar, Mutex as StdMutex};
    use std::time::Duration;

    use super::*;
    use crate::types::Ingredient;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Search(String),
        Lookup(String),
        Random,
        Filter(DrinkCategory),
    }

    /// Blocks a fake request until opened.
    #[derive(Default)]
    struct Gate {
        open: StdMutex<bool>,
        cv: Condvar,
    }

    impl Gate {
        fn wait(&self) {
            let mut open = self.open.lock().unwrap();
            while !*open {
                open = self.cv.wait(open).unwrap();
            }
        }

        fn open(&self) {
            *self.open.lock().unwrap() = true;
            self.cv.notify_all();
        }
    }

    #[derive(Default)]
    struct FakeApi {
        catalogue: Vec<Drink>,
        calls: StdMutex<Vec<Call>>,
        offline: AtomicBool,
        gates: StdMutex<HashMap<String, Arc<Gate>>>,
    }

    impl FakeApi {
        fn new() -> Self {
            Self {
                catalogue: vec![
                    drink("1", "Margarita", DrinkCategory::Cocktail),
                    drink("2", "Mojito", DrinkCategory::Cocktail),
                    drink("3", "B-52", DrinkCategory::Shot),
                    drink("4", "Espresso Martini", DrinkCategory::Coffee),
                ],
                ..Self::default()
            }
        }

        fn gate(&self, query: &str) -> Arc<Gate> {
            let gate = Arc::new(Gate::default());
            self.gates
                .lock()
                .unwrap()
                .insert(query.to_string(), Arc::clone(&gate));
            gate
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(call);
            if self.offline.load(Ordering::SeqCst) {
                return Err(ApiError::Network("offline".to_string()));
            }
            Ok(())
        }
    }

    impl DrinkApi for FakeApi {
        fn search_drinks(&self, name: &str) -> Result<Vec<Drink>, ApiError> {
            self.record(Call::Search(name.to_string()))?;
            let gate = self.gates.lock().unwrap().get(name).cloned();
            if let Some(gate) = gate {
                gate.wait();
            }
            let needle = name.to_lowercase();
            Ok(self
                .catalogue
                .iter()
                .filter(|d| d.name.to_lowercase().contains(&needle))
                .cloned()
                .collect())
        }

        fn drink(&self, id: &str) -> Result<Option<Drink>, ApiError> {
            self.record(Call::Lookup(id.to_string()))?;
            Ok(self.catalogue.iter().find(|d| d.id == id).cloned())
        }

        fn random_drink(&self) -> Result<Option<Drink>, ApiError> {
            self.record(Call::Random)?;
            Ok(self.catalogue.first().cloned())
        }

        fn drinks_by_category(&self, category: DrinkCategory) -> Result<Vec<Drink>, ApiError> {
            self.record(Call::Filter(category))?;
            Ok(self
                .catalogue
                .iter()
                .filter(|d| d.category == category)
                .cloned()
                .collect())
        }

        fn categories(&self) -> Result<Vec<String>, ApiError> {
            Ok(DrinkCategory::ALL.iter().map(|c| c.label().to_string()).collect())
        }
    }

    fn drink(id: &str, name: &str, category: DrinkCategory) -> Drink {
        Drink {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{name} description"),
            image_url: None,
            ingredients: vec![Ingredient::new("Ice", None)],
            instructions: "Stir.".to_string(),
            category,
            alcoholic: category != DrinkCategory::NonAlcoholic,
            price: None,
        }
    }

    fn view_model() -> (Arc<FakeApi>, DrinkViewModel) {
        let api = Arc::new(FakeApi::new());
        let vm = DrinkViewModel::new(api.clone(), &DrinkConfig::default());
        (api, vm)
    }

    fn names(state: &ViewState) -> Vec<&str> {
        state.drinks.iter().map(|d| d.name.as_str()).collect()
    }

    #[tokio::test]
    async fn load_featured_sets_drink_and_clears_loading() {
        let (_api, vm) = view_model();
        let mut rx = vm.subscribe();

        vm.load_featured().await.unwrap();

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.featured.map(|d| d.name), Some("Margarita".to_string()));
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn load_by_category_only_returns_that_category() {
        let (api, vm) = view_model();
        for category in DrinkCategory::ALL {
            vm.load_by_category(category).await.unwrap();
            let state = vm.state();
            assert!(state.drinks.iter().all(|d| d.category == category), "{category}");
        }
        assert_eq!(api.calls().len(), DrinkCategory::ALL.len());
    }

    #[tokio::test]
    async fn empty_search_clears_without_request() {
        let (api, vm) = view_model();
        vm.load_by_category(DrinkCategory::Cocktail).await.unwrap();
        assert_eq!(vm.state().drinks.len(), 2);

        assert!(vm.search("").is_none());

        assert!(vm.state().drinks.is_empty());
        assert_eq!(api.calls(), vec![Call::Filter(DrinkCategory::Cocktail)]);
    }

    #[tokio::test]
    async fn transport_failure_keeps_previous_list() {
        let (api, vm) = view_model();
        vm.load_by_category(DrinkCategory::Cocktail).await.unwrap();
        api.offline.store(true, Ordering::SeqCst);

        vm.search("margarita").unwrap().await.unwrap();

        let state = vm.state();
        assert_eq!(names(&state), vec!["Margarita", "Mojito"]);
        assert!(!state.loading);
        let message = state.error.unwrap();
        assert!(message.starts_with("Network error"), "{message}");
    }

    #[tokio::test]
    async fn loading_is_set_while_request_is_in_flight() {
        let (api, vm) = view_model();
        let gate = api.gate("mojito");

        let handle = vm.search("mojito").unwrap();
        assert!(vm.state().loading);

        gate.open();
        handle.await.unwrap();
        let state = vm.state();
        assert!(!state.loading);
        assert_eq!(names(&state), vec!["Mojito"]);
    }

    #[tokio::test]
    async fn stale_completion_is_discarded() {
        let (api, vm) = view_model();
        let slow = api.gate("mar");

        let first = vm.search("mar").unwrap();
        let second = vm.search("mojito").unwrap();
        second.await.unwrap();
        assert_eq!(names(&vm.state()), vec!["Mojito"]);
        assert!(!vm.state().loading);

        slow.open();
        first.await.unwrap();
        assert_eq!(names(&vm.state()), vec!["Mojito"]);
    }

    #[tokio::test]
    async fn loading_stays_on_until_every_field_settles() {
        let (api, vm) = view_model();
        let gate = api.gate("b-52");

        let list = vm.search("b-52").unwrap();
        vm.load_featured().await.unwrap();
        assert!(vm.state().loading);

        gate.open();
        list.await.unwrap();
        assert!(!vm.state().loading);
    }

    #[tokio::test(start_paused = true)]
    async fn typing_burst_issues_one_search_with_final_text() {
        let (api, vm) = view_model();
        let mut rx = vm.subscribe();

        for text in ["m", "mo", "moj"] {
            vm.set_search_text(text);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(vm.state().search_text, "moj");
        assert!(api.calls().is_empty());

        tokio::time::sleep(Duration::from_secs(1)).await;
        rx.wait_for(|s| !s.loading && !s.drinks.is_empty())
            .await
            .unwrap();

        assert_eq!(api.calls(), vec![Call::Search("moj".to_string())]);
        assert_eq!(names(&vm.state()), vec!["Mojito"]);
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_search_text_is_not_searched_twice() {
        let (api, vm) = view_model();
        let mut rx = vm.subscribe();

        vm.set_search_text("gin");
        tokio::time::sleep(Duration::from_secs(1)).await;
        rx.wait_for(|s| !s.loading).await.unwrap();

        vm.set_search_text("ging");
        vm.set_search_text("gin");
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(!vm.state().loading);
        assert_eq!(api.calls(), vec![Call::Search("gin".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn text_returning_to_empty_keeps_category_list() {
        let (api, vm) = view_model();
        vm.load_by_category(DrinkCategory::Cocktail).await.unwrap();

        vm.set_search_text("g");
        vm.set_search_text("");
        tokio::time::sleep(Duration::from_secs(1)).await;

        let state = vm.state();
        assert_eq!(names(&state), vec!["Margarita", "Mojito"]);
        assert!(!state.loading);
        assert_eq!(api.calls(), vec![Call::Filter(DrinkCategory::Cocktail)]);
    }

    #[tokio::test(start_paused = true)]
    async fn same_text_searches_again_after_clear_results() {
        let (api, vm) = view_model();
        let mut rx = vm.subscribe();

        vm.set_search_text("moj");
        tokio::time::sleep(Duration::from_secs(1)).await;
        rx.wait_for(|s| !s.loading && !s.drinks.is_empty())
            .await
            .unwrap();

        vm.clear_results();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(vm.state().drinks.is_empty());

        vm.set_search_text("moj");
        tokio::time::sleep(Duration::from_secs(1)).await;
        rx.wait_for(|s| !s.loading && !s.drinks.is_empty())
            .await
            .unwrap();

        assert_eq!(
            api.calls(),
            vec![Call::Search("moj".to_string()), Call::Search("moj".to_string())]
        );
        assert_eq!(names(&vm.state()), vec!["Mojito"]);
    }

    #[tokio::test]
    async fn lookup_hands_drink_to_callback() {
        let (_api, vm) = view_model();
        let (tx, rx) = tokio::sync::oneshot::channel();

        vm.lookup("3", move |drink| {
            let _ = tx.send(drink);
        })
        .await
        .unwrap();

        let drink = rx.await.unwrap();
        assert_eq!(drink.map(|d| d.name), Some("B-52".to_string()));
        assert_eq!(vm.state(), ViewState::default());
    }

    #[tokio::test]
    async fn lookup_failure_skips_callback_and_state() {
        let (api, vm) = view_model();
        api.offline.store(true, Ordering::SeqCst);
        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);

        vm.lookup("3", move |_| flag.store(true, Ordering::SeqCst))
            .await
            .unwrap();

        assert!(!called.load(Ordering::SeqCst));
        assert!(vm.state().error.is_none());
    }

    #[tokio::test]
    async fn retry_reissues_last_intent() {
        let (api, vm) = view_model();
        assert!(vm.retry().is_none());

        api.offline.store(true, Ordering::SeqCst);
        vm.load_by_category(DrinkCategory::Shot).await.unwrap();
        assert!(vm.state().error.is_some());

        api.offline.store(false, Ordering::SeqCst);
        vm.retry().unwrap().await.unwrap();

        let state = vm.state();
        assert!(state.error.is_none());
        assert_eq!(names(&state), vec!["B-52"]);
        assert_eq!(
            api.calls(),
            vec![Call::Filter(DrinkCategory::Shot), Call::Filter(DrinkCategory::Shot)]
        );
    }

    #[tokio::test]
    async fn clear_results_resets_list_text_and_error() {
        let (api, vm) = view_model();
        vm.load_by_category(DrinkCategory::Cocktail).await.unwrap();
        api.offline.store(true, Ordering::SeqCst);
        vm.load_featured().await.unwrap();
        vm.set_search_text("mar");

        vm.clear_results();

        let state = vm.state();
        assert!(state.drinks.is_empty());
        assert!(state.search_text.is_empty());
        assert!(state.error.is_none());
    }
}
