//! Shared test doubles and fixtures
//!
//! A scripted `ClusterClient` fake (plus a matching factory) used by the
//! state-machine and log-collection tests. Call counts are exposed so tests
//! can assert that terminal verdicts and stop signals really halt fetching.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use mig9s::alerts::{AlertEmitter, AlertEvent, AlertReceiver};
use mig9s::config::MigMeta;
use mig9s::events::{EventReceiver, PlanEvent};
use mig9s::kube::{ClientError, ClientFactory, ClusterClient, ListOptions, ResourceDescriptor};
use mig9s::services::PlanService;

type ListKey = (String, Option<String>, Option<String>);

fn list_key(resource: &ResourceDescriptor, label: Option<&str>) -> ListKey {
    (
        resource.kind().to_string(),
        resource.namespace().map(String::from),
        label.map(String::from),
    )
}

fn fail(message: &str) -> ClientError {
    ClientError::Config(message.to_string())
}

/// Scripted per-cluster client.
///
/// List and log responses are keyed by resource/label and pod; get and put
/// responses are consumed in order, with optional fallbacks.
#[derive(Default)]
pub struct FakeClusterClient {
    lists: Mutex<HashMap<ListKey, Result<Vec<Value>, String>>>,
    logs: Mutex<HashMap<(String, String), Result<String, String>>>,
    get_script: Mutex<VecDeque<Result<Value, String>>>,
    default_get: Mutex<Option<Value>>,
    put_script: Mutex<VecDeque<Result<Value, String>>>,
    delete_error: Mutex<Option<String>>,
    pub last_put: Mutex<Option<(String, Value)>>,
    pub get_calls: AtomicUsize,
    pub put_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub log_calls: AtomicUsize,
}

impl FakeClusterClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_list(
        &self,
        resource: &ResourceDescriptor,
        label: Option<&str>,
        result: Result<Vec<Value>, &str>,
    ) {
        self.lists
            .lock()
            .unwrap()
            .insert(list_key(resource, label), result.map_err(String::from));
    }

    pub fn on_log(&self, namespace: &str, pod: &str, result: Result<&str, &str>) {
        self.logs.lock().unwrap().insert(
            (namespace.to_string(), pod.to_string()),
            result.map(String::from).map_err(String::from),
        );
    }

    /// Queue the next get response.
    pub fn push_get(&self, result: Result<Value, &str>) {
        self.get_script
            .lock()
            .unwrap()
            .push_back(result.map_err(String::from));
    }

    /// Response for gets once the script runs dry.
    pub fn set_default_get(&self, value: Value) {
        *self.default_get.lock().unwrap() = Some(value);
    }

    /// Queue the next put response. Without a script, puts echo their body.
    pub fn push_put(&self, result: Result<Value, &str>) {
        self.put_script
            .lock()
            .unwrap()
            .push_back(result.map_err(String::from));
    }

    pub fn fail_delete(&self, message: &str) {
        *self.delete_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn get_count(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn put_count(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClusterClient for FakeClusterClient {
    async fn list(
        &self,
        resource: &ResourceDescriptor,
        options: &ListOptions,
    ) -> Result<Vec<Value>, ClientError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let key = list_key(resource, options.label_selector.as_deref());
        match self.lists.lock().unwrap().get(&key) {
            Some(Ok(items)) => Ok(items.clone()),
            Some(Err(message)) => Err(fail(message)),
            None => Ok(Vec::new()),
        }
    }

    async fn get(&self, _resource: &ResourceDescriptor, name: &str) -> Result<Value, ClientError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(result) = self.get_script.lock().unwrap().pop_front() {
            return result.map_err(|message| fail(&message));
        }
        match self.default_get.lock().unwrap().clone() {
            Some(value) => Ok(value),
            None => Err(fail(&format!("unexpected get for '{}'", name))),
        }
    }

    async fn put(
        &self,
        _resource: &ResourceDescriptor,
        name: &str,
        body: Value,
    ) -> Result<Value, ClientError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_put.lock().unwrap() = Some((name.to_string(), body.clone()));
        match self.put_script.lock().unwrap().pop_front() {
            Some(result) => result.map_err(|message| fail(&message)),
            None => Ok(body),
        }
    }

    async fn delete(&self, _resource: &ResourceDescriptor, _name: &str) -> Result<(), ClientError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        match self.delete_error.lock().unwrap().as_deref() {
            Some(message) => Err(fail(message)),
            None => Ok(()),
        }
    }

    async fn pod_logs(&self, namespace: &str, pod_name: &str) -> Result<String, ClientError> {
        self.log_calls.fetch_add(1, Ordering::SeqCst);
        match self
            .logs
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), pod_name.to_string()))
        {
            Some(Ok(log)) => Ok(log.clone()),
            Some(Err(message)) => Err(fail(message)),
            None => Err(fail(&format!("no log scripted for pod '{}'", pod_name))),
        }
    }
}

/// Factory over a fixed set of fakes, keyed by cluster name
pub struct FakeClientFactory {
    host: Arc<FakeClusterClient>,
    remotes: Mutex<HashMap<String, Arc<FakeClusterClient>>>,
}

impl FakeClientFactory {
    pub fn new(host: Arc<FakeClusterClient>) -> Self {
        Self {
            host,
            remotes: Mutex::new(HashMap::new()),
        }
    }

    pub fn add_cluster(&self, name: &str, client: Arc<FakeClusterClient>) {
        self.remotes.lock().unwrap().insert(name.to_string(), client);
    }
}

#[async_trait]
impl ClientFactory for FakeClientFactory {
    fn host(&self) -> Arc<dyn ClusterClient> {
        self.host.clone()
    }

    async fn for_cluster(&self, name: &str) -> Result<Arc<dyn ClusterClient>, ClientError> {
        match self.remotes.lock().unwrap().get(name) {
            Some(client) => Ok(client.clone()),
            None => Err(fail(&format!("unknown cluster '{}'", name))),
        }
    }
}

/// Service wired to a fake client plus freshly created event/alert channels.
pub fn make_service(
    client: Arc<FakeClusterClient>,
) -> (PlanService, EventReceiver, AlertReceiver) {
    let (event_tx, event_rx) = mig9s::events::channel();
    let (alert_tx, alert_rx) = mig9s::alerts::channel();
    let service = PlanService::new(
        client,
        MigMeta::default(),
        event_tx,
        AlertEmitter::new(alert_tx),
    );
    (service, event_rx, alert_rx)
}

/// Drain everything currently buffered on the event channel.
pub fn drain_events(rx: &mut EventReceiver) -> Vec<PlanEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn drain_alerts(rx: &mut AlertReceiver) -> Vec<AlertEvent> {
    let mut alerts = Vec::new();
    while let Ok(alert) = rx.try_recv() {
        alerts.push(alert);
    }
    alerts
}

/// Messages of all alerts raised so far.
pub fn raised_messages(alerts: &[AlertEvent]) -> Vec<String> {
    alerts
        .iter()
        .filter_map(|event| match event {
            AlertEvent::Raised(alert) => Some(alert.message.clone()),
            AlertEvent::Cleared => None,
        })
        .collect()
}

/// Plan resource JSON with the given `(type, category, message)` conditions.
pub fn plan_with_conditions(name: &str, conditions: &[(&str, &str, &str)]) -> Value {
    let conditions: Vec<Value> = conditions
        .iter()
        .map(|(type_, category, message)| {
            json!({ "type": type_, "category": category, "message": message })
        })
        .collect();
    json!({
        "apiVersion": "migration.openshift.io/v1alpha1",
        "kind": "MigPlan",
        "metadata": { "name": name, "namespace": "openshift-migration" },
        "spec": {
            "srcMigClusterRef": { "name": "src-cluster" },
            "destMigClusterRef": { "name": "dst-cluster" }
        },
        "status": { "conditions": conditions }
    })
}

/// Plan resource JSON with no conditions.
pub fn bare_plan(name: &str) -> Value {
    plan_with_conditions(name, &[])
}

/// Plan resource JSON naming specific source/target clusters.
pub fn plan_between(name: &str, source: &str, target: &str) -> Value {
    json!({
        "apiVersion": "migration.openshift.io/v1alpha1",
        "kind": "MigPlan",
        "metadata": { "name": name, "namespace": "openshift-migration" },
        "spec": {
            "srcMigClusterRef": { "name": source },
            "destMigClusterRef": { "name": target }
        }
    })
}

/// MigCluster resource JSON.
pub fn cluster_value(name: &str, is_host: bool) -> Value {
    json!({
        "apiVersion": "migration.openshift.io/v1alpha1",
        "kind": "MigCluster",
        "metadata": { "name": name, "namespace": "openshift-migration" },
        "spec": { "isHostCluster": is_host }
    })
}

/// Pod resource JSON, as returned by a pod list call.
pub fn pod_value(name: &str) -> Value {
    json!({ "metadata": { "name": name, "namespace": "openshift-migration" } })
}
