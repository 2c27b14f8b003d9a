//! Test doubles: a [View] that records everything it is shown, and a
//! scripted backend whose answers and latencies are set up front.

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
    time::Duration,
};

use tokio::time::Instant;

use crate::{
    AddressField, AddressStore, Badge, CatalogEntry, CatalogRow, DeviceStatus, DeviceStatusSource, Error, FileCatalog,
    Indicator, PrintControl, ProgressSink, Result, StatusReadout, UploadFile, View,
};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Event {
    Indicator(Indicator),
    Catalog(Vec<CatalogRow>),
    CatalogFailed(String),
    Status(StatusReadout),
    StatusFailed(String),
    Badge(Badge),
    Address(AddressField),
    Notify(String),
}

#[derive(Default)]
pub(crate) struct RecordingView {
    events: Mutex<Vec<(Instant, Event)>>,
}

impl RecordingView {
    fn record(&self, event: Event) {
        self.events.lock().unwrap().push((Instant::now(), event));
    }

    pub(crate) fn timed(&self) -> Vec<(Instant, Event)> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.timed().into_iter().map(|(_, event)| event).collect()
    }

    pub(crate) fn indicators(&self) -> Vec<Indicator> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Indicator(indicator) => Some(indicator),
                _ => None,
            })
            .collect()
    }

    /// Percentages of the shown indicator, with repeats collapsed.
    pub(crate) fn percents(&self) -> Vec<f64> {
        let mut percents: Vec<f64> = vec![];
        for indicator in self.indicators().into_iter().filter(|i| i.visible) {
            if percents.last() != Some(&indicator.percent) {
                percents.push(indicator.percent);
            }
        }
        percents
    }

    pub(crate) fn hides(&self) -> usize {
        self.indicators().iter().filter(|i| !i.visible).count()
    }

    pub(crate) fn notifications(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Notify(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn last_catalog(&self) -> Option<Vec<CatalogRow>> {
        self.events().into_iter().rev().find_map(|event| match event {
            Event::Catalog(rows) => Some(rows),
            _ => None,
        })
    }

    pub(crate) fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl View for RecordingView {
    fn indicator(&self, indicator: &Indicator) {
        self.record(Event::Indicator(indicator.clone()));
    }
    fn catalog(&self, rows: &[CatalogRow]) {
        self.record(Event::Catalog(rows.to_vec()));
    }
    fn catalog_failed(&self, message: &str) {
        self.record(Event::CatalogFailed(message.to_owned()));
    }
    fn status(&self, readout: &StatusReadout) {
        self.record(Event::Status(readout.clone()));
    }
    fn status_failed(&self, message: &str) {
        self.record(Event::StatusFailed(message.to_owned()));
    }
    fn badge(&self, badge: Badge) {
        self.record(Event::Badge(badge));
    }
    fn address(&self, field: &AddressField) {
        self.record(Event::Address(field.clone()));
    }
    fn notify(&self, message: &str) {
        self.record(Event::Notify(message.to_owned()));
    }
}

/// One scripted answer: how long the backend takes, and what it says.
/// `Err` strings become connectivity failures.
pub(crate) type Step<T> = (Duration, std::result::Result<T, String>);

pub(crate) fn ok<T>(millis: u64, value: T) -> Step<T> {
    (Duration::from_millis(millis), Ok(value))
}

pub(crate) fn fail<T>(millis: u64, reason: &str) -> Step<T> {
    (Duration::from_millis(millis), Err(reason.to_owned()))
}

/// Backend reporting failures the way a well-formed `{error}` reply does.
pub(crate) const BACKEND_ERROR_PREFIX: &str = "backend:";

#[derive(Default)]
struct Script {
    address: Option<String>,
    address_updates: VecDeque<Step<String>>,
    files: Vec<CatalogEntry>,
    list_failures: usize,
    uploads: HashMap<String, (Vec<(Duration, f64)>, Step<()>)>,
    prints: VecDeque<Step<String>>,
    progress: HashMap<String, VecDeque<Step<f64>>>,
    statuses: VecDeque<Step<DeviceStatus>>,
    calls: Vec<String>,
}

#[derive(Default)]
pub(crate) struct MockBackend {
    script: Mutex<Script>,
}

impl MockBackend {
    pub(crate) fn with_files(self, files: &[(&str, f64)]) -> Self {
        self.script.lock().unwrap().files = files
            .iter()
            .map(|(name, size_mb)| CatalogEntry {
                name: (*name).to_owned(),
                size_mb: *size_mb,
            })
            .collect();
        self
    }

    pub(crate) fn with_address(self, address: &str) -> Self {
        self.script.lock().unwrap().address = Some(address.to_owned());
        self
    }

    pub(crate) fn on_set_address(self, step: Step<String>) -> Self {
        self.script.lock().unwrap().address_updates.push_back(step);
        self
    }

    pub(crate) fn fail_next_list(self) -> Self {
        self.script.lock().unwrap().list_failures += 1;
        self
    }

    /// Uploading `name` reports `progress` (each after its delay), then
    /// answers with `result`.
    pub(crate) fn on_upload(self, name: &str, progress: &[(u64, f64)], result: Step<()>) -> Self {
        let progress = progress
            .iter()
            .map(|(millis, percent)| (Duration::from_millis(*millis), *percent))
            .collect();
        self.script
            .lock()
            .unwrap()
            .uploads
            .insert(name.to_owned(), (progress, result));
        self
    }

    pub(crate) fn on_print(self, step: Step<String>) -> Self {
        self.script.lock().unwrap().prints.push_back(step);
        self
    }

    pub(crate) fn on_progress(self, name: &str, steps: Vec<Step<f64>>) -> Self {
        self.script
            .lock()
            .unwrap()
            .progress
            .entry(name.to_owned())
            .or_default()
            .extend(steps);
        self
    }

    pub(crate) fn on_status(self, step: Step<DeviceStatus>) -> Self {
        self.script.lock().unwrap().statuses.push_back(step);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    pub(crate) fn count_calls(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    fn call(&self, call: String) {
        self.script.lock().unwrap().calls.push(call);
    }

    async fn answer<T>(step: Option<Step<T>>) -> Result<T> {
        let Some((delay, result)) = step else {
            return Err(Error::Connectivity("unscripted call".to_owned()));
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result.map_err(|reason| match reason.strip_prefix(BACKEND_ERROR_PREFIX) {
            Some(message) => Error::Backend(message.trim().to_owned()),
            None => Error::Connectivity(reason),
        })
    }
}

impl AddressStore for MockBackend {
    async fn address(&self) -> Result<String> {
        self.call("address".to_owned());
        let address = self.script.lock().unwrap().address.clone();
        address.ok_or_else(|| Error::Backend("No printer was found on the network".to_owned()))
    }

    async fn set_address(&self, address: &str) -> Result<String> {
        self.call(format!("set_address {}", address));
        let step = self.script.lock().unwrap().address_updates.pop_front();
        let message = Self::answer(step).await?;
        self.script.lock().unwrap().address = Some(address.to_owned());
        Ok(message)
    }
}

impl FileCatalog for MockBackend {
    async fn list(&self) -> Result<Vec<CatalogEntry>> {
        self.call("list".to_owned());
        let mut script = self.script.lock().unwrap();
        if script.list_failures > 0 {
            script.list_failures -= 1;
            return Err(Error::Connectivity("connection refused".to_owned()));
        }
        Ok(script.files.clone())
    }

    async fn upload(&self, file: UploadFile, progress: ProgressSink) -> Result<()> {
        self.call(format!("upload {}", file.name));
        let scripted = self.script.lock().unwrap().uploads.remove(&file.name);
        let (steps, result) = match scripted {
            Some((steps, result)) => (steps, Some(result)),
            None => (vec![], None),
        };
        for (delay, percent) in steps {
            tokio::time::sleep(delay).await;
            let _ = progress.send(percent);
        }
        Self::answer(result).await?;
        self.script.lock().unwrap().files.push(CatalogEntry {
            name: file.name,
            size_mb: file.contents.len() as f64 / (1024.0 * 1024.0),
        });
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<String> {
        self.call(format!("delete {}", name));
        let mut script = self.script.lock().unwrap();
        let before = script.files.len();
        script.files.retain(|entry| entry.name != name);
        if script.files.len() == before {
            return Err(Error::Backend(format!("{} not found", name)));
        }
        Ok(format!("File {} deleted successfully", name))
    }
}

impl PrintControl for MockBackend {
    async fn print(&self, name: &str) -> Result<String> {
        self.call(format!("print {}", name));
        let step = self.script.lock().unwrap().prints.pop_front();
        Self::answer(step).await
    }

    async fn job_progress(&self, name: &str) -> Result<f64> {
        self.call(format!("progress {}", name));
        let step = self
            .script
            .lock()
            .unwrap()
            .progress
            .get_mut(name)
            .and_then(|steps| steps.pop_front());
        Self::answer(step).await
    }
}

impl DeviceStatusSource for MockBackend {
    async fn device_status(&self) -> Result<DeviceStatus> {
        self.call("status".to_owned());
        let step = self.script.lock().unwrap().statuses.pop_front();
        Self::answer(step).await
    }
}

pub(crate) fn device_status(status: &str, progress: f64, online: bool) -> DeviceStatus {
    DeviceStatus {
        status: status.to_owned(),
        progress,
        online,
        current_layer: None,
        total_layers: None,
    }
}
