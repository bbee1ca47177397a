// src/store.rs
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PayrollConfig;
use crate::dashboard::{dashboard_overview, DashboardOverview};
use crate::error::PayrollError;
use crate::payroll::{monthly_report, Baselines, MonthlyReport};
use crate::period::YearMonth;
use crate::schedule::{daily_schedule_report, DailyScheduleReport, ShiftDefaults};
use crate::snapshot::{employees_from_snapshot, Employee};

// --- Snapshots & Subscriptions ---

/// A delivered snapshot, already normalized. `revision` increases with every
/// push so consumers can tell a newer snapshot from a stale one.
#[derive(Debug, Clone, Default)]
pub struct FleetSnapshot {
    pub revision: u64,
    pub employees: Arc<Vec<Employee>>,
}

/// A push-based record store: subscribers get the current snapshot and then
/// every full re-snapshot after it.
pub trait SnapshotSource {
    fn subscribe(&self) -> Subscription;
}

/// Live feed of snapshots. Cancelling (or dropping) it ends the feed; nothing
/// else needs releasing.
pub struct Subscription {
    receiver: watch::Receiver<FleetSnapshot>,
    cancel_token: CancellationToken,
}

impl Subscription {
    fn new(receiver: watch::Receiver<FleetSnapshot>) -> Self {
        Self {
            receiver,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Most recently delivered snapshot.
    pub fn latest(&self) -> FleetSnapshot {
        self.receiver.borrow().clone()
    }

    /// Waits for the next snapshot. Returns `None` once unsubscribed or once
    /// the store is gone.
    pub async fn next(&mut self) -> Option<FleetSnapshot> {
        if self.cancel_token.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => None,
            changed = self.receiver.changed() => match changed {
                Ok(()) => Some(self.receiver.borrow_and_update().clone()),
                Err(_) => {
                    debug!("Snapshot store dropped; ending subscription");
                    None
                }
            },
        }
    }

    /// Handle that ends this subscription from elsewhere.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn unsubscribe(&self) {
        self.cancel_token.cancel();
    }
}

/// In-process record store fed with full snapshots.
pub struct SnapshotStore {
    sender: watch::Sender<FleetSnapshot>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(FleetSnapshot::default());
        Self { sender }
    }

    /// Normalizes and publishes a raw snapshot, returning its revision.
    pub fn publish(&self, raw: &Value) -> FleetSnapshot {
        let employees = Arc::new(employees_from_snapshot(raw));
        let mut published = FleetSnapshot::default();
        self.sender.send_modify(|current| {
            current.revision += 1;
            current.employees = employees;
            published = current.clone();
        });
        info!(
            "Published snapshot revision {} with {} employees to {} subscribers",
            published.revision,
            published.employees.len(),
            self.sender.receiver_count()
        );
        published
    }

    pub fn current(&self) -> FleetSnapshot {
        self.sender.borrow().clone()
    }
}

impl SnapshotSource for SnapshotStore {
    fn subscribe(&self) -> Subscription {
        Subscription::new(self.sender.subscribe())
    }
}

// --- Memoized Views ---

/// Single-slot cache keyed by the inputs a derived value depends on.
struct Memo<K, V> {
    slot: Option<(K, Arc<V>)>,
}

impl<K: PartialEq, V> Memo<K, V> {
    fn new() -> Self {
        Self { slot: None }
    }

    fn get_or_compute(&mut self, key: K, compute: impl FnOnce() -> V) -> Arc<V> {
        if let Some((cached_key, value)) = &self.slot {
            if *cached_key == key {
                return value.clone();
            }
        }
        let value = Arc::new(compute());
        self.slot = Some((key, value.clone()));
        value
    }
}

/// Derived payroll state for the latest snapshot and the selected period.
/// Every figure is recomputed from `(revision, period)`; nothing is updated
/// in place.
pub struct PayrollView {
    config: PayrollConfig,
    snapshot: FleetSnapshot,
    selected_month: YearMonth,
    selected_date: NaiveDate,
    reports: Memo<(u64, YearMonth), MonthlyReport>,
    schedules: Memo<(u64, NaiveDate), DailyScheduleReport>,
    dashboards: Memo<u64, DashboardOverview>,
}

impl PayrollView {
    pub fn new(config: PayrollConfig, selected_month: YearMonth, selected_date: NaiveDate) -> Self {
        Self {
            config,
            snapshot: FleetSnapshot::default(),
            selected_month,
            selected_date,
            reports: Memo::new(),
            schedules: Memo::new(),
            dashboards: Memo::new(),
        }
    }

    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    pub fn revision(&self) -> u64 {
        self.snapshot.revision
    }

    pub fn employees(&self) -> &[Employee] {
        &self.snapshot.employees
    }

    /// Adopts `snapshot` unless it is older than the one already held.
    /// Returns whether the view changed.
    pub fn apply_snapshot(&mut self, snapshot: FleetSnapshot) -> bool {
        if snapshot.revision < self.snapshot.revision {
            warn!(
                "Ignoring stale snapshot revision {} (holding {})",
                snapshot.revision, self.snapshot.revision
            );
            return false;
        }
        let changed = snapshot.revision != self.snapshot.revision;
        self.snapshot = snapshot;
        changed
    }

    pub fn selected_month(&self) -> YearMonth {
        self.selected_month
    }

    pub fn select_month(&mut self, month: YearMonth) {
        self.selected_month = month;
    }

    /// Month navigator: one step back with -1, forward with 1.
    pub fn shift_month(&mut self, offset: i32) -> YearMonth {
        self.selected_month = self.selected_month.shift(offset);
        self.selected_month
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
    }

    pub fn report(&mut self) -> Arc<MonthlyReport> {
        self.report_for(self.selected_month)
    }

    pub fn report_for(&mut self, month: YearMonth) -> Arc<MonthlyReport> {
        let employees = &self.snapshot.employees;
        let baselines = Baselines::from(&self.config);
        self.reports
            .get_or_compute((self.snapshot.revision, month), || {
                monthly_report(employees, month, &baselines)
            })
    }

    pub fn schedule(&mut self) -> Arc<DailyScheduleReport> {
        self.schedule_for(self.selected_date)
    }

    pub fn schedule_for(&mut self, date: NaiveDate) -> Arc<DailyScheduleReport> {
        let employees = &self.snapshot.employees;
        let defaults = ShiftDefaults::from(&self.config);
        self.schedules
            .get_or_compute((self.snapshot.revision, date), || {
                daily_schedule_report(employees, date, &defaults)
            })
    }

    pub fn dashboard(&mut self) -> Arc<DashboardOverview> {
        let employees = &self.snapshot.employees;
        let config = &self.config;
        self.dashboards
            .get_or_compute(self.snapshot.revision, || dashboard_overview(employees, config))
    }
}

// --- Live View ---

/// A `PayrollView` kept current by a background task that follows a
/// subscription. Stopping it unsubscribes.
#[derive(Clone)]
pub struct LiveView {
    view: Arc<Mutex<PayrollView>>,
    cancel_token: CancellationToken,
}

impl LiveView {
    pub fn spawn<S: SnapshotSource>(source: &S, view: PayrollView) -> (Self, JoinHandle<()>) {
        let mut subscription = source.subscribe();
        let view = Arc::new(Mutex::new(view));
        let live = Self {
            view: view.clone(),
            cancel_token: subscription.cancel_handle(),
        };

        // Pick up whatever the store already holds before waiting for pushes.
        let initial = subscription.latest();
        if let Ok(mut guard) = view.lock() {
            guard.apply_snapshot(initial);
        }

        let handle = tokio::spawn(async move {
            info!("Live payroll view subscribed to snapshot feed");
            while let Some(snapshot) = subscription.next().await {
                let Ok(mut guard) = view.lock() else {
                    warn!("Payroll view lock poisoned; stopping live updates");
                    break;
                };
                if guard.apply_snapshot(snapshot) {
                    let report = guard.report();
                    info!(
                        "Recomputed payroll for {} at revision {}: {} employees, {} hours",
                        report.month,
                        guard.revision(),
                        report.summary.employee_count,
                        report.summary.total_hours
                    );
                }
            }
            // Covers the store going away too, so `is_live` turns false.
            subscription.unsubscribe();
            info!("Live payroll view unsubscribed");
        });

        (live, handle)
    }

    /// Runs `f` against the view. The view is locked for the duration of `f`.
    pub fn with_view<T>(&self, f: impl FnOnce(&mut PayrollView) -> T) -> Result<T, PayrollError> {
        let mut guard = self.view.lock().map_err(|_| PayrollError::LockError)?;
        Ok(f(&mut guard))
    }

    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    /// Whether the view still follows the snapshot feed.
    pub fn is_live(&self) -> bool {
        !self.cancel_token.is_cancelled()
    }
}
