// src/store_tests.rs

#[cfg(test)]
mod tests {
    use crate::config::PayrollConfig;
    use crate::period::YearMonth;
    use crate::store::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn snapshot_with_hours(hours: u32) -> Value {
        json!({
            "e1": {
                "name": "Elif",
                "monthlySalary": 22000,
                "workRecords": { "2024-03": { "1": hours } },
                "schedules": { "2024-03-15": { "startTime": "09:00", "endTime": "17:00" } }
            }
        })
    }

    fn new_view() -> PayrollView {
        PayrollView::new(PayrollConfig::default(), ym("2024-03"), d("2024-03-15"))
    }

    #[test]
    fn publish_increments_revision() {
        let store = SnapshotStore::new();
        assert_eq!(store.current().revision, 0);
        assert!(store.current().employees.is_empty());

        let first = store.publish(&snapshot_with_hours(8));
        let second = store.publish(&Value::Null);
        assert_eq!(first.revision, 1);
        assert_eq!(second.revision, 2);
        assert_eq!(store.current().revision, 2);
        assert!(store.current().employees.is_empty());
    }

    #[tokio::test]
    async fn subscription_delivers_latest_snapshot() {
        let store = SnapshotStore::new();
        store.publish(&snapshot_with_hours(8));

        let mut subscription = store.subscribe();
        assert_eq!(subscription.latest().revision, 1);

        store.publish(&snapshot_with_hours(9));
        store.publish(&snapshot_with_hours(10));

        // Intermediate pushes collapse into the most recent one
        let delivered = subscription.next().await.unwrap();
        assert_eq!(delivered.revision, 3);
        assert_eq!(
            delivered.employees[0].work_records["2024-03"]["1"],
            dec!(10)
        );
    }

    #[tokio::test]
    async fn unsubscribed_feed_ends() {
        let store = SnapshotStore::new();
        let mut subscription = store.subscribe();
        let cancel = subscription.cancel_handle();
        assert!(!cancel.is_cancelled());

        subscription.unsubscribe();
        store.publish(&snapshot_with_hours(8));
        assert!(cancel.is_cancelled());
        assert!(subscription.next().await.is_none());
    }

    #[tokio::test]
    async fn cancel_handle_wakes_waiting_subscriber() {
        let store = SnapshotStore::new();
        let mut subscription = store.subscribe();
        let cancel = subscription.cancel_handle();

        let waiter = tokio::spawn(async move { subscription.next().await });
        cancel.cancel();
        let result = timeout(Duration::from_secs(5), waiter).await.unwrap().unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn dropped_store_ends_feed() {
        let store = SnapshotStore::new();
        let mut subscription = store.subscribe();
        drop(store);
        assert!(subscription.next().await.is_none());
    }

    #[test]
    fn view_memoizes_per_revision_and_month() {
        let store = SnapshotStore::new();
        let mut view = new_view();
        assert!(view.apply_snapshot(store.publish(&snapshot_with_hours(110))));

        let first = view.report();
        let again = view.report();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(first.summary.total_calculated_salary, dec!(11000));

        // New month, new report
        let april = view.report_for(ym("2024-04"));
        assert_eq!(april.summary.total_hours, Decimal::ZERO);

        // New revision invalidates
        assert!(view.apply_snapshot(store.publish(&snapshot_with_hours(220))));
        let refreshed = view.report();
        assert!(!Arc::ptr_eq(&first, &refreshed));
        assert_eq!(refreshed.summary.total_calculated_salary, dec!(22000));
    }

    #[test]
    fn view_ignores_stale_snapshots() {
        let store = SnapshotStore::new();
        let old = store.publish(&snapshot_with_hours(8));
        let new = store.publish(&snapshot_with_hours(16));

        let mut view = new_view();
        assert!(view.apply_snapshot(new));
        assert!(!view.apply_snapshot(old));
        assert_eq!(view.revision(), 2);
        assert_eq!(view.report().summary.total_hours, dec!(16));
    }

    #[test]
    fn view_month_navigation_and_schedule() {
        let store = SnapshotStore::new();
        let mut view = new_view();
        view.apply_snapshot(store.publish(&snapshot_with_hours(8)));

        assert_eq!(view.shift_month(-1), ym("2024-02"));
        assert_eq!(view.report().summary.total_hours, Decimal::ZERO);
        assert_eq!(view.shift_month(1), ym("2024-03"));
        assert_eq!(view.report().summary.total_hours, dec!(8));

        assert_eq!(view.schedule().total_hours, dec!(8));
        view.select_date(d("2024-03-16"));
        assert!(view.schedule().employees[0].is_default);
        assert_eq!(view.schedule().total_hours, dec!(9));

        assert_eq!(view.dashboard().employee_count, 1);
    }

    #[tokio::test]
    async fn live_view_follows_pushes_until_stopped() {
        let store = SnapshotStore::new();
        store.publish(&snapshot_with_hours(8));

        let (live, handle) = LiveView::spawn(&store, new_view());
        assert_eq!(live.with_view(|v| v.revision()).unwrap(), 1);

        store.publish(&snapshot_with_hours(110));
        timeout(Duration::from_secs(5), async {
            while live.with_view(|v| v.revision()).unwrap() < 2 {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("live view never saw revision 2");

        let salary = live
            .with_view(|v| v.report().summary.total_calculated_salary)
            .unwrap();
        assert_eq!(salary, dec!(11000));

        assert!(live.is_live());
        live.stop();
        assert!(!live.is_live());
        timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();

        store.publish(&snapshot_with_hours(220));
        sleep(Duration::from_millis(20)).await;
        assert_eq!(live.with_view(|v| v.revision()).unwrap(), 2);
    }

    #[tokio::test]
    async fn live_view_stops_when_store_is_dropped() {
        let store = SnapshotStore::new();
        let (live, handle) = LiveView::spawn(&store, new_view());
        assert!(live.is_live());

        drop(store);
        timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        assert!(!live.is_live());
    }
}
