#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
    use festival_scraper::domain::{ObservedTicket, TicketKey, TicketObservation};
    use festival_scraper::reconcile::reconcile_pass;
    use festival_scraper::storage::{InMemoryStorage, Storage};

    fn event_start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 8, 16)
            .unwrap()
            .and_hms_opt(19, 30, 0)
            .unwrap()
    }

    fn observed(price: i64, available: bool) -> ObservedTicket {
        ObservedTicket {
            event_title: "E".to_string(),
            event_starting_time: event_start(),
            observation: TicketObservation { price, available },
        }
    }

    fn key(price: i64) -> TicketKey {
        TicketKey {
            event_title: "E".to_string(),
            event_starting_time: event_start(),
            price,
        }
    }

    #[tokio::test]
    async fn full_lifecycle_preserves_history_across_runs() {
        let storage = InMemoryStorage::new();
        let n1 = Utc::now();
        let n2 = n1 + Duration::days(1);
        let n3 = n1 + Duration::days(2);

        // Run 1: first-ever observation, available
        reconcile_pass(&storage, &[observed(30, true)], n1)
            .await
            .unwrap();
        let record = storage.lookup_ticket(&key(30)).await.unwrap().unwrap();
        assert_eq!(record.first_check, n1);
        assert_eq!(record.last_check, n1);
        assert_eq!(record.first_sold_out_check, None);

        // Run 2: sold out
        reconcile_pass(&storage, &[observed(30, false)], n2)
            .await
            .unwrap();
        let record = storage.lookup_ticket(&key(30)).await.unwrap().unwrap();
        assert_eq!(record.first_check, n1);
        assert_eq!(record.last_check, n2);
        assert_eq!(record.first_sold_out_check, Some(n2));

        // Run 3: available again; the sold-out timestamp must not clear
        reconcile_pass(&storage, &[observed(30, true)], n3)
            .await
            .unwrap();
        let record = storage.lookup_ticket(&key(30)).await.unwrap().unwrap();
        assert_eq!(record.first_check, n1);
        assert_eq!(record.last_check, n3);
        assert_eq!(record.first_sold_out_check, Some(n2));

        // The key stays unique in the store throughout
        assert_eq!(storage.ticket_count(), 1);
    }

    #[tokio::test]
    async fn repeated_observation_within_one_run_is_idempotent() {
        let storage = InMemoryStorage::new();
        let now = Utc::now();

        // The same observation twice in one pass, with the pass's frozen now
        reconcile_pass(&storage, &[observed(50, true), observed(50, true)], now)
            .await
            .unwrap();

        assert_eq!(storage.ticket_count(), 1);
        let record = storage.lookup_ticket(&key(50)).await.unwrap().unwrap();
        assert_eq!(record.first_check, now);
        assert_eq!(record.last_check, now);
    }

    #[tokio::test]
    async fn first_observation_of_sold_out_ticket() {
        let storage = InMemoryStorage::new();
        let now = Utc::now();

        reconcile_pass(&storage, &[observed(80, false)], now)
            .await
            .unwrap();

        let record = storage.lookup_ticket(&key(80)).await.unwrap().unwrap();
        assert!(!record.available);
        assert_eq!(record.first_sold_out_check, Some(now));
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let storage = InMemoryStorage::new();
        let n1 = Utc::now();
        let n2 = n1 + Duration::days(1);

        reconcile_pass(&storage, &[observed(30, true), observed(50, true)], n1)
            .await
            .unwrap();
        reconcile_pass(&storage, &[observed(30, false)], n2)
            .await
            .unwrap();

        assert_eq!(storage.ticket_count(), 2);
        let sold_out = storage.lookup_ticket(&key(30)).await.unwrap().unwrap();
        assert_eq!(sold_out.first_sold_out_check, Some(n2));
        // Price 50 was not observed in run 2 and keeps its run-1 state
        let untouched = storage.lookup_ticket(&key(50)).await.unwrap().unwrap();
        assert_eq!(untouched.last_check, n1);
        assert_eq!(untouched.first_sold_out_check, None);
    }
}
