//! End-to-end engine runs over the in-memory and SQLite stores.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use venuefit_core::domain::{
    Client, ClientId, CloudEvent, Shift, Snapshot, Venue, VenueId,
};
use venuefit_core::insights::{InsightsEngine, QueryOptions, WeightsOverride};
use venuefit_core::merge::SnapshotService;
use venuefit_core::stores::{CloudFetcher, FetchError};
use venuefit_db::migrations::run_pending;
use venuefit_db::{connect_in_memory, demo_snapshot, InMemoryDataStore, SqlDataStore};

struct NoCloud;

#[async_trait]
impl CloudFetcher for NoCloud {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        Err(FetchError::NotConfigured)
    }
}

struct FixedCloud(Snapshot);

#[async_trait]
impl CloudFetcher for FixedCloud {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        Ok(self.0.clone())
    }
}

fn vip_scenario() -> Snapshot {
    let now = Utc::now();
    let shift = |days_ago: i64, earnings: f64| Shift {
        client_id: Some(ClientId("c-alex".to_owned())),
        venue_id: Some(VenueId("v-gold".to_owned())),
        start: Some(now - Duration::days(days_ago)),
        earnings,
        ..Shift::default()
    };
    Snapshot {
        clients: vec![Client {
            id: Some(ClientId("c-alex".to_owned())),
            name: "Alex".to_owned(),
            tags: vec!["VIP".to_owned()],
            value_score: 9.0,
            ..Client::default()
        }],
        venues: vec![Venue {
            id: Some(VenueId("v-gold".to_owned())),
            name: "Gold Room".to_owned(),
            capacity: 200.0,
            tags: vec!["VIP".to_owned()],
            ..Venue::default()
        }],
        shifts: vec![shift(3, 600.0), shift(10, 600.0), shift(17, 600.0)],
        ..Snapshot::default()
    }
}

fn engine_over(snapshot: Snapshot) -> InsightsEngine {
    let store = Arc::new(InMemoryDataStore::new(snapshot));
    let service = SnapshotService::new(store.clone(), Arc::new(NoCloud));
    InsightsEngine::new(service, store)
}

#[tokio::test]
async fn vip_client_gets_a_strongly_rationalized_recommendation() {
    let engine = engine_over(vip_scenario());

    let assignments =
        engine.generate_client_assignments(120, 3).await.expect("assignments");
    assert_eq!(assignments.len(), 1);

    let recs = &assignments[0].recommendations;
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].venue.name, "Gold Room");
    assert!(recs[0].compatibility.score > 0.0);
    assert!(recs[0]
        .compatibility
        .rationale
        .contains(&"Strong personal earnings at Gold Room".to_owned()));
    assert!(recs[0].compatibility.rationale.contains(&"Tag relevance matched".to_owned()));
}

#[tokio::test]
async fn assignments_rank_clients_by_best_score() {
    let now = Utc::now();
    let snapshot = Snapshot {
        clients: vec![
            Client {
                id: Some(ClientId("c-cold".to_owned())),
                name: "Cold".to_owned(),
                ..Client::default()
            },
            Client {
                id: Some(ClientId("c-hot".to_owned())),
                name: "Hot".to_owned(),
                ..Client::default()
            },
        ],
        venues: vec![Venue {
            id: Some(VenueId("v1".to_owned())),
            name: "Velvet Lounge".to_owned(),
            ..Venue::default()
        }],
        shifts: vec![Shift {
            client_id: Some(ClientId("c-hot".to_owned())),
            venue_id: Some(VenueId("v1".to_owned())),
            start: Some(now - Duration::days(2)),
            earnings: 500.0,
            ..Shift::default()
        }],
        ..Snapshot::default()
    };
    let engine = engine_over(snapshot);

    let assignments =
        engine.generate_client_assignments(120, 3).await.expect("assignments");
    assert_eq!(assignments[0].client.name, "Hot");
    assert_eq!(assignments[1].client.name, "Cold");
    assert!(assignments[0].best_score() > assignments[1].best_score());
}

#[tokio::test]
async fn equal_scores_keep_snapshot_venue_order() {
    let venue = |id: &str, name: &str| Venue {
        id: Some(VenueId(id.to_owned())),
        name: name.to_owned(),
        ..Venue::default()
    };
    // No shifts and no tags: every signal is zero for both venues.
    let snapshot = |first: Venue, second: Venue| Snapshot {
        clients: vec![Client {
            id: Some(ClientId("c1".to_owned())),
            name: "Alex".to_owned(),
            ..Client::default()
        }],
        venues: vec![first, second],
        ..Snapshot::default()
    };

    let engine = engine_over(snapshot(venue("v-a", "Alpha Room"), venue("v-b", "Bravo Room")));
    let assignments = engine.generate_client_assignments(120, 3).await.expect("assignments");
    let recs = &assignments[0].recommendations;
    assert_eq!(recs[0].compatibility.score, recs[1].compatibility.score);
    assert_eq!(recs[0].venue.name, "Alpha Room");
    assert_eq!(recs[1].venue.name, "Bravo Room");

    // Reversing the input reverses the output: ties follow input order.
    let engine = engine_over(snapshot(venue("v-b", "Bravo Room"), venue("v-a", "Alpha Room")));
    let assignments = engine.generate_client_assignments(120, 3).await.expect("assignments");
    let recs = &assignments[0].recommendations;
    assert_eq!(recs[0].venue.name, "Bravo Room");
    assert_eq!(recs[1].venue.name, "Alpha Room");
}

#[tokio::test]
async fn under_booked_vip_yields_a_high_priority_action() {
    let engine = engine_over(Snapshot {
        shifts: Vec::new(),
        ..vip_scenario()
    });

    let actions = engine.generate_action_items(120).await.expect("actions");
    let booking = actions
        .iter()
        .find(|item| item.title.starts_with("Book Alex"))
        .expect("high priority booking action");
    assert!(booking.title.contains("Gold Room"));
}

#[tokio::test]
async fn cloud_events_flow_into_scoring() {
    let local = Arc::new(InMemoryDataStore::new(vip_scenario()));
    let cloud = FixedCloud(Snapshot {
        events: vec![CloudEvent {
            id: Some("e1".to_owned()),
            venue_id: Some(VenueId("v-gold".to_owned())),
            title: Some("Launch party".to_owned()),
            ..CloudEvent::default()
        }],
        ..Snapshot::default()
    });
    let service = SnapshotService::new(local.clone(), Arc::new(cloud));
    let engine = InsightsEngine::new(service, local);

    let assignments =
        engine.generate_client_assignments(120, 3).await.expect("assignments");
    let rec = &assignments[0].recommendations[0];
    assert!(rec
        .compatibility
        .rationale
        .contains(&"Special event impact detected".to_owned()));
}

#[tokio::test]
async fn top_venues_by_earnings_answers_descending() {
    let snapshot = Snapshot {
        venues: vec![
            Venue {
                id: Some(VenueId("v1".to_owned())),
                name: "Velvet Lounge".to_owned(),
                ..Venue::default()
            },
            Venue {
                id: Some(VenueId("v2".to_owned())),
                name: "Gold Room".to_owned(),
                ..Venue::default()
            },
            Venue {
                id: Some(VenueId("v3".to_owned())),
                name: "Neon Palace".to_owned(),
                ..Venue::default()
            },
        ],
        shifts: vec![
            Shift {
                venue_id: Some(VenueId("v1".to_owned())),
                start: Some(Utc::now() - Duration::days(1)),
                earnings: 300.0,
                ..Shift::default()
            },
            Shift {
                venue_id: Some(VenueId("v2".to_owned())),
                start: Some(Utc::now() - Duration::days(1)),
                earnings: 500.0,
                ..Shift::default()
            },
            Shift {
                venue_id: Some(VenueId("v3".to_owned())),
                start: Some(Utc::now() - Duration::days(1)),
                earnings: 100.0,
                ..Shift::default()
            },
        ],
        ..Snapshot::default()
    };
    let engine = engine_over(snapshot);

    let answer = engine
        .answer_query("top 3 venues ranked by earnings", QueryOptions::default())
        .await
        .expect("answer");
    assert_eq!(answer, "Top 3 venues: Gold Room, Velvet Lounge, Neon Palace");
}

#[tokio::test]
async fn underperforming_venues_answer_uses_explicit_threshold() {
    let snapshot = Snapshot {
        venues: vec![
            Venue {
                id: Some(VenueId("v1".to_owned())),
                name: "Velvet Lounge".to_owned(),
                ..Venue::default()
            },
            Venue {
                id: Some(VenueId("v2".to_owned())),
                name: "Gold Room".to_owned(),
                ..Venue::default()
            },
            Venue {
                id: Some(VenueId("v3".to_owned())),
                name: "Neon Palace".to_owned(),
                ..Venue::default()
            },
        ],
        shifts: vec![
            Shift {
                venue_id: Some(VenueId("v1".to_owned())),
                start: Some(Utc::now() - Duration::days(1)),
                earnings: 150.0,
                ..Shift::default()
            },
            Shift {
                venue_id: Some(VenueId("v2".to_owned())),
                start: Some(Utc::now() - Duration::days(1)),
                earnings: 500.0,
                ..Shift::default()
            },
            Shift {
                venue_id: Some(VenueId("v3".to_owned())),
                start: Some(Utc::now() - Duration::days(1)),
                earnings: 50.0,
                ..Shift::default()
            },
        ],
        ..Snapshot::default()
    };
    let engine = engine_over(snapshot);

    let answer = engine
        .answer_query("underperforming venues under $200", QueryOptions::default())
        .await
        .expect("answer");
    assert_eq!(
        answer,
        "Underperforming venues (avg < $200): Neon Palace ($50), Velvet Lounge ($150)"
    );
}

#[tokio::test]
async fn weights_override_changes_the_ranking() {
    let now = Utc::now();
    // v-history has personal history; v-event has an event-flagged shift.
    let snapshot = Snapshot {
        clients: vec![Client {
            id: Some(ClientId("c1".to_owned())),
            name: "Alex".to_owned(),
            ..Client::default()
        }],
        venues: vec![
            Venue {
                id: Some(VenueId("v-history".to_owned())),
                name: "History Hall".to_owned(),
                ..Venue::default()
            },
            Venue {
                id: Some(VenueId("v-event".to_owned())),
                name: "Event House".to_owned(),
                ..Venue::default()
            },
        ],
        shifts: vec![
            Shift {
                client_id: Some(ClientId("c1".to_owned())),
                venue_id: Some(VenueId("v-history".to_owned())),
                start: Some(now - Duration::days(2)),
                earnings: 400.0,
                ..Shift::default()
            },
            Shift {
                venue_id: Some(VenueId("v-event".to_owned())),
                start: Some(now - Duration::days(2)),
                earnings: 100.0,
                notes: Some("private event booking".to_owned()),
                ..Shift::default()
            },
        ],
        ..Snapshot::default()
    };
    let engine = engine_over(snapshot);

    let before = engine.generate_client_assignments(120, 3).await.expect("assignments");
    assert_eq!(before[0].recommendations[0].venue.name, "History Hall");

    engine
        .set_weights(&WeightsOverride {
            history: Some(0.0),
            venue_avg: Some(0.0),
            event: Some(1.0),
            ..WeightsOverride::default()
        })
        .await;

    let after = engine.generate_client_assignments(120, 3).await.expect("assignments");
    assert_eq!(after[0].recommendations[0].venue.name, "Event House");
}

#[tokio::test]
async fn sql_store_drives_the_engine_end_to_end() {
    let pool = connect_in_memory().await.expect("connect");
    run_pending(&pool).await.expect("migrate");

    let store = Arc::new(SqlDataStore::new(pool));
    store.import_snapshot(&demo_snapshot()).await.expect("seed");

    let service = SnapshotService::new(store.clone(), Arc::new(NoCloud));
    let engine = InsightsEngine::new(service, store);

    let insights = engine.build_insights(120, None).await.expect("insights");
    assert_eq!(insights.assignments.len(), 3);
    assert!(!insights.schedule.is_empty());
    assert!(insights
        .assignments
        .iter()
        .all(|row| row.recommendations.len() <= 3));

    let answer = engine
        .answer_query("what should I do tonight", QueryOptions::default())
        .await
        .expect("answer");
    assert!(answer.starts_with("Here's the quick plan:"));
}
