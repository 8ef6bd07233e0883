//! Deterministic demo dataset for seeding and local development.

use chrono::{Duration, Utc};

use venuefit_core::domain::{
    Client, ClientId, Outfit, Shift, Snapshot, Transaction, Venue, VenueId,
};

fn client(id: &str, name: &str, value_score: f64, tags: &[&str], notes: &str) -> Client {
    Client {
        id: Some(ClientId(id.to_owned())),
        name: name.to_owned(),
        tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
        value_score,
        notes: Some(notes.to_owned()),
        ..Client::default()
    }
}

fn venue(id: &str, name: &str, city: &str, capacity: f64, tags: &[&str]) -> Venue {
    Venue {
        id: Some(VenueId(id.to_owned())),
        name: name.to_owned(),
        city: Some(city.to_owned()),
        capacity,
        tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
        ..Venue::default()
    }
}

fn shift(
    id: &str,
    client_id: Option<&str>,
    venue_id: &str,
    days_ago: i64,
    earnings: f64,
    notes: Option<&str>,
) -> Shift {
    let start = Utc::now() - Duration::days(days_ago);
    Shift {
        id: Some(id.to_owned()),
        client_id: client_id.map(|cid| ClientId(cid.to_owned())),
        venue_id: Some(VenueId(venue_id.to_owned())),
        start: Some(start),
        end: Some(start + Duration::hours(5)),
        earnings,
        notes: notes.map(str::to_owned),
    }
}

/// A small but representative dataset: three clients, three venues,
/// and a spread of recent shifts so the scoring window has history.
pub fn demo_snapshot() -> Snapshot {
    Snapshot {
        clients: vec![
            client("c1", "Alex", 8.0, &["VIP"], "Prefers Gold Room."),
            client("c2", "Jamie", 6.0, &["Regular"], "Weekend only."),
            client("c3", "Morgan", 9.0, &["VIP", "High Spender"], "Books private events."),
        ],
        venues: vec![
            venue("v1", "Velvet Lounge", "Downtown", 150.0, &["Regular"]),
            venue("v2", "Gold Room", "Midtown", 200.0, &["VIP"]),
            venue("v3", "Neon Palace", "Uptown", 120.0, &["Regular", "Late Night"]),
        ],
        shifts: vec![
            shift("s1", Some("c1"), "v2", 3, 850.0, Some("Busy crowd, high tips.")),
            shift("s2", Some("c2"), "v1", 5, 610.0, Some("VIP group.")),
            shift("s3", Some("c2"), "v3", 9, 470.0, Some("Slow start, picked up.")),
            shift("s4", Some("c1"), "v2", 10, 920.0, Some("Event night.")),
            shift("s5", Some("c3"), "v2", 12, 780.0, None),
            shift("s6", None, "v3", 15, 390.0, None),
        ],
        outfits: vec![
            Outfit {
                id: Some("o1".to_owned()),
                name: "Pink Diamond".to_owned(),
                notes: None,
            },
            Outfit {
                id: Some("o2".to_owned()),
                name: "Midnight Velvet".to_owned(),
                notes: Some("Crowd favorite.".to_owned()),
            },
        ],
        transactions: vec![
            Transaction {
                id: Some("t1".to_owned()),
                client_id: Some(ClientId("c1".to_owned())),
                date: Some(Utc::now() - Duration::days(3)),
                amount: 450.0,
                kind: Some("income".to_owned()),
                notes: Some("Tips".to_owned()),
            },
            Transaction {
                id: Some("t2".to_owned()),
                client_id: None,
                date: Some(Utc::now() - Duration::days(4)),
                amount: 80.0,
                kind: Some("expense".to_owned()),
                notes: Some("Transport".to_owned()),
            },
        ],
        events: Vec::new(),
    }
}
