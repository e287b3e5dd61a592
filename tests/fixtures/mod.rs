// Test fixtures - reusable test data
// Provides consistent events and instants across the integration tests

#![allow(dead_code)]

use chrono::{DateTime, Local, TimeZone};

use campus_events::models::category::EventCategory;
use campus_events::models::event::Event;

/// Sample instants for testing
pub mod dates {
    use super::*;

    /// June 1, 2025 at midnight
    pub fn june_1_2025() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    /// June 1, 2025 at 09:00, a whole second for timer tests
    pub fn june_1_2025_morning() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }
}

/// Sample events for testing
pub mod events {
    use super::*;

    /// Upcoming seminar on Nov 1, 2025 at 09:00
    pub fn seminar_ai() -> Event {
        Event::builder()
            .id("1")
            .name("Seminar AI Nasional")
            .description("Panel on responsible machine learning")
            .date("2025-11-01")
            .time("09:00")
            .location("Aula Utama")
            .category(EventCategory::Seminar)
            .build()
            .unwrap()
    }

    /// Workshop that finished long ago, stored without a time
    pub fn rust_workshop() -> Event {
        Event::builder()
            .id("2")
            .name("Rust Workshop")
            .description("Ownership, borrowing and lifetimes")
            .date("2020-01-01")
            .location("Lab 2")
            .category(EventCategory::Workshop)
            .build()
            .unwrap()
    }

    /// Event whose date cannot be parsed
    pub fn malformed() -> Event {
        Event::builder()
            .id("broken")
            .name("Broken Record")
            .date("32/13/2025")
            .build()
            .unwrap()
    }

    /// An event starting exactly at `at`
    pub fn starting_at(id: &str, at: DateTime<Local>) -> Event {
        Event::builder()
            .id(id)
            .name(format!("Event {}", id))
            .date(at.format("%Y-%m-%d").to_string())
            .time(at.format("%H:%M:%S").to_string())
            .build()
            .unwrap()
    }

    /// Backend payload using the legacy localized field names
    pub const LEGACY_JSON: &str = r#"{
        "data": {
            "items": [
                {"id": 10, "nama": "Lomba Coding", "tanggal": "2025-07-01", "waktu": "10:00",
                 "lokasi": "Lab 1", "kategori": "lomba", "deskripsi": "Competitive programming"},
                {"id": 11, "nama": "Pelatihan Git", "tanggal": "2025-01-15", "waktu": "",
                 "lokasi": "Ruang 101", "kategori": "pelatihan", "deskripsi": null},
                {"id": 12, "nama": "Bazar Kampus", "tanggal": "2025-08-17",
                 "lokasi": "Lapangan", "kategori": "festival"}
            ],
            "page": 1,
            "total": 3
        }
    }"#;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_events_are_valid() {
        assert!(events::seminar_ai().instant().is_ok());
        assert!(events::rust_workshop().instant().is_ok());
        assert!(events::malformed().instant().is_err());
    }
}
