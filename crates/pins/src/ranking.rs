use foundation::time::Time;
use serde::Serialize;

use crate::pin::{CityKey, Pin};
use crate::store::CityGroup;

/// One row of the top-cities leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRanking {
    pub rank: usize,
    pub key: CityKey,
    pub country_code: Option<String>,
    pub count: u32,
    /// `count × visitor_scale`; display only.
    pub visitors: u64,
    pub visitors_label: String,
    pub latest: Time,
    pub latest_visitor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentVisitor {
    pub user_name: String,
    pub city_name: String,
    pub country: String,
    pub country_code: Option<String>,
    pub timestamp: Time,
}

impl RecentVisitor {
    pub fn from_pin(pin: &Pin) -> Self {
        Self {
            user_name: pin.user_name.clone(),
            city_name: pin.city_name.clone(),
            country: pin.country.clone(),
            country_code: pin.country_code.clone(),
            timestamp: pin.timestamp,
        }
    }
}

/// Payload of `MetricsUpdated`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinMetrics {
    pub top_cities: Vec<CityRanking>,
    pub recent_visitors: Vec<RecentVisitor>,
}

/// Ranks groups by pin count descending, then most recent pin descending,
/// then key ascending, and keeps the first `n`.
pub fn rank_groups(mut groups: Vec<CityGroup>, n: usize, visitor_scale: u64) -> Vec<CityRanking> {
    groups.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.latest.cmp(&a.latest))
            .then_with(|| a.key.cmp(&b.key))
    });
    groups
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, g)| {
            let visitors = u64::from(g.count).saturating_mul(visitor_scale);
            CityRanking {
                rank: i + 1,
                key: g.key,
                country_code: g.country_code,
                count: g.count,
                visitors,
                visitors_label: format_visitors(visitors),
                latest: g.latest,
                latest_visitor: g.latest_user,
            }
        })
        .collect()
}

/// Compact visitor figure: `950`, `2.4K`, `1.2M`.
pub fn format_visitors(visitors: u64) -> String {
    if visitors < 1_000 {
        return visitors.to_string();
    }
    let thousands = visitors as f64 / 1_000.0;
    // Anything that would round up to "1000.0K" reads as millions.
    if (thousands * 10.0).round() < 10_000.0 {
        format!("{thousands:.1}K")
    } else {
        format!("{:.1}M", visitors as f64 / 1_000_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{format_visitors, rank_groups};
    use crate::pin::{CityKey, PinLocation};
    use crate::store::PinStore;
    use foundation::math::LngLat;
    use foundation::time::Time;
    use pretty_assertions::assert_eq;

    fn seed_city(store: &mut PinStore, city: &str, lng: f64, count: u64, t0: u64) {
        for i in 0..count {
            let loc = PinLocation::new(city, "X", LngLat::wrapped(lng + i as f64 * 0.01, 0.0));
            store.seed(loc, format!("Visitor {i}"), Time(t0 + i)).unwrap();
        }
    }

    #[test]
    fn ties_break_on_most_recent_pin() {
        let mut store = PinStore::default();
        seed_city(&mut store, "CityA", 0.0, 5, 100);
        seed_city(&mut store, "CityB", 40.0, 5, 200);
        seed_city(&mut store, "CityC", 80.0, 2, 300);

        let order: Vec<_> = store
            .top_cities(3)
            .into_iter()
            .map(|r| r.key.city_name)
            .collect();
        assert_eq!(order, vec!["CityB", "CityA", "CityC"]);
    }

    #[test]
    fn ranking_carries_scaled_visitor_count() {
        let mut store = PinStore::default();
        seed_city(&mut store, "Dallas", -96.8, 24, 0);
        let top = store.top_cities(1);
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[0].count, 24);
        assert_eq!(top[0].visitors, 2_400);
        assert_eq!(top[0].visitors_label, "2.4K");
    }

    #[test]
    fn rank_truncates_to_n() {
        let mut store = PinStore::default();
        seed_city(&mut store, "A", 0.0, 1, 0);
        seed_city(&mut store, "B", 50.0, 1, 1);
        let ranked = rank_groups(store.city_groups(), 1, 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].key, CityKey::new("B", "X"));
    }

    #[test]
    fn formats_visitor_labels() {
        assert_eq!(format_visitors(950), "950");
        assert_eq!(format_visitors(1_000), "1.0K");
        assert_eq!(format_visitors(1_500), "1.5K");
        assert_eq!(format_visitors(2_300_000), "2.3M");
    }

    #[test]
    fn labels_roll_over_to_millions_before_a_thousand_k() {
        assert_eq!(format_visitors(999_900), "999.9K");
        assert_eq!(format_visitors(999_950), "1.0M");
        assert_eq!(format_visitors(999_999), "1.0M");
    }

    #[test]
    fn huge_scale_saturates() {
        let mut store = PinStore::default();
        seed_city(&mut store, "A", 0.0, 2, 0);
        let ranked = rank_groups(store.city_groups(), 1, u64::MAX);
        assert_eq!(ranked[0].visitors, u64::MAX);
        assert!(ranked[0].visitors_label.ends_with('M'));
    }
}
