use foundation::math::LngLat;
use foundation::time::Time;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::pin::{PinError, PinLocation};
use crate::store::PinStore;

/// Jitter applied to every pin after a city's first, in degrees per axis.
pub const SEED_JITTER_DEG: f64 = 0.02;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SeedCity {
    pub city_name: &'static str,
    pub country: &'static str,
    pub country_code: &'static str,
    pub lng: f64,
    pub lat: f64,
    pub pins: u32,
}

const fn city(
    city_name: &'static str,
    country: &'static str,
    country_code: &'static str,
    lng: f64,
    lat: f64,
    pins: u32,
) -> SeedCity {
    SeedCity {
        city_name,
        country,
        country_code,
        lng,
        lat,
        pins,
    }
}

/// Demo leaderboard plus a spread of world cities so the globe is never empty.
pub const WORLD_CITIES: &[SeedCity] = &[
    city("Dallas", "United States", "US", -96.7970, 32.7767, 24),
    city("Tokyo", "Japan", "JP", 139.6917, 35.6895, 18),
    city("London", "United Kingdom", "GB", -0.1276, 51.5072, 15),
    city("Paris", "France", "FR", 2.3522, 48.8566, 12),
    city("Sydney", "Australia", "AU", 151.2093, -33.8688, 9),
    city("New York City", "United States", "US", -74.0060, 40.7128, 3),
    city("Los Angeles", "United States", "US", -118.2437, 34.0522, 2),
    city("Miami", "United States", "US", -80.1918, 25.7617, 1),
    city("San Francisco", "United States", "US", -122.4194, 37.7749, 1),
    city("Santiago", "Chile", "CL", -70.6693, -33.4489, 1),
    city("Caracas", "Venezuela", "VE", -66.9036, 10.4806, 1),
    city("Vienna", "Austria", "AT", 16.3738, 48.2082, 1),
    city("Prague", "Czech Republic", "CZ", 14.4378, 50.0755, 1),
    city("Stockholm", "Sweden", "SE", 18.0686, 59.3293, 1),
    city("Copenhagen", "Denmark", "DK", 12.5683, 55.6761, 1),
    city("Cairo", "Egypt", "EG", 31.2357, 30.0444, 2),
    city("Lagos", "Nigeria", "NG", 3.3792, 6.5244, 1),
    city("Johannesburg", "South Africa", "ZA", 28.0473, -26.2041, 1),
    city("Bangkok", "Thailand", "TH", 100.5018, 13.7563, 2),
    city("Singapore", "Singapore", "SG", 103.8198, 1.3521, 2),
    city("Melbourne", "Australia", "AU", 144.9631, -37.8136, 1),
    city("Auckland", "New Zealand", "NZ", 174.7633, -36.8485, 1),
    city("Manila", "Philippines", "PH", 120.9842, 14.5995, 1),
    city("Ho Chi Minh City", "Vietnam", "VN", 106.6297, 10.8231, 1),
    city("Helsinki", "Finland", "FI", 24.9384, 60.1699, 1),
    city("Oslo", "Norway", "NO", 10.7522, 59.9139, 1),
    city("Anchorage", "United States", "US", -149.9003, 61.2181, 1),
    city("Riyadh", "Saudi Arabia", "SA", 46.6753, 24.7136, 1),
    city("Ushuaia", "Argentina", "AR", -68.3029, -54.8019, 1),
    city("Fiji", "Fiji", "FJ", 179.4144, -16.7784, 1),
];

impl SeedCity {
    pub fn location(&self) -> PinLocation {
        PinLocation::new(self.city_name, self.country, LngLat::wrapped(self.lng, self.lat))
            .with_country_code(self.country_code)
    }
}

/// Appends every pin in `cities` to `store`, timestamped at `now`.
///
/// The first pin of a city sits exactly on the city; later ones are jittered
/// so their markers do not stack. Returns the number of pins added.
pub fn seed_store(
    store: &mut PinStore,
    cities: &[SeedCity],
    rng_seed: u64,
    now: Time,
) -> Result<usize, PinError> {
    let mut rng = StdRng::seed_from_u64(rng_seed);
    let mut added = 0usize;
    for seed in cities {
        for n in 0..seed.pins {
            let mut location = seed.location();
            if n > 0 {
                let dlng = rng.gen_range(-SEED_JITTER_DEG..=SEED_JITTER_DEG);
                let dlat = rng.gen_range(-SEED_JITTER_DEG..=SEED_JITTER_DEG);
                location.coordinates = LngLat::wrapped(seed.lng + dlng, seed.lat + dlat);
            }
            added += 1;
            store.seed(location, format!("Visitor {added}"), now)?;
        }
    }
    info!(pins = added, cities = cities.len(), "seeded pin store");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::{SEED_JITTER_DEG, WORLD_CITIES, seed_store};
    use crate::store::PinStore;
    use foundation::time::Time;
    use pretty_assertions::assert_eq;

    #[test]
    fn seeding_is_reproducible() {
        let mut a = PinStore::default();
        let mut b = PinStore::default();
        seed_store(&mut a, WORLD_CITIES, 7, Time::ZERO).unwrap();
        seed_store(&mut b, WORLD_CITIES, 7, Time::ZERO).unwrap();
        assert_eq!(a.pins(), b.pins());
    }

    #[test]
    fn seeded_groups_match_city_counts() {
        let mut store = PinStore::default();
        let added = seed_store(&mut store, WORLD_CITIES, 1, Time::ZERO).unwrap();
        let expected: u32 = WORLD_CITIES.iter().map(|c| c.pins).sum();
        assert_eq!(added, expected as usize);
        assert_eq!(store.group_count(), WORLD_CITIES.len());

        let top = store.top_cities(2);
        assert_eq!(top[0].key.city_name, "Dallas");
        assert_eq!(top[0].visitors_label, "2.4K");
        assert_eq!(top[1].key.city_name, "Tokyo");
    }

    #[test]
    fn jitter_stays_near_city() {
        let mut store = PinStore::default();
        seed_store(&mut store, &WORLD_CITIES[..1], 3, Time::ZERO).unwrap();
        let dallas = WORLD_CITIES[0];
        for pin in store.pins() {
            assert!((pin.coordinates.lng - dallas.lng).abs() <= SEED_JITTER_DEG + 1e-9);
            assert!((pin.coordinates.lat - dallas.lat).abs() <= SEED_JITTER_DEG + 1e-9);
            assert_eq!(pin.total_city_pins, dallas.pins);
        }
    }
}
