//! Built-in city catalog used for autocomplete and for validating manually
//! added cities.

/// A catalog entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    pub name: &'static str,
    pub country: &'static str,
    pub lat: f64,
    pub lon: f64,
}

pub const CITY_LIST: &[City] = &[
    City { name: "Moscow", country: "Russia", lat: 55.7558, lon: 37.6176 },
    City { name: "Saint Petersburg", country: "Russia", lat: 59.9311, lon: 30.3609 },
    City { name: "Kazan", country: "Russia", lat: 55.7963, lon: 49.1088 },
    City { name: "Sochi", country: "Russia", lat: 43.6028, lon: 39.7342 },
    City { name: "Novosibirsk", country: "Russia", lat: 55.0084, lon: 82.9357 },
    City { name: "London", country: "United Kingdom", lat: 51.5074, lon: -0.1278 },
    City { name: "Berlin", country: "Germany", lat: 52.52, lon: 13.405 },
    City { name: "Paris", country: "France", lat: 48.8566, lon: 2.3522 },
    City { name: "New York", country: "USA", lat: 40.7128, lon: -74.006 },
    City { name: "Tokyo", country: "Japan", lat: 35.6895, lon: 139.6917 },
];

/// Case-insensitive prefix match on the city name, in catalog order.
/// An empty prefix yields nothing.
pub fn suggest(prefix: &str, limit: usize) -> Vec<&'static City> {
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        return Vec::new();
    }

    CITY_LIST
        .iter()
        .filter(|c| c.name.to_lowercase().starts_with(&prefix))
        .take(limit)
        .collect()
}

/// Exact case-insensitive lookup. Accepts "Name" or "Name, Country".
pub fn find(query: &str) -> Option<&'static City> {
    let (name, country) = match query.split_once(',') {
        Some((name, country)) => (name.trim(), Some(country.trim())),
        None => (query.trim(), None),
    };

    CITY_LIST.iter().find(|c| {
        c.name.eq_ignore_ascii_case(name)
            && country.map_or(true, |country| c.country.eq_ignore_ascii_case(country))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_prefix_case_insensitive() {
        let names: Vec<_> = suggest("s", 10).iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Saint Petersburg", "Sochi"]);
        assert_eq!(suggest("LON", 10)[0].name, "London");
    }

    #[test]
    fn test_suggest_respects_limit_and_empty_prefix() {
        assert_eq!(suggest("s", 1).len(), 1);
        assert!(suggest("   ", 5).is_empty());
        assert!(suggest("zzz", 5).is_empty());
    }

    #[test]
    fn test_find_by_name_and_country() {
        assert_eq!(find("tokyo").map(|c| c.country), Some("Japan"));
        assert_eq!(find("new york, usa").map(|c| c.name), Some("New York"));
        assert!(find("Paris, Germany").is_none());
        assert!(find("Atlantis").is_none());
    }
}
