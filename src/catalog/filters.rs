//! Catalog search: turns optional query parameters into SQL predicates.
//!
//! Every parameter maps to one independent predicate and predicates are
//! intersected, so supplying a parameter can only narrow a result set.
//! Missing, empty or unparseable numeric parameters add nothing.

use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::{Supplier, Venue};

/// Service area used by suppliers that work everywhere
pub const NATIONWIDE: &str = "כל הארץ";

/// Raw search parameters as they arrive on the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub region: Option<String>,
    pub venue_type: Option<String>,
    pub style: Option<String>,
    pub guests: Option<String>,
    pub budget: Option<String>,
    pub supplier_type: Option<String>,
    /// Echoed back to the results page; does not filter
    pub event_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    North,
    Center,
    Sharon,
    Jerusalem,
    South,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::North,
        Region::Center,
        Region::Sharon,
        Region::Jerusalem,
        Region::South,
    ];

    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "north" | "צפון" => Some(Self::North),
            "center" | "centre" | "מרכז" => Some(Self::Center),
            "sharon" | "שרון" | "השרון" => Some(Self::Sharon),
            "jerusalem" | "ירושלים" | "אזור ירושלים" => Some(Self::Jerusalem),
            "south" | "דרום" => Some(Self::South),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::North => "north",
            Self::Center => "center",
            Self::Sharon => "sharon",
            Self::Jerusalem => "jerusalem",
            Self::South => "south",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::North => "צפון",
            Self::Center => "מרכז",
            Self::Sharon => "שרון",
            Self::Jerusalem => "ירושלים והסביבה",
            Self::South => "דרום",
        }
    }

    pub fn cities(&self) -> &'static [&'static str] {
        match self {
            Self::North => &[
                "חיפה", "קריות", "עכו", "נהריה", "טבריה", "צפת", "כרמיאל", "עפולה", "נצרת",
                "זכרון יעקב", "קיבוץ יגור", "צפון",
            ],
            Self::Center => &[
                "תל אביב", "יפו", "רמת גן", "גבעתיים", "חולון", "בת ים", "ראשון לציון",
                "פתח תקווה", "רחובות", "נס ציונה", "מודיעין", "לוד", "רמלה", "סביון", "גדרה",
                "מרכז",
            ],
            Self::Sharon => &[
                "הרצליה", "רעננה", "כפר סבא", "נתניה", "הוד השרון", "משמר השרון", "יקום",
                "מושב בצרה", "קיסריה", "חדרה", "קיבוץ געש",
            ],
            Self::Jerusalem => &["ירושלים", "בית שמש", "מבשרת ציון"],
            Self::South => &[
                "באר שבע", "אשדוד", "אשקלון", "אילת", "אופקים", "דימונה", "מצפה רמון",
                "קריית גת", "דרום",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetTier {
    Low,
    Medium,
    High,
    Premium,
}

impl BudgetTier {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "economy" => Some(Self::Low),
            "medium" | "mid" => Some(Self::Medium),
            "high" => Some(Self::High),
            "premium" | "luxury" | "unlimited" => Some(Self::Premium),
            _ => None,
        }
    }

    /// Highest acceptable price; `None` means no ceiling
    pub fn max_price(&self) -> Option<i64> {
        match self {
            Self::Low => Some(300),
            Self::Medium => Some(450),
            Self::High => Some(800),
            Self::Premium => None,
        }
    }
}

/// One narrowing condition on a catalog table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    CityIn(&'static [&'static str]),
    CityEquals(String),
    StyleIn(&'static [&'static str]),
    StyleContains(String),
    MinCapacity(i64),
    MaxPrice(i64),
    SupplierType(String),
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn region_predicate(raw: &str) -> Predicate {
    match Region::parse(raw) {
        Some(region) => Predicate::CityIn(region.cities()),
        // Unknown regions are matched literally so they can only narrow
        None => Predicate::CityEquals(raw.to_string()),
    }
}

fn venue_type_predicate(raw: &str) -> Predicate {
    match raw.to_lowercase().as_str() {
        "hall" | "אולם" => Predicate::StyleIn(&["Luxury", "Modern"]),
        "garden" | "wedding" | "גן" => Predicate::StyleIn(&["Garden", "Boho"]),
        "pool" | "villa" | "וילה" => Predicate::StyleIn(&["Villa"]),
        "barn" | "rustic" => Predicate::StyleIn(&["Rustic"]),
        other => Predicate::StyleContains(other.to_string()),
    }
}

fn budget_predicate(raw: &str) -> Option<Predicate> {
    if let Some(tier) = BudgetTier::parse(raw) {
        return tier.max_price().map(Predicate::MaxPrice);
    }
    raw.parse::<i64>()
        .ok()
        .filter(|max| *max > 0)
        .map(Predicate::MaxPrice)
}

/// Predicates applied to the venues table
pub fn venue_predicates(params: &SearchParams) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    if let Some(region) = present(&params.region) {
        predicates.push(region_predicate(region));
    }
    if let Some(venue_type) = present(&params.venue_type) {
        predicates.push(venue_type_predicate(venue_type));
    }
    if let Some(style) = present(&params.style) {
        predicates.push(Predicate::StyleContains(style.to_lowercase()));
    }
    if let Some(guests) = present(&params.guests) {
        if let Some(min) = guests.parse::<i64>().ok().filter(|g| *g > 0) {
            predicates.push(Predicate::MinCapacity(min));
        }
    }
    if let Some(budget) = present(&params.budget) {
        predicates.extend(budget_predicate(budget));
    }

    predicates
}

/// Predicates applied to the suppliers table
pub fn supplier_predicates(params: &SearchParams) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    if let Some(region) = present(&params.region) {
        predicates.push(region_predicate(region));
    }
    if let Some(supplier_type) = present(&params.supplier_type) {
        predicates.push(Predicate::SupplierType(supplier_type.to_string()));
    }

    predicates
}

fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_city_list(qb: &mut QueryBuilder<'_, Sqlite>, cities: &[&str], nationwide: bool) {
    qb.push("(city IN (");
    let mut separated = qb.separated(", ");
    for city in cities {
        separated.push_bind(city.to_string());
    }
    qb.push(")");
    if nationwide {
        qb.push(" OR city = ");
        qb.push_bind(NATIONWIDE);
    }
    qb.push(")");
}

/// Append `AND <predicate>` for every predicate.
/// `nationwide` lets rows in the nationwide service area satisfy region predicates.
pub fn push_predicates(qb: &mut QueryBuilder<'_, Sqlite>, predicates: &[Predicate], nationwide: bool) {
    for predicate in predicates {
        qb.push(" AND ");
        match predicate {
            Predicate::CityIn(cities) => push_city_list(qb, cities, nationwide),
            Predicate::CityEquals(city) => push_city_list(qb, &[city.as_str()], nationwide),
            Predicate::StyleIn(styles) => {
                qb.push("style IN (");
                let mut separated = qb.separated(", ");
                for style in styles.iter() {
                    separated.push_bind(*style);
                }
                qb.push(")");
            }
            Predicate::StyleContains(needle) => {
                qb.push("LOWER(style) LIKE ");
                qb.push_bind(like_pattern(&needle.to_lowercase()));
                qb.push(" ESCAPE '\\'");
            }
            Predicate::MinCapacity(min) => {
                qb.push("capacity >= ");
                qb.push_bind(*min);
            }
            Predicate::MaxPrice(max) => {
                qb.push("price <= ");
                qb.push_bind(*max);
            }
            Predicate::SupplierType(supplier_type) => {
                qb.push("supplier_type = ");
                qb.push_bind(supplier_type.clone());
            }
        }
    }
}

/// Venues matching every supplied parameter, in insertion order
pub async fn search_venues(pool: &SqlitePool, params: &SearchParams) -> Result<Vec<Venue>, sqlx::Error> {
    let predicates = venue_predicates(params);
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM venues WHERE 1 = 1");
    push_predicates(&mut qb, &predicates, false);
    qb.push(" ORDER BY rowid");

    qb.build_query_as::<Venue>().fetch_all(pool).await
}

/// Suppliers matching the region and type parameters, in insertion order
pub async fn search_suppliers(
    pool: &SqlitePool,
    params: &SearchParams,
) -> Result<Vec<Supplier>, sqlx::Error> {
    let predicates = supplier_predicates(params);
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM suppliers WHERE 1 = 1");
    push_predicates(&mut qb, &predicates, true);
    qb.push(" ORDER BY rowid");

    qb.build_query_as::<Supplier>().fetch_all(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use std::collections::HashSet;

    fn params(pairs: &[(&str, &str)]) -> SearchParams {
        let mut p = SearchParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "region" => p.region = value,
                "venue_type" => p.venue_type = value,
                "style" => p.style = value,
                "guests" => p.guests = value,
                "budget" => p.budget = value,
                "supplier_type" => p.supplier_type = value,
                _ => panic!("unknown key {}", key),
            }
        }
        p
    }

    async fn seeded_pool() -> SqlitePool {
        let pool = db::init_in_memory().await.unwrap();
        let venues = [
            ("אולם הוד", "תל אביב", "Luxury", 280, 450),
            ("לופט קונספט", "תל אביב", "Modern", 450, 200),
            ("גן המלך", "רעננה", "Garden", 450, 500),
            ("וילה לבנה", "הרצליה", "Villa", 8000, 130),
            ("אולם כרמל", "חיפה", "Luxury", 300, 550),
            ("אסם יקום", "יקום", "Rustic", 3000, 70),
            ("אולם אילת", "אילת", "Modern", 400, 350),
        ];
        for (name, city, style, price, capacity) in venues {
            sqlx::query(
                "INSERT INTO venues (id, name, city, style, price, capacity) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(name)
            .bind(city)
            .bind(style)
            .bind(price)
            .bind(capacity)
            .execute(&pool)
            .await
            .unwrap();
        }

        let suppliers = [
            ("DJ Ronen", "DJ", "תל אביב"),
            ("DJ Sky", "DJ", "אילת"),
            ("תזמורת הלב", "Orchestra", NATIONWIDE),
            ("קייטרינג השף", "Catering", "נתניה"),
        ];
        for (name, supplier_type, city) in suppliers {
            sqlx::query("INSERT INTO suppliers (id, name, supplier_type, city) VALUES (?, ?, ?, ?)")
                .bind(uuid::Uuid::new_v4().to_string())
                .bind(name)
                .bind(supplier_type)
                .bind(city)
                .execute(&pool)
                .await
                .unwrap();
        }
        pool
    }

    fn names(venues: &[Venue]) -> HashSet<String> {
        venues.iter().map(|v| v.name.clone()).collect()
    }

    #[test]
    fn test_absent_and_empty_parameters_add_no_predicates() {
        assert!(venue_predicates(&SearchParams::default()).is_empty());
        assert!(venue_predicates(&params(&[("region", "  "), ("style", "")])).is_empty());
        assert!(supplier_predicates(&params(&[("supplier_type", "")])).is_empty());
    }

    #[test]
    fn test_unparseable_numbers_are_ignored() {
        let predicates = venue_predicates(&params(&[("guests", "lots"), ("budget", "cheap")]));
        assert!(predicates.is_empty());

        let predicates = venue_predicates(&params(&[("guests", "-5"), ("budget", "0")]));
        assert!(predicates.is_empty());
    }

    #[test]
    fn test_region_codes_map_to_city_lists() {
        let predicates = venue_predicates(&params(&[("region", "מרכז")]));
        assert_eq!(predicates, vec![Predicate::CityIn(Region::Center.cities())]);

        let predicates = venue_predicates(&params(&[("region", "atlantis")]));
        assert_eq!(predicates, vec![Predicate::CityEquals("atlantis".to_string())]);
    }

    #[test]
    fn test_budget_tiers() {
        assert_eq!(
            venue_predicates(&params(&[("budget", "medium")])),
            vec![Predicate::MaxPrice(450)]
        );
        assert!(venue_predicates(&params(&[("budget", "premium")])).is_empty());
        assert_eq!(
            venue_predicates(&params(&[("budget", "5000")])),
            vec![Predicate::MaxPrice(5000)]
        );
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[tokio::test]
    async fn test_region_filter() {
        let pool = seeded_pool().await;
        let venues = search_venues(&pool, &params(&[("region", "center")])).await.unwrap();
        assert_eq!(
            names(&venues),
            HashSet::from(["אולם הוד".to_string(), "לופט קונספט".to_string()])
        );
    }

    #[tokio::test]
    async fn test_venue_type_and_capacity() {
        let pool = seeded_pool().await;
        let venues = search_venues(&pool, &params(&[("venue_type", "hall"), ("guests", "400")]))
            .await
            .unwrap();
        assert_eq!(
            names(&venues),
            HashSet::from(["אולם הוד".to_string(), "אולם כרמל".to_string()])
        );
    }

    #[tokio::test]
    async fn test_style_is_case_insensitive_substring() {
        let pool = seeded_pool().await;
        let venues = search_venues(&pool, &params(&[("style", "MOD")])).await.unwrap();
        assert_eq!(venues.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_region_with_huge_guest_count_is_empty() {
        let pool = seeded_pool().await;
        let venues = search_venues(&pool, &params(&[("region", "nonexistent"), ("guests", "99999")]))
            .await
            .unwrap();
        assert!(venues.is_empty());
    }

    #[tokio::test]
    async fn test_parameters_never_expand_results() {
        let pool = seeded_pool().await;
        let all = names(&search_venues(&pool, &SearchParams::default()).await.unwrap());
        assert_eq!(all.len(), 7);

        let steps: [(&str, &str); 5] = [
            ("region", "sharon"),
            ("venue_type", "garden"),
            ("guests", "100"),
            ("budget", "high"),
            ("style", "gar"),
        ];

        let mut previous = all;
        for i in 1..=steps.len() {
            let current = names(&search_venues(&pool, &params(&steps[..i])).await.unwrap());
            assert!(current.is_subset(&previous), "step {} widened the result", i);
            previous = current;
        }
        assert_eq!(previous, HashSet::from(["גן המלך".to_string()]));
    }

    #[tokio::test]
    async fn test_nationwide_suppliers_match_any_region() {
        let pool = seeded_pool().await;

        let suppliers = search_suppliers(&pool, &params(&[("region", "south")])).await.unwrap();
        let found: HashSet<String> = suppliers.into_iter().map(|s| s.name).collect();
        assert_eq!(
            found,
            HashSet::from(["DJ Sky".to_string(), "תזמורת הלב".to_string()])
        );

        let suppliers = search_suppliers(&pool, &params(&[("region", "south"), ("supplier_type", "DJ")]))
            .await
            .unwrap();
        assert_eq!(suppliers.len(), 1);
    }
}
