//! Database seeders for built-in data
//!
//! The built-in catalog is a fixed list of Israeli venues and suppliers.
//! Seeding is idempotent: rows are matched by name and only missing ones
//! are inserted, so it is safe to run on every startup.

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::catalog::{ImageCategory, ImageLibrary};

use super::now_rfc3339;

/// (name, city, address, style, is_open_air, price, capacity)
type VenueSeed = (&'static str, &'static str, &'static str, &'static str, bool, i64, i64);

/// (name, supplier_type, subtype, city, price)
type SupplierSeed = (&'static str, &'static str, &'static str, &'static str, i64);

const VENUES: &[VenueSeed] = &[
    // Halls
    ("אולם הוד", "תל אביב", "רחוב דיזנגוף 50", "Luxury_Hall", false, 280, 450),
    ("אולם השרון", "ראשון לציון", "רחוב הרצל 15", "Luxury_Hall", false, 320, 600),
    ("אולם מלכי", "ירושלים", "דרך חברון 12", "Luxury_Hall", false, 350, 750),
    ("אולם כרמל", "חיפה", "רחוב פאנאדי 8", "Luxury_Hall", false, 300, 550),
    ("אולם הרימון", "פתח תקווה", "אבן גבירול 22", "Luxury_Hall", false, 290, 500),
    ("אולם יהלום", "נתניה", "רחוב גרנדציה 5", "Luxury_Hall", false, 310, 480),
    ("אולם אילת", "אילת", "רחוב משה דיין 1", "Modern_Loft", false, 400, 350),
    ("לופט קונספט", "תל אביב", "רחוב פלורנטין 35", "Modern_Loft", false, 450, 200),
    // Gardens
    ("גן הורדים", "קיסריה", "רחוב העתיקות 3", "Garden_Classic", true, 500, 600),
    ("גן המלך", "רעננה", "רחוב הפארק 10", "Garden_Classic", true, 450, 500),
    ("גן הנוער", "ראשון לציון", "כיכר התרבות 2", "Garden_Classic", true, 380, 450),
    ("גן העץ", "רחובות", "רחוב המדע 7", "Garden_Classic", true, 420, 550),
    ("גן הגן", "קיבוץ געש", "דרך החוף 1", "Boho_Nature", true, 350, 400),
    ("גן הטבע", "משמר השרון", "רחוב השדות 6", "Boho_Nature", true, 370, 450),
    // Pool villas
    ("וילת הבריכה", "קיסריה", "רחוב הדרים 5", "Villa_Pool", true, 6000, 120),
    ("וילה בנוף", "סביון", "רחוב הזית 2", "Villa_Pool", true, 7500, 150),
    ("וילת המים", "כפר סבא", "רחוב הגפן 8", "Villa_Pool", true, 5000, 100),
    ("וילה לבנה", "הרצליה", "רחוב הגלים 3", "Villa_Pool", true, 8000, 130),
    ("וילת השקיעה", "אילת", "רחוב הים 4", "Villa_Pool", true, 6500, 110),
    ("בריכת קריסטל", "מושב בצרה", "דרך הגן 1", "Villa_Pool", true, 5500, 95),
    ("וילה בשדה", "קיבוץ יגור", "דרך הכניסה 1", "Rustic_Barn", true, 3500, 80),
    ("אסם יקום", "יקום", "דרך המושב 1", "Rustic_Barn", true, 3000, 70),
];

const SUPPLIERS: &[SupplierSeed] = &[
    // Designers
    ("עיצובים מהלב", "Designer", "Floral", "תל אביב", 5000),
    ("פרחי ירושלים", "Designer", "Floral", "ירושלים", 4500),
    ("סטייל ועיצוב", "Designer", "Table", "חיפה", 6000),
    ("עיצוב אירועים יוקרתי", "Designer", "Floral", "הרצליה", 8000),
    ("מג'יק טאץ'", "Designer", "Table", "ראשון לציון", 5500),
    ("פרחים וצבעים", "Designer", "Floral", "באר שבע", 4000),
    ("עיצוב שולחנות בוטיק", "Designer", "Table", "רעננה", 4500),
    ("עיצוב חופות", "Designer", "Floral", "נתניה", 3500),
    ("וינטג' סטייל", "Designer", "Table", "יפו", 5500),
    // Orchestras
    ("תזמורת הלב", "Orchestra", "Live", "כל הארץ", 12000),
    ("צלילי המזרח", "Orchestra", "Live", "באר שבע", 10000),
    ("הלהקה החיה", "Orchestra", "Live", "תל אביב", 15000),
    ("סימפוניה", "Orchestra", "Live", "ירושלים", 13000),
    ("מקצב הלב", "Orchestra", "Live", "חיפה", 11000),
    // DJs
    ("DJ Ronen", "DJ", "Party", "תל אביב", 4000),
    ("DJ Galit", "DJ", "Wedding", "הרצליה", 4500),
    ("DJ BeatMaster", "DJ", "Party", "ראשון לציון", 3500),
    ("DJ Party", "DJ", "Party", "חיפה", 3000),
    ("DJ Sky", "DJ", "Party", "אילת", 5000),
    ("DJ Melody", "DJ", "Wedding", "ירושלים", 4200),
    ("DJ Groove", "DJ", "Party", "רמת גן", 4000),
    ("DJ Wedding", "DJ", "Wedding", "פתח תקווה", 3900),
    ("DJ Soul", "DJ", "Wedding", "יפו", 4300),
    // Catering, meat
    ("קייטרינג השף", "Catering", "Meat_Chef", "נתניה", 250),
    ("בשרים על האש", "Catering", "Meat_Asado", "אשדוד", 200),
    ("קייטרינג גורמה", "Catering", "Meat_Chef", "תל אביב", 350),
    ("שף בוטיק", "Catering", "Meat_Chef", "הרצליה", 400),
    ("אסאדו בטבע", "Catering", "Meat_Asado", "כל הארץ", 300),
    ("בשרים מעושנים", "Catering", "Meat_Asado", "ראשון לציון", 330),
    ("פוד טראק המבורגר", "Catering", "Street_Food", "מרכז", 160),
    // Catering, dairy and neutral
    ("טעמים וריחות", "Catering", "Dairy_Boutique", "פתח תקווה", 220),
    ("מתוקים ומלוחים", "Catering", "Dessert", "רמת גן", 280),
    ("סושי לאירועים", "Catering", "Sushi_Luxury", "תל אביב", 320),
    ("פיצה בטאבון", "Catering", "Street_Food", "כל הארץ", 150),
    ("קייטרינג חלבי", "Catering", "Dairy_Boutique", "ירושלים", 240),
    ("קינוחים ומתוקים", "Catering", "Dessert", "תל אביב", 120),
    ("סושי סטריט", "Catering", "Street_Food", "תל אביב", 180),
    // Photographers
    ("פוקוס צילום", "Photographer", "Moments", "חולון", 8000),
    ("רגעים יפים", "Photographer", "Moments", "רמת גן", 7500),
    ("קליק אחד", "Photographer", "Artistic", "ירושלים", 6500),
    ("עדשה רחבה", "Photographer", "Artistic", "תל אביב", 9000),
    ("זכרונות מתוקים", "Photographer", "Moments", "חיפה", 7000),
    ("פלאש", "Photographer", "Moments", "באר שבע", 6000),
    ("סטודיו אור", "Photographer", "Artistic", "ראשון לציון", 8500),
    ("צילום אמנותי", "Photographer", "Artistic", "הרצליה", 9500),
    ("וידאו וסטילס", "Photographer", "Moments", "פתח תקווה", 7800),
];

/// Rows inserted by a seeding run
#[derive(Debug, Default, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SeedReport {
    pub venues: usize,
    pub suppliers: usize,
}

/// Cuisine label shown for a catering subtype
fn cuisine_for(subtype: &str) -> Option<&'static str> {
    if subtype.starts_with("Meat") {
        Some("בשרי")
    } else if subtype.starts_with("Dairy") {
        Some("חלבי")
    } else if subtype == "Dessert" || subtype.starts_with("Sushi") || subtype == "Street_Food" {
        Some("פרווה")
    } else {
        None
    }
}

async fn existing_names(pool: &SqlitePool, table: &str) -> Result<HashSet<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(&format!("SELECT name FROM {}", table))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Insert the built-in venues that are not in the catalog yet
pub async fn seed_venues(pool: &SqlitePool, images: &ImageLibrary) -> Result<usize> {
    let existing = existing_names(pool, "venues").await?;
    let now = now_rfc3339();
    let mut inserted = 0;

    let mut tx = pool.begin().await?;
    for (index, (name, city, address, style, is_open_air, price, capacity)) in VENUES.iter().enumerate() {
        if existing.contains(*name) {
            continue;
        }

        // Images rotate over the full list so a given venue always gets the same picture
        let image_url = images.image_at(ImageCategory::for_venue_style(style), index);
        let base_style = style.split('_').next().unwrap_or(*style);

        sqlx::query(
            r#"
            INSERT INTO venues (id, name, city, address, style, is_open_air, price, phone, capacity, image_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(name)
        .bind(city)
        .bind(address)
        .bind(base_style)
        .bind(is_open_air)
        .bind(price)
        .bind(format!("03-{:07}", 5_550_000 + index))
        .bind(capacity)
        .bind(&image_url)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to seed venue {}", name))?;
        inserted += 1;
    }
    tx.commit().await?;

    info!(inserted, total = VENUES.len(), "Seeded venues");
    Ok(inserted)
}

/// Insert the built-in suppliers that are not in the catalog yet
pub async fn seed_suppliers(pool: &SqlitePool, images: &ImageLibrary) -> Result<usize> {
    let existing = existing_names(pool, "suppliers").await?;
    let now = now_rfc3339();
    let mut rotation: HashMap<ImageCategory, usize> = HashMap::new();
    let mut inserted = 0;

    let mut tx = pool.begin().await?;
    for (index, (name, supplier_type, subtype, city, price)) in SUPPLIERS.iter().enumerate() {
        let category = ImageCategory::for_supplier(supplier_type, Some(*subtype));
        let image_url = category.and_then(|category| {
            let next = rotation.entry(category).or_insert(0);
            let url = images.image_at(category, *next);
            *next += 1;
            url
        });

        if existing.contains(*name) {
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, supplier_type, subtype, city, phone, price, cuisine_type, image_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(name)
        .bind(supplier_type)
        .bind(subtype)
        .bind(city)
        .bind(format!("050-{:07}", 7_770_000 + index))
        .bind(price)
        .bind(if *supplier_type == "Catering" { cuisine_for(subtype) } else { None })
        .bind(&image_url)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to seed supplier {}", name))?;
        inserted += 1;
    }
    tx.commit().await?;

    info!(inserted, total = SUPPLIERS.len(), "Seeded suppliers");
    Ok(inserted)
}

/// Seed the whole built-in catalog
pub async fn seed_catalog(pool: &SqlitePool, images: &ImageLibrary) -> Result<SeedReport> {
    info!("Seeding built-in catalog...");

    Ok(SeedReport {
        venues: seed_venues(pool, images).await?,
        suppliers: seed_suppliers(pool, images).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::db::{Supplier, Venue};

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let pool = db::init_in_memory().await.unwrap();
        let images = ImageLibrary::default();

        let first = seed_catalog(&pool, &images).await.unwrap();
        assert_eq!(first.venues, VENUES.len());
        assert_eq!(first.suppliers, SUPPLIERS.len());

        let second = seed_catalog(&pool, &images).await.unwrap();
        assert_eq!(second, SeedReport::default());

        let (venues,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM venues")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(venues as usize, VENUES.len());
    }

    #[tokio::test]
    async fn test_seeded_rows_use_base_style_and_cuisine() {
        let pool = db::init_in_memory().await.unwrap();
        seed_catalog(&pool, &ImageLibrary::default()).await.unwrap();

        let villa: Venue = sqlx::query_as("SELECT * FROM venues WHERE name = ?")
            .bind("וילת הבריכה")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(villa.style.as_deref(), Some("Villa"));
        assert!(villa.is_open_air);
        assert!(villa.image_url.is_none());

        let dairy: Supplier = sqlx::query_as("SELECT * FROM suppliers WHERE name = ?")
            .bind("קייטרינג חלבי")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(dairy.cuisine_type.as_deref(), Some("חלבי"));

        let dj: Supplier = sqlx::query_as("SELECT * FROM suppliers WHERE name = ?")
            .bind("DJ Sky")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(dj.cuisine_type.is_none());
    }

    #[tokio::test]
    async fn test_seeded_images_rotate_per_category() {
        let dir = tempfile::tempdir().unwrap();
        let dj = dir.path().join("dj");
        std::fs::create_dir_all(&dj).unwrap();
        std::fs::write(dj.join("a.jpg"), b"x").unwrap();
        std::fs::write(dj.join("b.jpg"), b"x").unwrap();
        let images = ImageLibrary::scan(dir.path());

        let pool = db::init_in_memory().await.unwrap();
        seed_suppliers(&pool, &images).await.unwrap();

        let urls: Vec<(Option<String>,)> = sqlx::query_as(
            "SELECT image_url FROM suppliers WHERE supplier_type = 'DJ' ORDER BY rowid",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(urls[0].0.as_deref(), Some("/static/images/dj/a.jpg"));
        assert_eq!(urls[1].0.as_deref(), Some("/static/images/dj/b.jpg"));
        assert_eq!(urls[2].0.as_deref(), Some("/static/images/dj/a.jpg"));
    }
}
