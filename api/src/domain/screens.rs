//! Screens domain - DB queries and city filtering for screen records
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{Executor, Postgres};
use thiserror::Error;

use super::coordinates::{self, LatLng};
use crate::map::routing::slugify;

/// Cities that count as major markets; everything else is a region
pub const MAJOR_CITIES: [&str; 5] = ["Vilnius", "Kaunas", "Klaipėda", "Šiauliai", "Panevėžys"];

/// City token selecting every screen
pub const ALL_CITIES_TOKEN: &str = "Lietuva";

/// City token selecting screens outside the major cities
pub const REGIONS_TOKEN: &str = "Regionai";

const SCREEN_COLUMNS: &str = "id, name, coordinates, city, district, address, image_url, \
    image_url_back, is_double_sided, is_viaduct, is_video, is_static, is_active, \
    is_last_minute, last_minute_until, display_order, price, created_at";

#[derive(Debug, sqlx::FromRow)]
struct ScreenRow {
    id: i64,
    name: String,
    coordinates: Value,
    city: String,
    district: Option<String>,
    address: Option<String>,
    image_url: Option<String>,
    image_url_back: Option<String>,
    is_double_sided: bool,
    is_viaduct: bool,
    is_video: bool,
    is_static: bool,
    is_active: bool,
    is_last_minute: bool,
    last_minute_until: Option<NaiveDate>,
    display_order: i32,
    price: Option<f64>,
    created_at: DateTime<Utc>,
}

/// A screen with its coordinates already normalized
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screen {
    pub id: i64,
    pub name: String,
    pub coordinates: LatLng,
    pub city: String,
    pub district: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub image_url_back: Option<String>,
    pub is_double_sided: bool,
    pub is_viaduct: bool,
    pub is_video: bool,
    pub is_static: bool,
    pub is_active: bool,
    pub is_last_minute: bool,
    pub last_minute_until: Option<NaiveDate>,
    pub display_order: i32,
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<ScreenRow> for Screen {
    fn from(row: ScreenRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            coordinates: coordinates::normalize(&row.coordinates),
            city: row.city,
            district: row.district,
            address: row.address,
            image_url: row.image_url,
            image_url_back: row.image_url_back,
            is_double_sided: row.is_double_sided,
            is_viaduct: row.is_viaduct,
            is_video: row.is_video,
            is_static: row.is_static,
            is_active: row.is_active,
            is_last_minute: row.is_last_minute,
            last_minute_until: row.last_minute_until,
            display_order: row.display_order,
            price: row.price,
            created_at: row.created_at,
        }
    }
}

impl Screen {
    /// URL slug used in `#<city>/<screen>` deep links
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    /// Whether the last-minute promotion is still running on `today`
    pub fn last_minute_active(&self, today: NaiveDate) -> bool {
        self.is_last_minute && self.last_minute_until.is_none_or(|until| until >= today)
    }
}

// ============================================================================
// City filtering
// ============================================================================

pub fn is_major_city(city: &str) -> bool {
    MAJOR_CITIES.contains(&city)
}

/// Parsed city picker token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityFilter {
    All,
    Regions,
    City(String),
}

impl CityFilter {
    pub fn parse(token: Option<&str>) -> Self {
        match token.map(str::trim) {
            None | Some("") | Some(ALL_CITIES_TOKEN) => CityFilter::All,
            Some(REGIONS_TOKEN) => CityFilter::Regions,
            Some(city) => CityFilter::City(city.to_string()),
        }
    }

    pub fn matches(&self, city: &str) -> bool {
        match self {
            CityFilter::All => true,
            CityFilter::Regions => !is_major_city(city),
            CityFilter::City(wanted) => wanted == city,
        }
    }
}

pub fn filter_screens(screens: Vec<Screen>, filter: &CityFilter) -> Vec<Screen> {
    screens
        .into_iter()
        .filter(|screen| filter.matches(&screen.city))
        .collect()
}

// ============================================================================
// Admin form input
// ============================================================================

fn default_true() -> bool {
    true
}

/// Screen fields as submitted by the admin form
#[derive(Debug, Clone, Deserialize)]
pub struct ScreenInput {
    pub name: String,
    /// Any of the raw coordinate shapes
    #[serde(default)]
    pub coordinates: Value,
    pub city: String,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_url_back: Option<String>,
    #[serde(default)]
    pub is_double_sided: bool,
    #[serde(default)]
    pub is_viaduct: bool,
    #[serde(default = "default_true")]
    pub is_video: bool,
    #[serde(default = "default_true")]
    pub is_static: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_last_minute: bool,
    #[serde(default)]
    pub last_minute_until: Option<NaiveDate>,
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ScreenInputError {
    #[error("Screen name is required")]
    MissingName,
    #[error("City is required")]
    MissingCity,
    #[error("Price must be a non-negative number")]
    InvalidPrice,
}

/// Validated form input ready to be written
#[derive(Debug, Clone)]
pub struct ScreenDraft {
    pub name: String,
    pub coordinates: LatLng,
    pub city: String,
    pub district: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub image_url_back: Option<String>,
    pub is_double_sided: bool,
    pub is_viaduct: bool,
    pub is_video: bool,
    pub is_static: bool,
    pub is_active: bool,
    pub is_last_minute: bool,
    pub last_minute_until: Option<NaiveDate>,
    pub price: Option<f64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ScreenInput {
    pub fn validate(self) -> Result<ScreenDraft, ScreenInputError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ScreenInputError::MissingName);
        }
        let city = self.city.trim().to_string();
        if city.is_empty() {
            return Err(ScreenInputError::MissingCity);
        }
        if self.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
            return Err(ScreenInputError::InvalidPrice);
        }

        // Only double-sided screens keep a second face image
        let image_url_back = if self.is_double_sided {
            non_blank(self.image_url_back)
        } else {
            None
        };

        // Expiry only means something while the promotion is on
        let last_minute_until = if self.is_last_minute {
            self.last_minute_until
        } else {
            None
        };

        Ok(ScreenDraft {
            name,
            coordinates: coordinates::normalize(&self.coordinates),
            city,
            district: non_blank(self.district),
            address: non_blank(self.address),
            image_url: non_blank(self.image_url),
            image_url_back,
            is_double_sided: self.is_double_sided,
            is_viaduct: self.is_viaduct,
            is_video: self.is_video,
            is_static: self.is_static,
            is_active: self.is_active,
            is_last_minute: self.is_last_minute,
            last_minute_until,
            price: self.price,
        })
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Active screens for the public map, ordered by city
pub async fn list_active_screens<'e, E>(executor: E) -> Result<Vec<Screen>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = format!(
        "SELECT {SCREEN_COLUMNS} FROM screens WHERE is_active ORDER BY city ASC, display_order ASC, id ASC"
    );
    let rows: Vec<ScreenRow> = sqlx::query_as(&query).fetch_all(executor).await?;
    Ok(rows.into_iter().map(Screen::from).collect())
}

/// Every screen for the admin list, in manual display order
pub async fn list_admin_screens<'e, E>(executor: E) -> Result<Vec<Screen>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let query =
        format!("SELECT {SCREEN_COLUMNS} FROM screens ORDER BY display_order ASC, id ASC");
    let rows: Vec<ScreenRow> = sqlx::query_as(&query).fetch_all(executor).await?;
    Ok(rows.into_iter().map(Screen::from).collect())
}

/// Distinct cities that have at least one active screen
pub async fn list_active_cities<'e, E>(executor: E) -> Result<Vec<String>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT DISTINCT city FROM screens WHERE is_active ORDER BY city ASC")
            .fetch_all(executor)
            .await?;
    Ok(rows.into_iter().map(|(city,)| city).collect())
}

/// Insert a screen at the end of the display order
pub async fn insert_screen<'e, E>(executor: E, draft: &ScreenDraft) -> Result<Screen, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = format!(
        r#"
        INSERT INTO screens (
            name, coordinates, city, district, address, image_url, image_url_back,
            is_double_sided, is_viaduct, is_video, is_static, is_active,
            is_last_minute, last_minute_until, price, display_order
        )
        VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
            (SELECT COALESCE(MAX(display_order), -1) + 1 FROM screens)
        )
        RETURNING {SCREEN_COLUMNS}
        "#
    );
    let row: ScreenRow = bind_draft(sqlx::query_as(&query), draft)
        .fetch_one(executor)
        .await?;
    Ok(row.into())
}

/// Update a screen; returns None when no row has the id
pub async fn update_screen<'e, E>(
    executor: E,
    screen_id: i64,
    draft: &ScreenDraft,
) -> Result<Option<Screen>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = format!(
        r#"
        UPDATE screens SET
            name = $1, coordinates = $2, city = $3, district = $4, address = $5,
            image_url = $6, image_url_back = $7, is_double_sided = $8, is_viaduct = $9,
            is_video = $10, is_static = $11, is_active = $12, is_last_minute = $13,
            last_minute_until = $14, price = $15
        WHERE id = $16
        RETURNING {SCREEN_COLUMNS}
        "#
    );
    let row: Option<ScreenRow> = bind_draft(sqlx::query_as(&query), draft)
        .bind(screen_id)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(Screen::from))
}

type ScreenQuery<'q> =
    sqlx::query::QueryAs<'q, Postgres, ScreenRow, sqlx::postgres::PgArguments>;

fn bind_draft<'q>(query: ScreenQuery<'q>, draft: &'q ScreenDraft) -> ScreenQuery<'q> {
    query
        .bind(&draft.name)
        .bind(draft.coordinates.to_json())
        .bind(&draft.city)
        .bind(&draft.district)
        .bind(&draft.address)
        .bind(&draft.image_url)
        .bind(&draft.image_url_back)
        .bind(draft.is_double_sided)
        .bind(draft.is_viaduct)
        .bind(draft.is_video)
        .bind(draft.is_static)
        .bind(draft.is_active)
        .bind(draft.is_last_minute)
        .bind(draft.last_minute_until)
        .bind(draft.price)
}

/// Delete a screen; returns false when no row had the id
pub async fn delete_screen<'e, E>(executor: E, screen_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM screens WHERE id = $1")
        .bind(screen_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Write a single row's display position
pub async fn set_display_order<'e, E>(
    executor: E,
    screen_id: i64,
    position: i32,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE screens SET display_order = $1 WHERE id = $2")
        .bind(position)
        .bind(screen_id)
        .execute(executor)
        .await?;
    Ok(())
}
