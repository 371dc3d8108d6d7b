//! Inquiries domain - advertiser campaign requests
//!
//! Validation always runs before anything touches the database or the mailer.
//! The stored row is the source of truth; the notification email is advisory.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::types::Json;
use sqlx::{Decode, Encode, Executor, PgPool, Postgres, Type};
use std::collections::BTreeMap;
use std::future::Future;
use thiserror::Error;
use tracing::{info, warn};

use crate::map::selection::Selection;
use crate::services::email::{EmailMessage, Notifier};

/// Inquiry follow-up status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    #[default]
    Pending,
    Contacted,
    Completed,
    Cancelled,
}

impl InquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::Pending => "pending",
            InquiryStatus::Contacted => "contacted",
            InquiryStatus::Completed => "completed",
            InquiryStatus::Cancelled => "cancelled",
        }
    }

    /// Read a stored status. Unknown text is logged and treated as pending.
    pub fn from_db(s: &str) -> Self {
        match s {
            "pending" => InquiryStatus::Pending,
            "contacted" => InquiryStatus::Contacted,
            "completed" => InquiryStatus::Completed,
            "cancelled" => InquiryStatus::Cancelled,
            other => {
                warn!(status = other, "Unknown inquiry status, reading as pending");
                InquiryStatus::Pending
            }
        }
    }
}

// Stored as TEXT
impl Type<Postgres> for InquiryStatus {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for InquiryStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let s = <String as Decode<Postgres>>::decode(value)?;
        Ok(InquiryStatus::from_db(&s))
    }
}

impl Encode<'_, Postgres> for InquiryStatus {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <String as Encode<Postgres>>::encode_by_ref(&self.as_str().to_owned(), buf)
    }
}

/// Request body of `POST /inquiries`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewInquiry {
    pub selected_screens: Vec<String>,
    /// screen name -> city
    pub screen_cities: BTreeMap<String, String>,
    pub company_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub date_range: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InquiryError {
    #[error("Company name is required")]
    MissingCompanyName,
    #[error("Contact person is required")]
    MissingContactPerson,
    #[error("Email is required")]
    MissingEmail,
    #[error("Select at least one screen")]
    NoScreensSelected,
    #[error("Select both a start and an end date")]
    IncompleteDateRange,
    #[error("End date must not be before the start date")]
    InvalidDateRange,
}

impl NewInquiry {
    pub fn validate(&self) -> Result<(), InquiryError> {
        self.validate_contact()?;
        if self.date_range.trim().is_empty() {
            return Err(InquiryError::IncompleteDateRange);
        }
        Ok(())
    }

    /// Contact fields and screen selection, in form order
    fn validate_contact(&self) -> Result<(), InquiryError> {
        if self.company_name.trim().is_empty() {
            return Err(InquiryError::MissingCompanyName);
        }
        if self.contact_person.trim().is_empty() {
            return Err(InquiryError::MissingContactPerson);
        }
        if self.email.trim().is_empty() {
            return Err(InquiryError::MissingEmail);
        }
        if self.selected_screens.is_empty() {
            return Err(InquiryError::NoScreensSelected);
        }
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InquiryRow {
    id: i64,
    selected_screens: Vec<String>,
    screen_cities: Json<BTreeMap<String, String>>,
    company_name: String,
    contact_person: String,
    email: String,
    phone: String,
    message: String,
    date_range: String,
    status: InquiryStatus,
    created_at: DateTime<Utc>,
}

/// A stored inquiry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inquiry {
    pub id: i64,
    pub selected_screens: Vec<String>,
    pub screen_cities: BTreeMap<String, String>,
    pub company_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub date_range: String,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
}

impl From<InquiryRow> for Inquiry {
    fn from(row: InquiryRow) -> Self {
        Self {
            id: row.id,
            selected_screens: row.selected_screens,
            screen_cities: row.screen_cities.0,
            company_name: row.company_name,
            contact_person: row.contact_person,
            email: row.email,
            phone: row.phone,
            message: row.message,
            date_range: row.date_range,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

/// Insert a new inquiry with status `pending`
pub async fn insert_inquiry<'e, E>(executor: E, inquiry: &NewInquiry) -> Result<Inquiry, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: InquiryRow = sqlx::query_as(
        r#"
        INSERT INTO inquiries (
            selected_screens, screen_cities, company_name, contact_person,
            email, phone, message, date_range, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, selected_screens, screen_cities, company_name, contact_person,
                  email, phone, message, date_range, status, created_at
        "#,
    )
    .bind(&inquiry.selected_screens)
    .bind(Json(&inquiry.screen_cities))
    .bind(inquiry.company_name.trim())
    .bind(inquiry.contact_person.trim())
    .bind(inquiry.email.trim())
    .bind(inquiry.phone.trim())
    .bind(inquiry.message.trim())
    .bind(inquiry.date_range.trim())
    .bind(InquiryStatus::Pending)
    .fetch_one(executor)
    .await?;

    Ok(row.into())
}

/// Where inquiries are persisted
pub trait InquiryStore {
    fn insert_inquiry(
        &self,
        inquiry: &NewInquiry,
    ) -> impl Future<Output = Result<Inquiry, sqlx::Error>> + Send;
}

impl InquiryStore for PgPool {
    async fn insert_inquiry(&self, inquiry: &NewInquiry) -> Result<Inquiry, sqlx::Error> {
        insert_inquiry(self, inquiry).await
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] InquiryError),

    #[error("Failed to store inquiry: {0}")]
    Store(#[source] sqlx::Error),
}

/// Validate, persist, then notify. A failed notification is logged and ignored.
pub async fn submit_inquiry<S, N>(
    store: &S,
    notifier: &N,
    notify_to: &str,
    inquiry: NewInquiry,
) -> Result<Inquiry, SubmitError>
where
    S: InquiryStore + Sync,
    N: Notifier + Sync,
{
    inquiry.validate()?;

    let stored = store
        .insert_inquiry(&inquiry)
        .await
        .map_err(SubmitError::Store)?;
    info!(inquiry_id = stored.id, screens = stored.selected_screens.len(), "Inquiry stored");

    let message = notification_email(notify_to, &stored);
    if let Err(e) = notifier.send(&message).await {
        warn!(inquiry_id = stored.id, "Inquiry notification email failed: {}", e);
    }

    Ok(stored)
}

/// Notification sent to the sales inbox for a stored inquiry
pub fn notification_email(to: &str, inquiry: &Inquiry) -> EmailMessage {
    use html_escape::encode_text;

    let screens: String = inquiry
        .selected_screens
        .iter()
        .map(|name| match inquiry.screen_cities.get(name) {
            Some(city) => format!("<li>{} ({})</li>", encode_text(name), encode_text(city)),
            None => format!("<li>{}</li>", encode_text(name)),
        })
        .collect();

    let html = format!(
        "<h2>New inquiry #{id}</h2>\
         <p><strong>Company:</strong> {company}<br>\
         <strong>Contact:</strong> {contact}<br>\
         <strong>Email:</strong> {email}<br>\
         <strong>Phone:</strong> {phone}<br>\
         <strong>Dates:</strong> {dates}</p>\
         <h3>Screens</h3><ul>{screens}</ul>\
         <h3>Message</h3><p>{message}</p>",
        id = inquiry.id,
        company = encode_text(&inquiry.company_name),
        contact = encode_text(&inquiry.contact_person),
        email = encode_text(&inquiry.email),
        phone = encode_text(&inquiry.phone),
        dates = encode_text(&inquiry.date_range),
        screens = screens,
        message = encode_text(&inquiry.message),
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("New inquiry from {}", inquiry.company_name),
        html,
    }
}

// ============================================================================
// Form-side draft
// ============================================================================

/// Campaign dates as picked in the calendar; either end may still be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// `"YYYY-MM-DD - YYYY-MM-DD"` for a complete, ordered range
    pub fn render(&self) -> Result<String, InquiryError> {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Err(InquiryError::IncompleteDateRange);
        };
        if end < start {
            return Err(InquiryError::InvalidDateRange);
        }
        Ok(format!("{} - {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d")))
    }
}

/// Inquiry form state: the map selection plus contact fields
#[derive(Debug, Clone, Default)]
pub struct InquiryDraft {
    pub selection: Selection,
    pub dates: DateRange,
    pub company_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl InquiryDraft {
    /// Build the request body, or the first validation failure
    pub fn submission(&self) -> Result<NewInquiry, InquiryError> {
        let mut inquiry = NewInquiry {
            selected_screens: self.selection.names().to_vec(),
            screen_cities: self.selection.cities().clone(),
            company_name: self.company_name.trim().to_string(),
            contact_person: self.contact_person.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            message: self.message.trim().to_string(),
            date_range: String::new(),
        };
        inquiry.validate_contact()?;
        inquiry.date_range = self.dates.render()?;
        Ok(inquiry)
    }
}
