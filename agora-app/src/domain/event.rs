use super::account::{AccountId, EventOwner};
use agora_errors::FieldErrors;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type EventId = i64;

pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// No transition rules: any status may be set at create or edit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Official,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Official => "official",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Non Officiel",
            Self::Official => "Officiel",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("statut inconnu: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for EventStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "official" => Ok(Self::Official),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub contact: String,
    pub status: EventStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub created_by: AccountId,
    pub created_at: DateTime<Utc>,
}

/// Event row plus its owning account's public fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWithOwner {
    pub event: Event,
    pub owner: Option<EventOwner>,
}

/// Validated payload for inserting an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub contact: String,
    pub status: EventStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub image_url: Option<String>,
}

/// Validated payload for updating an event. `image_url` is only written
/// when a new image was uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventChanges {
    pub title: String,
    pub description: String,
    pub contact: String,
    pub status: EventStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub image_url: Option<String>,
}

impl From<NewEvent> for EventChanges {
    fn from(e: NewEvent) -> Self {
        Self {
            title: e.title,
            description: e.description,
            contact: e.contact,
            status: e.status,
            start_date: e.start_date,
            end_date: e.end_date,
            location: e.location,
            image_url: e.image_url,
        }
    }
}

/// Raw create/edit form as submitted by an organizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub contact: String,
    pub location: String,
    pub status: Option<EventStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

/// Pre-filled edit form; keeps the current image unless replaced.
impl From<&Event> for EventForm {
    fn from(e: &Event) -> Self {
        Self {
            title: e.title.clone(),
            description: e.description.clone(),
            contact: e.contact.clone(),
            location: e.location.clone().unwrap_or_default(),
            status: Some(e.status),
            start_date: Some(e.start_date),
            end_date: Some(e.end_date),
            image_url: e.image_url.clone(),
        }
    }
}

impl EventForm {
    /// Field-level checks for a new event; nothing reaches the store unless
    /// all pass. `today` is the caller's current date, dates before it are
    /// rejected.
    pub fn validate(self, today: NaiveDate) -> Result<NewEvent, FieldErrors> {
        self.check(Some(today))
    }

    /// Same checks for an edit, except that an event may already have
    /// started: only presence and end >= start apply to the dates.
    pub fn validate_edit(self) -> Result<NewEvent, FieldErrors> {
        self.check(None)
    }

    fn check(self, not_before: Option<NaiveDate>) -> Result<NewEvent, FieldErrors> {
        let mut errors = FieldErrors::new();
        let in_past = |d: &DateTime<Utc>| not_before.is_some_and(|today| d.date_naive() < today);

        let title = self.title.trim().to_string();
        if title.is_empty() {
            errors.push("title", "Le titre est requis");
        } else if title.chars().count() > MAX_TITLE_LENGTH {
            errors.push(
                "title",
                format!("Le titre ne doit pas dépasser {MAX_TITLE_LENGTH} caractères"),
            );
        }

        let description = self.description.trim().to_string();
        if description.is_empty() {
            errors.push("description", "La description est requise");
        } else if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            errors.push(
                "description",
                format!(
                    "La description ne doit pas dépasser {MAX_DESCRIPTION_LENGTH} caractères"
                ),
            );
        }

        match self.start_date {
            None => errors.push("start_date", "La date de début est requise"),
            Some(d) if in_past(&d) => {
                errors.push("start_date", "La date de début ne peut pas être dans le passé")
            }
            Some(_) => {}
        }

        match self.end_date {
            None => errors.push("end_date", "La date de fin est requise"),
            Some(d) if in_past(&d) => {
                errors.push("end_date", "La date de fin ne peut pas être dans le passé")
            }
            Some(_) => {}
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                errors.push(
                    "end_date",
                    "La date de fin ne peut pas être antérieure à la date de début",
                );
            }
        }

        let location = self.location.trim().to_string();
        if location.is_empty() {
            errors.push("location", "Le lieu est requis");
        }

        let contact = self.contact.trim().to_string();
        if contact.is_empty() {
            errors.push("contact", "Le contact est requis");
        }

        if self.status.is_none() {
            errors.push("status", "Le statut de l'événement est requis");
        }

        match (self.status, self.start_date, self.end_date) {
            (Some(status), Some(start_date), Some(end_date)) if errors.is_empty() => Ok(NewEvent {
                title,
                description,
                contact,
                status,
                start_date,
                end_date,
                location: Some(location),
                image_url: self.image_url.filter(|u| !u.is_empty()),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn valid_form() -> EventForm {
        EventForm {
            title: "Séminaire de physique".to_string(),
            description: "Ondes gravitationnelles".to_string(),
            contact: "labo@univ.fr".to_string(),
            location: "Amphi B".to_string(),
            status: Some(EventStatus::Draft),
            start_date: Some(Utc.with_ymd_and_hms(2025, 3, 12, 14, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2025, 3, 12, 16, 0, 0).unwrap()),
            image_url: None,
        }
    }

    #[test]
    fn test_valid_form_passes() {
        let event = valid_form().validate(today()).unwrap();
        assert_eq!(event.title, "Séminaire de physique");
        assert_eq!(event.location.as_deref(), Some("Amphi B"));
        assert_eq!(event.status, EventStatus::Draft);
    }

    #[test]
    fn test_required_fields_reported_per_field() {
        let errors = EventForm::default().validate(today()).unwrap_err();
        for field in [
            "title",
            "description",
            "start_date",
            "end_date",
            "location",
            "contact",
            "status",
        ] {
            assert!(errors.get(field).is_some(), "missing error for {field}");
        }
    }

    #[test]
    fn test_length_caps() {
        let mut form = valid_form();
        form.title = "x".repeat(MAX_TITLE_LENGTH + 1);
        form.description = "y".repeat(MAX_DESCRIPTION_LENGTH + 1);
        let errors = form.validate(today()).unwrap_err();
        assert!(errors.get("title").is_some());
        assert!(errors.get("description").is_some());

        let mut form = valid_form();
        form.title = "é".repeat(MAX_TITLE_LENGTH);
        assert!(form.validate(today()).is_ok());
    }

    #[test]
    fn test_dates_in_past_or_reversed_rejected() {
        let mut form = valid_form();
        form.start_date = Some(Utc.with_ymd_and_hms(2025, 3, 9, 10, 0, 0).unwrap());
        assert!(form.validate(today()).unwrap_err().get("start_date").is_some());

        let mut form = valid_form();
        form.end_date = Some(Utc.with_ymd_and_hms(2025, 3, 11, 10, 0, 0).unwrap());
        let errors = form.validate(today()).unwrap_err();
        assert_eq!(
            errors.get("end_date"),
            Some("La date de fin ne peut pas être antérieure à la date de début")
        );
    }

    #[test]
    fn test_edit_accepts_started_event() {
        let mut form = valid_form();
        form.start_date = Some(Utc.with_ymd_and_hms(2025, 3, 8, 9, 0, 0).unwrap());
        form.status = Some(EventStatus::Official);
        assert!(form.clone().validate(today()).is_err());
        let event = form.validate_edit().unwrap();
        assert_eq!(event.status, EventStatus::Official);

        let mut reversed = valid_form();
        reversed.end_date = Some(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());
        assert!(reversed.validate_edit().unwrap_err().get("end_date").is_some());
    }

    #[test]
    fn test_edit_form_keeps_current_image() {
        let stored = valid_form().validate(today()).unwrap();
        let event = Event {
            id: 4,
            title: stored.title,
            description: stored.description,
            contact: stored.contact,
            status: stored.status,
            start_date: stored.start_date,
            end_date: stored.end_date,
            location: None,
            image_url: Some("/uploads/affiche.png".to_string()),
            created_by: 1,
            created_at: stored.start_date,
        };

        let form = EventForm::from(&event);
        assert_eq!(form.location, "");
        let resubmitted = EventForm {
            location: "Amphi C".to_string(),
            ..form
        };
        let changes = EventChanges::from(resubmitted.validate_edit().unwrap());
        assert_eq!(changes.image_url.as_deref(), Some("/uploads/affiche.png"));
        assert_eq!(changes.location.as_deref(), Some("Amphi C"));
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!("official".parse::<EventStatus>(), Ok(EventStatus::Official));
        assert_eq!(EventStatus::Draft.to_string(), "draft");
        assert!("pending".parse::<EventStatus>().is_err());
    }
}
