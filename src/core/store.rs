use crate::core::dates::{self, CalendarDate, NOT_AVAILABLE};
use crate::core::export::TableRow;
use crate::core::notify::{Notifier, Severity};
use crate::domain::model::{
    Course, Enrollment, EntityKind, Evaluation, Grade, Offer, Professor, Student, Subject,
};
use crate::domain::ports::{RecordGateway, Resource};
use crate::utils::error::{Result, SgeError};
use serde::Serialize;
use serde_json::{Number, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Last loaded copy of every collection.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub students: Vec<Student>,
    pub courses: Vec<Course>,
    pub professors: Vec<Professor>,
    pub subjects: Vec<Subject>,
    pub offers: Vec<Offer>,
    pub evaluations: Vec<Evaluation>,
    pub enrollments: Vec<Enrollment>,
    pub grades: Vec<Grade>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub students: usize,
    pub courses: usize,
    pub professors: usize,
    pub subjects: usize,
    pub offers: usize,
    pub evaluations: usize,
    pub enrollments: usize,
    pub grades: usize,
}

impl Snapshot {
    pub fn counts(&self) -> DashboardCounts {
        DashboardCounts {
            students: self.students.len(),
            courses: self.courses.len(),
            professors: self.professors.len(),
            subjects: self.subjects.len(),
            offers: self.offers.len(),
            evaluations: self.evaluations.len(),
            enrollments: self.enrollments.len(),
            grades: self.grades.len(),
        }
    }
}

/// A resource the store keeps a collection of.
pub trait Collection: Resource + TableRow {
    fn items(snapshot: &Snapshot) -> &Vec<Self>;
    fn items_mut(snapshot: &mut Snapshot) -> &mut Vec<Self>;
}

macro_rules! collection {
    ($ty:ty, $field:ident) => {
        impl Collection for $ty {
            fn items(snapshot: &Snapshot) -> &Vec<Self> {
                &snapshot.$field
            }

            fn items_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
                &mut snapshot.$field
            }
        }
    };
}

collection!(Student, students);
collection!(Course, courses);
collection!(Professor, professors);
collection!(Subject, subjects);
collection!(Offer, offers);
collection!(Evaluation, evaluations);
collection!(Enrollment, enrollments);
collection!(Grade, grades);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub counts: DashboardCounts,
    pub failed: Vec<EntityKind>,
}

/// The row currently in edit mode.
///
/// Localized date cells are converted to ISO for the editor on entry, and edited
/// dates are normalized back to ISO on commit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    kind: EntityKind,
    key: String,
    initial: BTreeMap<String, String>,
    current: BTreeMap<String, String>,
    date_fields: BTreeSet<String>,
    read_only: BTreeSet<String>,
}

impl EditSession {
    pub fn begin<I>(
        kind: EntityKind,
        key: impl ToString,
        cells: I,
        date_fields: &[&str],
        read_only: &[&str],
    ) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let date_fields: BTreeSet<String> = date_fields.iter().map(|f| f.to_string()).collect();
        let initial: BTreeMap<String, String> = cells
            .into_iter()
            .map(|(field, cell)| {
                let value = if cell.trim() == NOT_AVAILABLE {
                    String::new()
                } else if date_fields.contains(&field) {
                    dates::to_iso(&cell).unwrap_or_default()
                } else {
                    cell
                };
                (field, value)
            })
            .collect();

        Self {
            kind,
            key: key.to_string(),
            current: initial.clone(),
            initial,
            date_fields,
            read_only: read_only.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn for_record<E: Resource + TableRow>(record: &E) -> Result<Self> {
        let key = record.key().ok_or_else(|| SgeError::ValidationError {
            message: format!("{} record has no key yet and cannot be edited", E::KIND),
        })?;
        let cells = E::COLUMNS
            .iter()
            .map(|c| c.to_string())
            .zip(record.cells());
        Ok(Self::begin(
            E::KIND,
            key,
            cells,
            E::DATE_COLUMNS,
            E::READ_ONLY_COLUMNS,
        ))
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.current.get(field).map(String::as_str)
    }

    pub fn is_read_only(&self, field: &str) -> bool {
        self.read_only.contains(field)
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) -> Result<()> {
        if self.is_read_only(field) {
            return Err(SgeError::ValidationError {
                message: format!("{} field '{}' is read-only", self.kind, field),
            });
        }
        match self.current.get_mut(field) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(SgeError::ValidationError {
                message: format!("{} has no editable field '{}'", self.kind, field),
            }),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.initial != self.current
    }

    fn changed_fields(&self) -> impl Iterator<Item = (&String, &String)> + '_ {
        self.current
            .iter()
            .filter(|(field, value)| self.initial.get(*field) != Some(*value))
    }

    /// Writes the changed fields over `record`, typed like the record's JSON.
    ///
    /// A field that was null has no type to follow, so a value that reads as a
    /// number is kept only if the record accepts it there; otherwise it is sent
    /// as text.
    pub fn apply_to<E: Resource>(&self, record: &E) -> Result<E> {
        let mut object = match serde_json::to_value(record)? {
            Value::Object(map) => map,
            other => {
                return Err(SgeError::ValidationError {
                    message: format!("{} serialized to a non-object: {}", E::KIND, other),
                })
            }
        };

        let mut guessed = Vec::new();
        for (field, raw) in self.changed_fields() {
            if self.read_only.contains(field) {
                continue;
            }
            let value = if self.date_fields.contains(field) {
                date_value(field, raw)
            } else {
                match typed_value(field, raw, object.get(field))? {
                    Typed::Known(value) => value,
                    Typed::Guess(value) => {
                        guessed.push((field, raw, value));
                        Value::Null
                    }
                }
            };
            object.insert(field.clone(), value);
        }

        for (field, raw, guess) in guessed {
            let mut trial = object.clone();
            trial.insert(field.clone(), guess.clone());
            let value = if serde_json::from_value::<E>(Value::Object(trial)).is_ok() {
                guess
            } else {
                Value::String(raw.to_string())
            };
            object.insert(field.clone(), value);
        }

        Ok(serde_json::from_value(Value::Object(object))?)
    }
}

enum Typed {
    Known(Value),
    /// Read from text alone; the field had no value to take a type from.
    Guess(Value),
}

fn date_value(field: &str, raw: &str) -> Value {
    match dates::to_iso(raw) {
        Some(iso) => {
            let real_day = CalendarDate::parse(&iso).and_then(|d| d.to_naive_date());
            if real_day.is_none() {
                tracing::warn!("{} = {} is not a calendar day; sending as typed", field, iso);
            }
            Value::String(iso)
        }
        None => {
            if !raw.trim().is_empty() {
                tracing::warn!("Could not read '{}' as a date for {}; sending no date", raw, field);
            }
            Value::Null
        }
    }
}

fn typed_value(field: &str, raw: &str, previous: Option<&Value>) -> Result<Typed> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Typed::Known(Value::Null));
    }

    let invalid = |expected: &str| SgeError::ValidationError {
        message: format!("'{}' is not a valid {} for {}", raw, expected, field),
    };

    let known = match previous {
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => trimmed
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid("integer")),
        Some(Value::Number(_)) => trimmed
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| invalid("number")),
        Some(Value::Bool(_)) => trimmed
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|_| invalid("boolean")),
        Some(Value::String(_)) => Ok(Value::String(raw.to_string())),
        _ => return Ok(Typed::Guess(infer_value(trimmed))),
    };
    known.map(Typed::Known)
}

fn infer_value(text: &str) -> Value {
    if let Ok(int) = text.parse::<i64>() {
        return Value::from(int);
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_string()))
}

/// Explicit application state: loaded collections plus the row being edited.
pub struct AppStore<G: RecordGateway> {
    gateway: G,
    notifier: Arc<Notifier>,
    snapshot: Snapshot,
    editing: Option<EditSession>,
}

fn settle<E>(kind: EntityKind, result: Result<Vec<E>>, failed: &mut Vec<EntityKind>) -> Vec<E> {
    match result {
        Ok(items) => items,
        Err(e) => {
            tracing::error!("Failed to load {}: {}", kind, e);
            failed.push(kind);
            Vec::new()
        }
    }
}

impl<G: RecordGateway> AppStore<G> {
    pub fn new(gateway: G, notifier: Arc<Notifier>) -> Self {
        Self {
            gateway,
            notifier,
            snapshot: Snapshot::default(),
            editing: None,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn counts(&self) -> DashboardCounts {
        self.snapshot.counts()
    }

    /// Loads every collection concurrently. A collection that fails is left empty
    /// and reported in the summary; the rest still load.
    pub async fn load_all(&mut self) -> LoadSummary {
        self.notifier.notify("Loading data...", Severity::Info);

        let g = &self.gateway;
        let (students, courses, professors, subjects, offers, evaluations, enrollments, grades) = tokio::join!(
            g.fetch_all::<Student>(),
            g.fetch_all::<Course>(),
            g.fetch_all::<Professor>(),
            g.fetch_all::<Subject>(),
            g.fetch_all::<Offer>(),
            g.fetch_all::<Evaluation>(),
            g.fetch_all::<Enrollment>(),
            g.fetch_all::<Grade>(),
        );

        let mut failed = Vec::new();
        self.snapshot = Snapshot {
            students: settle(EntityKind::Students, students, &mut failed),
            courses: settle(EntityKind::Courses, courses, &mut failed),
            professors: settle(EntityKind::Professors, professors, &mut failed),
            subjects: settle(EntityKind::Subjects, subjects, &mut failed),
            offers: settle(EntityKind::Offers, offers, &mut failed),
            evaluations: settle(EntityKind::Evaluations, evaluations, &mut failed),
            enrollments: settle(EntityKind::Enrollments, enrollments, &mut failed),
            grades: settle(EntityKind::Grades, grades, &mut failed),
        };

        let counts = self.snapshot.counts();
        tracing::info!("📊 Loaded collections: {:?}", counts);
        if failed.is_empty() {
            self.notifier.notify("Data loaded successfully!", Severity::Success);
        } else {
            let names: Vec<&str> = failed.iter().map(|k| k.name()).collect();
            self.notifier.notify(
                &format!("Some collections could not be loaded: {}", names.join(", ")),
                Severity::Warning,
            );
        }

        LoadSummary { counts, failed }
    }

    pub async fn refresh<E: Collection>(&mut self) -> Result<usize> {
        let items = self.gateway.fetch_all::<E>().await?;
        let count = items.len();
        *E::items_mut(&mut self.snapshot) = items;
        tracing::debug!("Refreshed {} ({} records)", E::KIND, count);
        Ok(count)
    }

    pub fn find<E: Collection>(&self, key: &E::Key) -> Option<&E> {
        let wanted = key.to_string();
        E::items(&self.snapshot)
            .iter()
            .find(|record| record.key().map(|k| k.to_string()).as_deref() == Some(wanted.as_str()))
    }

    /// Puts a row into edit mode. Any row already being edited is abandoned.
    pub fn begin_edit<E: Collection>(&mut self, key: &E::Key) -> Result<&mut EditSession> {
        let record = self.find::<E>(key).ok_or_else(|| SgeError::ValidationError {
            message: format!("No {} record with key {}", E::KIND, key),
        })?;
        let session = EditSession::for_record(record)?;

        if let Some(previous) = self.editing.take() {
            tracing::debug!(
                "Abandoning edit of {} {} for {} {}",
                previous.kind(),
                previous.key(),
                E::KIND,
                key
            );
        }
        Ok(self.editing.insert(session))
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut EditSession> {
        self.editing.as_mut()
    }

    pub fn cancel_edit(&mut self) -> Option<EditSession> {
        self.editing.take()
    }

    /// Sends the edited row to the API and replaces it in the snapshot. On failure
    /// the session stays open so the edit can be retried or cancelled.
    pub async fn commit_edit<E: Collection>(&mut self) -> Result<E> {
        let session = self.editing.take().ok_or_else(|| SgeError::ValidationError {
            message: "No row is being edited".to_string(),
        })?;

        let outcome = self.commit_session::<E>(&session).await;
        match outcome {
            Ok(updated) => {
                self.notifier
                    .notify(&format!("{} {} updated", E::KIND, session.key()), Severity::Success);
                Ok(updated)
            }
            Err(e) => {
                self.editing = Some(session);
                Err(e)
            }
        }
    }

    async fn commit_session<E: Collection>(&mut self, session: &EditSession) -> Result<E> {
        if session.kind() != E::KIND {
            return Err(SgeError::ValidationError {
                message: format!("The row being edited is a {} record, not {}", session.kind(), E::KIND),
            });
        }

        let position = E::items(&self.snapshot)
            .iter()
            .position(|record| record.key().map(|k| k.to_string()).as_deref() == Some(session.key()))
            .ok_or_else(|| SgeError::ValidationError {
                message: format!("{} {} is no longer loaded", E::KIND, session.key()),
            })?;

        let original = &E::items(&self.snapshot)[position];
        let key = original.key().ok_or_else(|| SgeError::ValidationError {
            message: format!("{} record has no key", E::KIND),
        })?;

        if !session.is_dirty() {
            tracing::debug!("No changes to {} {}", E::KIND, key);
            return Ok(original.clone());
        }

        let updated = session.apply_to(original)?;
        let ack = self.gateway.update_record(&key, &updated).await?;
        if let Some(message) = &ack.message {
            tracing::debug!("Server acknowledged update: {}", message);
        }

        E::items_mut(&mut self.snapshot)[position] = updated.clone();
        Ok(updated)
    }
}
