use crate::core::dates::{lenient, CalendarDate};
use crate::domain::ports::{Resource, ResourceKey};
use crate::utils::error::{Result, SgeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric primary key, rendered as `/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SingleKey(pub i64);

/// Two-column primary key, rendered as `/{first}/{second}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositeKey(pub i64, pub i64);

fn parse_key_segment(segment: &str) -> Result<i64> {
    segment
        .trim()
        .parse()
        .map_err(|_| SgeError::ValidationError {
            message: format!("Key segment '{}' is not a number", segment),
        })
}

impl ResourceKey for SingleKey {
    fn path_suffix(&self) -> String {
        format!("/{}", self.0)
    }

    fn from_segments(segments: &[String]) -> Result<Self> {
        match segments {
            [id] => Ok(SingleKey(parse_key_segment(id)?)),
            _ => Err(SgeError::ValidationError {
                message: format!("Expected 1 key segment, got {}", segments.len()),
            }),
        }
    }
}

impl ResourceKey for CompositeKey {
    fn path_suffix(&self) -> String {
        format!("/{}/{}", self.0, self.1)
    }

    fn from_segments(segments: &[String]) -> Result<Self> {
        match segments {
            [first, second] => Ok(CompositeKey(
                parse_key_segment(first)?,
                parse_key_segment(second)?,
            )),
            _ => Err(SgeError::ValidationError {
                message: format!("Expected 2 key segments, got {}", segments.len()),
            }),
        }
    }
}

impl fmt::Display for SingleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub matricula: String,
    #[serde(default)]
    pub cpf: Option<String>,
    pub nome: String,
    #[serde(default, with = "lenient", alias = "data_nascimento")]
    pub data_nasc: Option<CalendarDate>,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub periodo: Option<i64>,
    #[serde(default, alias = "id_curso")]
    pub course_id: Option<i64>,
    #[serde(default)]
    pub status_curso: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(default, alias = "carga_horaria")]
    pub carga_horaria_total: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_professor: Option<i64>,
    pub cpf: String,
    pub nome: String,
    #[serde(default, with = "lenient")]
    pub data_nasc: Option<CalendarDate>,
    #[serde(default)]
    pub telefone: Option<String>,
    pub email: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id_materia: i64,
    pub id_curso: i64,
    pub periodo: i64,
    pub nome: String,
    pub carga_horaria: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_aprovacao: Option<f64>,
    #[serde(default, skip_serializing)]
    pub curso_nome: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub ano: i64,
    pub semestre: i64,
    pub id_materia: i64,
    pub id_curso: i64,
    pub id_professor: i64,
    #[serde(default, skip_serializing)]
    pub materia_nome: Option<String>,
    #[serde(default, skip_serializing)]
    pub curso_nome: Option<String>,
    #[serde(default, skip_serializing)]
    pub professor_nome: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub tipo: String,
    pub peso: f64,
    #[serde(default, with = "lenient", alias = "data_avaliacao")]
    pub data: Option<CalendarDate>,
    pub id_oferta: i64,
    #[serde(default, skip_serializing)]
    pub materia_nome: Option<String>,
    #[serde(default, skip_serializing)]
    pub curso_nome: Option<String>,
    #[serde(default, skip_serializing)]
    pub professor_nome: Option<String>,
    #[serde(default, skip_serializing)]
    pub ano: Option<i64>,
    #[serde(default, skip_serializing)]
    pub semestre: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id_aluno: i64,
    pub id_oferta: i64,
    pub status: String,
    #[serde(default)]
    pub media_final: Option<f64>,
    #[serde(default, skip_serializing)]
    pub aluno_nome: Option<String>,
    #[serde(default, skip_serializing)]
    pub materia_nome: Option<String>,
    #[serde(default, skip_serializing)]
    pub curso_nome: Option<String>,
    #[serde(default, skip_serializing)]
    pub professor_nome: Option<String>,
    #[serde(default, skip_serializing)]
    pub ano: Option<i64>,
    #[serde(default, skip_serializing)]
    pub semestre: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id_avaliacao: i64,
    pub id_aluno: i64,
    pub nota: f64,
    #[serde(default, skip_serializing)]
    pub avaliacao_tipo: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize", skip_serializing)]
    pub avaliacao_data: Option<CalendarDate>,
    #[serde(default, skip_serializing)]
    pub aluno_nome: Option<String>,
    #[serde(default, skip_serializing)]
    pub materia_nome: Option<String>,
}

impl Resource for Student {
    type Key = SingleKey;
    const KIND: EntityKind = EntityKind::Students;

    fn key(&self) -> Option<SingleKey> {
        self.id.map(SingleKey)
    }
}

impl Resource for Course {
    type Key = SingleKey;
    const KIND: EntityKind = EntityKind::Courses;

    fn key(&self) -> Option<SingleKey> {
        self.id.map(SingleKey)
    }
}

impl Resource for Professor {
    type Key = SingleKey;
    const KIND: EntityKind = EntityKind::Professors;

    fn key(&self) -> Option<SingleKey> {
        self.id_professor.map(SingleKey)
    }
}

impl Resource for Subject {
    type Key = CompositeKey;
    const KIND: EntityKind = EntityKind::Subjects;

    fn key(&self) -> Option<CompositeKey> {
        Some(CompositeKey(self.id_materia, self.id_curso))
    }
}

impl Resource for Offer {
    type Key = SingleKey;
    const KIND: EntityKind = EntityKind::Offers;

    fn key(&self) -> Option<SingleKey> {
        self.id.map(SingleKey)
    }
}

impl Resource for Evaluation {
    type Key = SingleKey;
    const KIND: EntityKind = EntityKind::Evaluations;

    fn key(&self) -> Option<SingleKey> {
        self.id.map(SingleKey)
    }
}

impl Resource for Enrollment {
    type Key = CompositeKey;
    const KIND: EntityKind = EntityKind::Enrollments;

    fn key(&self) -> Option<CompositeKey> {
        Some(CompositeKey(self.id_aluno, self.id_oferta))
    }
}

impl Resource for Grade {
    type Key = CompositeKey;
    const KIND: EntityKind = EntityKind::Grades;

    fn key(&self) -> Option<CompositeKey> {
        Some(CompositeKey(self.id_avaliacao, self.id_aluno))
    }
}

/// The eight record collections exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum EntityKind {
    Students,
    Courses,
    Professors,
    Subjects,
    Offers,
    Evaluations,
    Enrollments,
    Grades,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Students,
        EntityKind::Courses,
        EntityKind::Professors,
        EntityKind::Subjects,
        EntityKind::Offers,
        EntityKind::Evaluations,
        EntityKind::Enrollments,
        EntityKind::Grades,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Students => "students",
            EntityKind::Courses => "courses",
            EntityKind::Professors => "professors",
            EntityKind::Subjects => "subjects",
            EntityKind::Offers => "offers",
            EntityKind::Evaluations => "evaluations",
            EntityKind::Enrollments => "enrollments",
            EntityKind::Grades => "grades",
        }
    }

    /// Collection path relative to the API base URL.
    pub fn path(&self) -> String {
        format!("/{}", self.name())
    }

    pub fn key_arity(&self) -> usize {
        match self {
            EntityKind::Subjects | EntityKind::Enrollments | EntityKind::Grades => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = SgeError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| SgeError::UnknownEntityError {
                name: s.to_string(),
            })
    }
}

/// Server acknowledgement for create, update and delete calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
}
