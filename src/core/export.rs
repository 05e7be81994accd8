use crate::api::ApiClient;
use crate::core::dates::{CalendarDate, NOT_AVAILABLE};
use crate::domain::model::{
    Course, Enrollment, EntityKind, Evaluation, Grade, Offer, Professor, Student, Subject,
};
use crate::utils::error::{Result, SgeError};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Delimiter {
    #[default]
    Csv,
    Tsv,
}

impl Delimiter {
    fn byte(self) -> u8 {
        match self {
            Delimiter::Csv => b',',
            Delimiter::Tsv => b'\t',
        }
    }
}

/// A record rendered as one table row. Column names are the record's JSON field
/// names, so a displayed row can be edited and sent back.
pub trait TableRow {
    const COLUMNS: &'static [&'static str];
    const DATE_COLUMNS: &'static [&'static str] = &[];
    /// Joined columns the API returns but never accepts on write.
    const READ_ONLY_COLUMNS: &'static [&'static str] = &[];

    fn cells(&self) -> Vec<String>;
}

fn text<T: Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn date(value: &Option<CalendarDate>) -> String {
    value
        .map(|d| d.to_localized_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

impl TableRow for Student {
    const COLUMNS: &'static [&'static str] = &[
        "id", "matricula", "nome", "cpf", "data_nasc", "email", "telefone", "periodo",
        "course_id", "status_curso",
    ];
    const DATE_COLUMNS: &'static [&'static str] = &["data_nasc"];

    fn cells(&self) -> Vec<String> {
        vec![
            text(&self.id),
            self.matricula.clone(),
            self.nome.clone(),
            text(&self.cpf),
            date(&self.data_nasc),
            text(&self.email),
            text(&self.telefone),
            text(&self.periodo),
            text(&self.course_id),
            text(&self.status_curso),
        ]
    }
}

impl TableRow for Course {
    const COLUMNS: &'static [&'static str] = &["id", "name", "carga_horaria_total"];

    fn cells(&self) -> Vec<String> {
        vec![text(&self.id), self.name.clone(), text(&self.carga_horaria_total)]
    }
}

impl TableRow for Professor {
    const COLUMNS: &'static [&'static str] = &[
        "id_professor", "nome", "cpf", "data_nasc", "email", "telefone", "status",
    ];
    const DATE_COLUMNS: &'static [&'static str] = &["data_nasc"];

    fn cells(&self) -> Vec<String> {
        vec![
            text(&self.id_professor),
            self.nome.clone(),
            self.cpf.clone(),
            date(&self.data_nasc),
            self.email.clone(),
            text(&self.telefone),
            self.status.clone(),
        ]
    }
}

impl TableRow for Subject {
    const COLUMNS: &'static [&'static str] = &[
        "id_materia", "id_curso", "nome", "periodo", "carga_horaria", "media_aprovacao",
        "curso_nome",
    ];
    const READ_ONLY_COLUMNS: &'static [&'static str] = &["curso_nome"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id_materia.to_string(),
            self.id_curso.to_string(),
            self.nome.clone(),
            self.periodo.to_string(),
            self.carga_horaria.to_string(),
            text(&self.media_aprovacao),
            text(&self.curso_nome),
        ]
    }
}

impl TableRow for Offer {
    const COLUMNS: &'static [&'static str] = &[
        "id", "ano", "semestre", "id_materia", "id_curso", "id_professor", "materia_nome",
        "professor_nome",
    ];
    const READ_ONLY_COLUMNS: &'static [&'static str] = &["materia_nome", "professor_nome"];

    fn cells(&self) -> Vec<String> {
        vec![
            text(&self.id),
            self.ano.to_string(),
            self.semestre.to_string(),
            self.id_materia.to_string(),
            self.id_curso.to_string(),
            self.id_professor.to_string(),
            text(&self.materia_nome),
            text(&self.professor_nome),
        ]
    }
}

impl TableRow for Evaluation {
    const COLUMNS: &'static [&'static str] =
        &["id", "tipo", "peso", "data", "id_oferta", "materia_nome"];
    const DATE_COLUMNS: &'static [&'static str] = &["data"];
    const READ_ONLY_COLUMNS: &'static [&'static str] = &["materia_nome"];

    fn cells(&self) -> Vec<String> {
        vec![
            text(&self.id),
            self.tipo.clone(),
            self.peso.to_string(),
            date(&self.data),
            self.id_oferta.to_string(),
            text(&self.materia_nome),
        ]
    }
}

impl TableRow for Enrollment {
    const COLUMNS: &'static [&'static str] = &[
        "id_aluno", "id_oferta", "aluno_nome", "materia_nome", "status", "media_final",
    ];
    const READ_ONLY_COLUMNS: &'static [&'static str] = &["aluno_nome", "materia_nome"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id_aluno.to_string(),
            self.id_oferta.to_string(),
            text(&self.aluno_nome),
            text(&self.materia_nome),
            self.status.clone(),
            self.media_final
                .map(|m| format!("{:.1}", m))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ]
    }
}

impl TableRow for Grade {
    const COLUMNS: &'static [&'static str] = &[
        "id_avaliacao", "id_aluno", "aluno_nome", "avaliacao_tipo", "avaliacao_data", "nota",
    ];
    const DATE_COLUMNS: &'static [&'static str] = &["avaliacao_data"];
    const READ_ONLY_COLUMNS: &'static [&'static str] =
        &["aluno_nome", "avaliacao_tipo", "avaliacao_data"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id_avaliacao.to_string(),
            self.id_aluno.to_string(),
            text(&self.aluno_nome),
            text(&self.avaliacao_tipo),
            date(&self.avaliacao_data),
            self.nota.to_string(),
        ]
    }
}

pub fn render<E: TableRow>(records: &[E], delimiter: Delimiter) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter.byte())
        .from_writer(Vec::new());

    writer.write_record(E::COLUMNS)?;
    for record in records {
        writer.write_record(record.cells())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SgeError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| SgeError::ValidationError {
        message: format!("Export produced invalid UTF-8: {}", e),
    })
}

/// Fetches one collection and renders it.
pub async fn export_collection(
    client: &ApiClient,
    kind: EntityKind,
    delimiter: Delimiter,
) -> Result<String> {
    tracing::info!("Exporting {} as {:?}", kind, delimiter);
    match kind {
        EntityKind::Students => render(&client.list::<Student>().await?, delimiter),
        EntityKind::Courses => render(&client.list::<Course>().await?, delimiter),
        EntityKind::Professors => render(&client.list::<Professor>().await?, delimiter),
        EntityKind::Subjects => render(&client.list::<Subject>().await?, delimiter),
        EntityKind::Offers => render(&client.list::<Offer>().await?, delimiter),
        EntityKind::Evaluations => render(&client.list::<Evaluation>().await?, delimiter),
        EntityKind::Enrollments => render(&client.list::<Enrollment>().await?, delimiter),
        EntityKind::Grades => render(&client.list::<Grade>().await?, delimiter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluation(data: Option<CalendarDate>) -> Evaluation {
        Evaluation {
            id: Some(3),
            tipo: "Prova".to_string(),
            peso: 0.5,
            data,
            id_oferta: 7,
            materia_nome: None,
            curso_nome: None,
            professor_nome: None,
            ano: None,
            semestre: None,
        }
    }

    #[test]
    fn test_dates_are_localized_and_missing_values_marked() {
        let rows = vec![
            evaluation(CalendarDate::new(2024, 5, 13)),
            evaluation(None),
        ];

        let csv = render(&rows, Delimiter::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "id,tipo,peso,data,id_oferta,materia_nome");
        assert_eq!(lines[1], "3,Prova,0.5,13/05/2024,7,N/A");
        assert_eq!(lines[2], "3,Prova,0.5,N/A,7,N/A");
    }

    #[test]
    fn test_tsv_delimiter() {
        let rows = vec![Course {
            id: Some(1),
            name: "Engenharia, Civil".to_string(),
            carga_horaria_total: Some(3600),
        }];

        let tsv = render(&rows, Delimiter::Tsv).unwrap();
        assert_eq!(tsv, "id\tname\tcarga_horaria_total\n1\tEngenharia, Civil\t3600\n");
    }

    #[test]
    fn test_columns_match_cells() {
        let student = Student {
            id: Some(1),
            matricula: "2024001".to_string(),
            cpf: None,
            nome: "Ana".to_string(),
            data_nasc: None,
            telefone: None,
            email: None,
            periodo: Some(1),
            course_id: Some(2),
            status_curso: None,
        };
        assert_eq!(student.cells().len(), Student::COLUMNS.len());
        assert_eq!(evaluation(None).cells().len(), Evaluation::COLUMNS.len());
    }

    fn read_only_columns_are_displayed<E: TableRow>() -> bool {
        E::READ_ONLY_COLUMNS.iter().all(|c| E::COLUMNS.contains(c))
    }

    #[test]
    fn test_read_only_columns_are_displayed_columns() {
        assert!(read_only_columns_are_displayed::<Student>());
        assert!(read_only_columns_are_displayed::<Course>());
        assert!(read_only_columns_are_displayed::<Professor>());
        assert!(read_only_columns_are_displayed::<Subject>());
        assert!(read_only_columns_are_displayed::<Offer>());
        assert!(read_only_columns_are_displayed::<Evaluation>());
        assert!(read_only_columns_are_displayed::<Enrollment>());
        assert!(read_only_columns_are_displayed::<Grade>());
    }
}
