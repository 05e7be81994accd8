use crate::api::client::ApiClient;
use crate::core::dates::{lenient, CalendarDate};
use crate::utils::error::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardTotals {
    pub cursos: u64,
    pub alunos: u64,
    pub professores: u64,
    pub materias: u64,
    pub ofertas: u64,
    pub matriculas: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentActivity {
    pub tipo: String,
    pub nome: String,
    #[serde(with = "lenient")]
    pub data: Option<CalendarDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardReport {
    pub totais: DashboardTotals,
    pub atividades_recentes: Vec<RecentActivity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseSummary {
    pub total_cursos: u64,
    pub total_alunos_sistema: u64,
    pub total_materias_sistema: u64,
    pub total_ofertas_sistema: u64,
    pub total_matriculas_sistema: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseStatistics {
    pub curso_id: i64,
    pub curso_nome: String,
    pub carga_horaria_total_curso: u64,
    pub total_alunos: u64,
    pub total_materias: u64,
    pub carga_horaria_materias: u64,
    pub total_ofertas: u64,
    pub total_matriculas_ativas: u64,
    pub ofertas_ano_atual: u64,
    pub percentual_alunos: f64,
    pub percentual_ofertas: f64,
    pub media_alunos_por_oferta: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseStatisticsReport {
    pub resumo_geral: CourseSummary,
    pub estatisticas_por_curso: Vec<CourseStatistics>,
    pub mensagem: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffersSummary {
    pub total_ofertas: u64,
    pub total_matriculados: u64,
    pub professores_ativos: u64,
    pub cursos_ativos: u64,
    pub media_alunos_por_oferta: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferDetail {
    pub oferta_id: i64,
    pub periodo: String,
    pub curso_nome: String,
    pub materia_nome: String,
    pub periodo_materia: String,
    pub carga_horaria: String,
    pub professor_nome: String,
    pub professor_email: String,
    pub professor_status: String,
    pub total_matriculados: u64,
    pub carga_total_curso: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffersCompleteReport {
    pub resumo_geral: OffersSummary,
    pub todas_ofertas: Vec<OfferDetail>,
    pub mensagem: Option<String>,
}

impl CourseStatisticsReport {
    /// Courses ordered by enrolled students, largest first.
    pub fn ranked_by_students(&self) -> Vec<&CourseStatistics> {
        let mut ranked: Vec<&CourseStatistics> = self.estatisticas_por_curso.iter().collect();
        ranked.sort_by(|a, b| {
            b.total_alunos
                .cmp(&a.total_alunos)
                .then_with(|| a.curso_nome.cmp(&b.curso_nome))
        });
        ranked
    }
}

impl ApiClient {
    pub async fn dashboard_report(&self) -> Result<DashboardReport> {
        self.request(Method::GET, "/reports/dashboard", None).await
    }

    pub async fn course_statistics(&self) -> Result<CourseStatisticsReport> {
        self.request(Method::GET, "/reports/course-statistics", None)
            .await
    }

    pub async fn offers_complete_report(&self) -> Result<OffersCompleteReport> {
        self.request(Method::GET, "/reports/offers-complete", None)
            .await
    }
}
