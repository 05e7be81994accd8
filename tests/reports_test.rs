use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use sge_admin::core::dates::CalendarDate;
use sge_admin::core::export::{export_collection, Delimiter};
use sge_admin::{ApiClient, EntityKind, SgeError};
use std::time::Duration;

fn client_for(server: &MockServer) -> Result<ApiClient> {
    Ok(ApiClient::new(&server.url("/api"), Duration::from_secs(5))?)
}

#[tokio::test]
async fn test_dashboard_report() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/reports/dashboard");
            then.status(200).json_body(json!({
                "totais": {
                    "cursos": 4, "alunos": 120, "professores": 15,
                    "materias": 32, "ofertas": 18, "matriculas": 260
                },
                "atividades_recentes": [
                    {"tipo": "Aluno", "nome": "Ana Souza", "data": "2024-05-13T10:00:00"},
                    {"tipo": "Oferta", "nome": "Cálculo I", "data": "Data não informada"}
                ]
            }));
        })
        .await;

    let report = client_for(&server)?.dashboard_report().await?;

    mock.assert_async().await;
    assert_eq!(report.totais.alunos, 120);
    assert_eq!(report.atividades_recentes.len(), 2);
    assert_eq!(report.atividades_recentes[0].data, CalendarDate::new(2024, 5, 13));
    assert_eq!(report.atividades_recentes[1].data, None);
    Ok(())
}

#[tokio::test]
async fn test_course_statistics_ranking() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/reports/course-statistics");
            then.status(200).json_body(json!({
                "resumo_geral": {"total_cursos": 2, "total_alunos_sistema": 50},
                "estatisticas_por_curso": [
                    {"curso_id": 1, "curso_nome": "Direito", "total_alunos": 20, "percentual_alunos": 40.0},
                    {"curso_id": 2, "curso_nome": "Medicina", "total_alunos": 30, "percentual_alunos": 60.0}
                ]
            }));
        })
        .await;

    let report = client_for(&server)?.course_statistics().await?;
    let ranked: Vec<i64> = report.ranked_by_students().iter().map(|c| c.curso_id).collect();

    assert_eq!(report.resumo_geral.total_cursos, 2);
    assert_eq!(ranked, vec![2, 1]);
    Ok(())
}

#[tokio::test]
async fn test_report_error_carries_kind() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/reports/offers-complete");
            then.status(500).json_body(json!({
                "error": "Erro ao gerar relatório de ofertas",
                "tipo": "database_error",
                "detalhes": "connection refused"
            }));
        })
        .await;

    let err = client_for(&server)?
        .offers_complete_report()
        .await
        .expect_err("report should fail");

    match err {
        SgeError::ApiError { status, message, kind } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Erro ao gerar relatório de ofertas (connection refused)");
            assert_eq!(kind.as_deref(), Some("database_error"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_export_localizes_dates() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/evaluations");
            then.status(200).json_body(json!([
                {"id": 3, "tipo": "Prova", "peso": 0.4, "data": "2024-05-13", "id_oferta": 7,
                 "materia_nome": "Cálculo I"},
                {"id": 4, "tipo": "Trabalho", "peso": 0.6, "data": null, "id_oferta": 7}
            ]));
        })
        .await;

    let tsv = export_collection(&client_for(&server)?, EntityKind::Evaluations, Delimiter::Tsv).await?;
    let lines: Vec<&str> = tsv.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "id\ttipo\tpeso\tdata\tid_oferta\tmateria_nome");
    assert_eq!(lines[1], "3\tProva\t0.4\t13/05/2024\t7\tCálculo I");
    assert_eq!(lines[2], "4\tTrabalho\t0.6\tN/A\t7\tN/A");
    Ok(())
}

#[tokio::test]
async fn test_export_to_file() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/courses");
            then.status(200)
                .json_body(json!([{"id": 1, "nome": "Direito", "carga_horaria": 3700}]));
        })
        .await;

    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("courses.csv");

    let csv = export_collection(&client_for(&server)?, EntityKind::Courses, Delimiter::Csv).await?;
    std::fs::write(&path, &csv)?;

    let written = std::fs::read_to_string(&path)?;
    assert_eq!(written, "id,name,carga_horaria_total\n1,Direito,3700\n");
    Ok(())
}
