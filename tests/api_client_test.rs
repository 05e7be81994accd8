use anyhow::Result;
use httpmock::prelude::*;
use sge_admin::core::dates::CalendarDate;
use sge_admin::domain::model::{
    Ack, CompositeKey, Course, Enrollment, Evaluation, Grade, Offer, SingleKey, Student,
};
use sge_admin::{ApiClient, Notifier, Severity, SgeError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn client_for(server: &MockServer) -> Result<ApiClient> {
    Ok(ApiClient::new(&server.url("/api/"), Duration::from_secs(5))?)
}

#[tokio::test]
async fn test_list_reads_bare_array() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/students");
            then.status(200).json_body(json!([
                {"id": 1, "matricula": "2024001", "nome": "Ana Souza", "data_nasc": "2001-07-14"},
                {"id": 2, "matricula": "2024002", "nome": "Bruno Lima", "data_nasc": null}
            ]));
        })
        .await;

    let client = client_for(&server)?;
    let students = client.list::<Student>().await?;

    mock.assert_async().await;
    assert_eq!(students.len(), 2);
    assert_eq!(students[0].data_nasc, CalendarDate::new(2001, 7, 14));
    assert_eq!(students[1].data_nasc, None);
    Ok(())
}

#[tokio::test]
async fn test_list_unwraps_success_envelope() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/offers");
            then.status(200).json_body(json!({
                "success": true,
                "data": [{
                    "id": 5, "ano": 2024, "semestre": 1, "id_materia": 3, "id_curso": 1,
                    "id_professor": 2, "materia_nome": "Cálculo I", "professor_nome": "Dra. Lima"
                }],
                "count": 1
            }));
        })
        .await;

    let offers = client_for(&server)?.list::<Offer>().await?;
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].materia_nome.as_deref(), Some("Cálculo I"));
    Ok(())
}

#[tokio::test]
async fn test_envelope_without_data_lists_nothing() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/grades");
            then.status(200).json_body(json!({"success": true, "data": null}));
        })
        .await;

    let grades = client_for(&server)?.list::<Grade>().await?;
    assert!(grades.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_create_sends_iso_date_and_reads_ack() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/evaluations")
                .json_body(json!({"tipo": "Prova", "peso": 0.4, "data": "2024-05-13", "id_oferta": 4}));
            then.status(201)
                .json_body(json!({"message": "Avaliação criada com sucesso", "id": 12}));
        })
        .await;

    // Localized input is accepted and written back as ISO.
    let evaluation: Evaluation = serde_json::from_value(json!({
        "tipo": "Prova", "peso": 0.4, "data": "13/05/2024", "id_oferta": 4
    }))?;
    let ack = client_for(&server)?.create(&evaluation).await?;

    mock.assert_async().await;
    assert_eq!(ack.id, Some(12));
    assert_eq!(ack.message.as_deref(), Some("Avaliação criada com sucesso"));
    Ok(())
}

#[tokio::test]
async fn test_update_uses_composite_key_path() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PUT).path("/api/enrollments/12/4").json_body(json!({
                "id_aluno": 12, "id_oferta": 4, "status": "APROVADO", "media_final": 8.5
            }));
            then.status(200)
                .json_body(json!({"success": true, "message": "Matrícula atualizada"}));
        })
        .await;

    let enrollment = Enrollment {
        id_aluno: 12,
        id_oferta: 4,
        status: "APROVADO".to_string(),
        media_final: Some(8.5),
        aluno_nome: Some("Ana Souza".to_string()),
        materia_nome: None,
        curso_nome: None,
        professor_nome: None,
        ano: None,
        semestre: None,
    };
    let ack = client_for(&server)?
        .update(&CompositeKey(12, 4), &enrollment)
        .await?;

    mock.assert_async().await;
    assert_eq!(ack.message.as_deref(), Some("Matrícula atualizada"));
    Ok(())
}

#[tokio::test]
async fn test_delete_with_empty_response() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/grades/3/9");
            then.status(204);
        })
        .await;

    let ack = client_for(&server)?
        .delete::<Grade>(&CompositeKey(3, 9))
        .await?;

    mock.assert_async().await;
    assert_eq!(ack, Ack::default());
    Ok(())
}

#[tokio::test]
async fn test_http_error_message_and_notification() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/students/99");
            then.status(404).json_body(json!({"message": "Aluno não encontrado"}));
        })
        .await;

    let notifier = Arc::new(Notifier::default());
    let client = client_for(&server)?.with_notifier(notifier.clone());

    let err = client
        .get::<Student>(&SingleKey(99))
        .await
        .expect_err("missing record should fail");
    match &err {
        SgeError::ApiError { status, message, .. } => {
            assert_eq!(*status, 404);
            assert_eq!(message, "Aluno não encontrado");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.exit_code(), 1);

    // The failure was already shown once, so a repeat inside the window is dropped.
    assert!(!notifier.notify(&format!("API error: {}", err), Severity::Error));
    Ok(())
}

#[tokio::test]
async fn test_error_without_body_uses_status() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/courses");
            then.status(503);
        })
        .await;

    let err = client_for(&server)?
        .list::<Course>()
        .await
        .expect_err("server error should fail");
    assert!(
        matches!(err, SgeError::ApiError { status: 503, ref message, .. } if message == "HTTP error! status: 503")
    );
    assert_eq!(err.exit_code(), 2);
    Ok(())
}

#[tokio::test]
async fn test_failure_envelope_is_an_error() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/offers/7");
            then.status(200)
                .json_body(json!({"success": false, "message": "Oferta não encontrada"}));
        })
        .await;

    let err = client_for(&server)?
        .get::<Offer>(&SingleKey(7))
        .await
        .expect_err("failure envelope should fail");
    assert!(matches!(err, SgeError::EnvelopeError { ref message } if message == "Oferta não encontrada"));
    Ok(())
}
