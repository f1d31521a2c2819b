//! Fee handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use core_kernel::{PaymentId, StudentId};
use domain_fees::Receipt;

use crate::dto::fees::*;
use crate::{error::ApiError, AppState};

/// Termly statement, summary and status of one student
pub async fn student_fees(
    State(state): State<AppState>,
    Path(student_id): Path<StudentId>,
    Query(query): Query<StudentFeesQuery>,
) -> Result<Json<StudentFeesResponse>, ApiError> {
    query.validate()?;

    let account = state
        .fees
        .student_account(student_id, &query.class_name, query.year, query.policy)
        .await?;

    Ok(Json(StudentFeesResponse::from(&account)))
}

/// Payment history with running balances
pub async fn payment_history(
    State(state): State<AppState>,
    Path(student_id): Path<StudentId>,
    Query(query): Query<StudentFeesQuery>,
) -> Result<Json<PaymentHistoryResponse>, ApiError> {
    query.validate()?;

    let payments = state
        .fees
        .payment_history(student_id, &query.class_name, query.year)
        .await?;

    Ok(Json(PaymentHistoryResponse {
        student_id,
        class_name: query.class_name.trim().to_string(),
        year: query.year,
        payments,
    }))
}

/// Receipt for one payment
pub async fn payment_receipt(
    State(state): State<AppState>,
    Path((student_id, payment_id)): Path<(StudentId, PaymentId)>,
    Query(query): Query<StudentFeesQuery>,
) -> Result<Json<Receipt>, ApiError> {
    query.validate()?;

    let receipt = state
        .fees
        .receipt(student_id, &query.class_name, query.year, payment_id)
        .await?;

    Ok(Json(receipt))
}

/// Fee status of every student in a class
pub async fn class_dashboard(
    State(state): State<AppState>,
    Path(class_name): Path<String>,
    Query(query): Query<ClassFeesQuery>,
) -> Result<Json<ClassDashboardResponse>, ApiError> {
    query.validate()?;
    if class_name.trim().is_empty() {
        return Err(ApiError::BadRequest("class name must not be empty".to_string()));
    }

    let rows = state.fees.class_dashboard(&class_name, query.year).await?;

    Ok(Json(ClassDashboardResponse {
        class_name: class_name.trim().to_string(),
        year: query.year,
        counts: StatusCounts::tally(&rows),
        students: rows.iter().map(DashboardEntryDto::from).collect(),
    }))
}
