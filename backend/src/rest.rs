//! Axum handlers mapping the public API DTOs onto domain commands.
//!
//! The session provider authenticates upstream and forwards the caller's
//! role in the `x-user-role` header; mutating handlers check it against the
//! role capability table before touching a service.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::domain::commands::assignments::{CreateAssignmentCommand, UpdateAssignmentCommand};
use crate::domain::commands::coaches::{CreateCoachCommand, UpdateCoachCommand};
use crate::domain::commands::couples::{CreateCoupleCommand, UpdateCoupleCommand};
use crate::domain::commands::distribution::{
    DistributeAssignmentCommand, DistributionTarget, SubmitHomeworkCommand,
};
use crate::domain::models::assignment::Assignment;
use crate::domain::models::coach::Coach;
use crate::domain::models::couple::Couple;
use crate::domain::models::distribution_status::DistributionStatus;
use crate::domain::permissions::{self, Permissions, Role};
use crate::domain::{
    AssignmentService, CoachService, CoupleService, DistributionError, DistributionService,
};
use shared::{
    AssignmentDto, CoachDto, CoachOption, CoupleDto, CreateAssignmentRequest, CreateCoachRequest,
    CreateCoupleRequest, DistributeRequest, DistributeResponse, DistributionStatusDto,
    OverdueSweepResponse, SubmitHomeworkRequest, UpdateAssignmentRequest, UpdateCoachRequest,
    UpdateCoupleRequest,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub assignment_service: AssignmentService,
    pub couple_service: CoupleService,
    pub coach_service: CoachService,
    pub distribution_service: DistributionService,
}

/// Check the caller's role against the capability table.
/// Returns the ready-made error response on failure so handlers can
/// early-return it.
fn check_permission(
    headers: &HeaderMap,
    allowed: impl Fn(&Permissions) -> bool,
) -> Result<(), Response> {
    let role_value = headers
        .get("x-user-role")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| (StatusCode::FORBIDDEN, "Missing x-user-role header").into_response())?;
    let role =
        Role::from_str(role_value).map_err(|e| (StatusCode::FORBIDDEN, e).into_response())?;
    if !allowed(&permissions::for_role(role)) {
        return Err((
            StatusCode::FORBIDDEN,
            format!("Role '{}' may not perform this action", role.as_str()),
        )
            .into_response());
    }
    Ok(())
}

fn distribution_error_response(e: DistributionError) -> Response {
    match e {
        DistributionError::AssignmentNotFound(_)
        | DistributionError::CoachNotFound(_)
        | DistributionError::NotDistributed(_, _) => {
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
        DistributionError::AlreadySubmitted(_) => {
            (StatusCode::CONFLICT, e.to_string()).into_response()
        }
        DistributionError::EmptyResponse | DistributionError::ResponseTooLong => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        DistributionError::Storage(err) => {
            tracing::error!("Storage failure: {:?}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Storage failure").into_response()
        }
    }
}

fn assignment_to_dto(a: Assignment) -> AssignmentDto {
    AssignmentDto {
        id: a.id,
        title: a.title,
        description: a.description,
        content: a.content,
        week_number: a.week_number,
        due_date: a.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
        created_at: a.created_at.to_rfc3339(),
        updated_at: a.updated_at.to_rfc3339(),
    }
}

fn couple_to_dto(c: Couple) -> CoupleDto {
    CoupleDto {
        id: c.id,
        partner_one_name: c.partner_one_name,
        partner_two_name: c.partner_two_name,
        email: c.email,
        phone: c.phone,
        coach_id: c.coach_id,
        status: c.status.as_str().to_string(),
        created_at: c.created_at.to_rfc3339(),
        updated_at: c.updated_at.to_rfc3339(),
    }
}

fn coach_to_dto(c: Coach) -> CoachDto {
    CoachDto {
        id: c.id,
        name: c.name,
        email: c.email,
        phone: c.phone,
        status: c.status.as_str().to_string(),
        created_at: c.created_at.to_rfc3339(),
        updated_at: c.updated_at.to_rfc3339(),
    }
}

fn status_to_dto(s: DistributionStatus) -> DistributionStatusDto {
    DistributionStatusDto {
        id: s.id,
        assignment_id: s.assignment_id,
        couple_id: s.couple_id,
        state: s.state.as_str().to_string(),
        sent_at: s.sent_at.map(|t| t.to_rfc3339()),
        completed_at: s.completed_at.map(|t| t.to_rfc3339()),
    }
}

// --- Assignments ---

pub async fn list_assignments(State(state): State<AppState>) -> Response {
    info!("GET /api/assignments");
    match state.assignment_service.list_assignments() {
        Ok(assignments) => {
            let dtos: Vec<AssignmentDto> = assignments.into_iter().map(assignment_to_dto).collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(e) => {
            tracing::error!("Error listing assignments: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing assignments").into_response()
        }
    }
}

pub async fn create_assignment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateAssignmentRequest>,
) -> Response {
    info!("POST /api/assignments - title: {}", request.title);
    if let Err(denied) = check_permission(&headers, |p| p.manage_assignments) {
        return denied;
    }

    let command = CreateAssignmentCommand {
        title: request.title,
        description: request.description,
        content: request.content,
        week_number: request.week_number,
        due_date: request.due_date,
    };
    match state.assignment_service.create_assignment(command) {
        Ok(result) => {
            (StatusCode::CREATED, Json(assignment_to_dto(result.assignment))).into_response()
        }
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

pub async fn get_assignment(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/assignments/{}", id);
    match state.assignment_service.get_assignment(&id) {
        Ok(Some(assignment)) => {
            (StatusCode::OK, Json(assignment_to_dto(assignment))).into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, "Assignment not found").into_response(),
        Err(e) => {
            tracing::error!("Error fetching assignment: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching assignment").into_response()
        }
    }
}

pub async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdateAssignmentRequest>,
) -> Response {
    info!("PUT /api/assignments/{}", id);
    if let Err(denied) = check_permission(&headers, |p| p.manage_assignments) {
        return denied;
    }

    let command = UpdateAssignmentCommand {
        assignment_id: id,
        title: request.title,
        description: request.description,
        content: request.content,
        week_number: request.week_number,
        due_date: request.due_date,
    };
    match state.assignment_service.update_assignment(command) {
        Ok(result) => (StatusCode::OK, Json(assignment_to_dto(result.assignment))).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

pub async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    info!("DELETE /api/assignments/{}", id);
    if let Err(denied) = check_permission(&headers, |p| p.manage_assignments) {
        return denied;
    }

    match state.assignment_service.delete_assignment(&id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

// --- Distribution ---

pub async fn distribute_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<DistributeRequest>,
) -> Response {
    info!("POST /api/assignments/{}/distribute - mode: {}", id, request.mode);
    if let Err(denied) = check_permission(&headers, |p| p.distribute_assignments) {
        return denied;
    }

    let target = match request.mode.as_str() {
        "all" => DistributionTarget::All,
        "coach" => match request.coach_id {
            Some(coach_id) => DistributionTarget::Coach { coach_id },
            None => {
                return (StatusCode::BAD_REQUEST, "coach mode requires coach_id").into_response()
            }
        },
        "specific" => match request.couple_ids {
            Some(couple_ids) => DistributionTarget::Specific { couple_ids },
            None => {
                return (StatusCode::BAD_REQUEST, "specific mode requires couple_ids")
                    .into_response()
            }
        },
        other => {
            return (
                StatusCode::BAD_REQUEST,
                format!("Unknown target mode: {}", other),
            )
                .into_response()
        }
    };

    let command = DistributeAssignmentCommand {
        assignment_id: id,
        target,
    };
    match state.distribution_service.distribute(command) {
        Ok(result) => (
            StatusCode::OK,
            Json(DistributeResponse {
                created_count: result.created_count,
            }),
        )
            .into_response(),
        Err(e) => distribution_error_response(e),
    }
}

pub async fn list_assignment_statuses(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    info!("GET /api/assignments/{}/statuses", id);
    match state.distribution_service.list_statuses(&id) {
        Ok(statuses) => {
            let dtos: Vec<DistributionStatusDto> =
                statuses.into_iter().map(status_to_dto).collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(e) => distribution_error_response(e),
    }
}

pub async fn submit_homework(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<SubmitHomeworkRequest>,
) -> Response {
    info!(
        "POST /api/assignments/{}/submissions - couple: {}",
        id, request.couple_id
    );
    if let Err(denied) = check_permission(&headers, |p| p.submit_homework) {
        return denied;
    }

    let command = SubmitHomeworkCommand {
        assignment_id: id,
        couple_id: request.couple_id,
        response: request.response,
    };
    match state.distribution_service.submit_homework(command) {
        Ok(result) => (StatusCode::OK, Json(status_to_dto(result.status))).into_response(),
        Err(e) => distribution_error_response(e),
    }
}

pub async fn overdue_sweep(State(state): State<AppState>, headers: HeaderMap) -> Response {
    info!("POST /api/distribution/overdue-sweep");
    if let Err(denied) = check_permission(&headers, |p| p.distribute_assignments) {
        return denied;
    }

    let today = chrono::Utc::now().date_naive();
    match state.distribution_service.overdue_sweep(today) {
        Ok(result) => (
            StatusCode::OK,
            Json(OverdueSweepResponse {
                marked_overdue: result.marked_overdue,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Overdue sweep failed: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Overdue sweep failed").into_response()
        }
    }
}

// --- Couples ---

pub async fn list_couples(State(state): State<AppState>) -> Response {
    info!("GET /api/couples");
    match state.couple_service.list_couples() {
        Ok(couples) => {
            let dtos: Vec<CoupleDto> = couples.into_iter().map(couple_to_dto).collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(e) => {
            tracing::error!("Error listing couples: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing couples").into_response()
        }
    }
}

pub async fn create_couple(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateCoupleRequest>,
) -> Response {
    info!("POST /api/couples - email: {}", request.email);
    if let Err(denied) = check_permission(&headers, |p| p.manage_couples) {
        return denied;
    }

    let command = CreateCoupleCommand {
        partner_one_name: request.partner_one_name,
        partner_two_name: request.partner_two_name,
        email: request.email,
        phone: request.phone,
        coach_id: request.coach_id,
    };
    match state.couple_service.create_couple(command) {
        Ok(result) => (StatusCode::CREATED, Json(couple_to_dto(result.couple))).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

pub async fn get_couple(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/couples/{}", id);
    match state.couple_service.get_couple(&id) {
        Ok(Some(couple)) => (StatusCode::OK, Json(couple_to_dto(couple))).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Couple not found").into_response(),
        Err(e) => {
            tracing::error!("Error fetching couple: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching couple").into_response()
        }
    }
}

pub async fn update_couple(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdateCoupleRequest>,
) -> Response {
    info!("PUT /api/couples/{}", id);
    if let Err(denied) = check_permission(&headers, |p| p.manage_couples) {
        return denied;
    }

    let command = UpdateCoupleCommand {
        couple_id: id,
        partner_one_name: request.partner_one_name,
        partner_two_name: request.partner_two_name,
        email: request.email,
        phone: request.phone,
        coach_id: request.coach_id,
        status: request.status,
    };
    match state.couple_service.update_couple(command) {
        Ok(result) => (StatusCode::OK, Json(couple_to_dto(result.couple))).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

pub async fn delete_couple(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    info!("DELETE /api/couples/{}", id);
    if let Err(denied) = check_permission(&headers, |p| p.manage_couples) {
        return denied;
    }

    match state.couple_service.delete_couple(&id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

// --- Coaches ---

pub async fn list_coaches(State(state): State<AppState>) -> Response {
    info!("GET /api/coaches");
    match state.coach_service.list_coaches() {
        Ok(coaches) => {
            let dtos: Vec<CoachDto> = coaches.into_iter().map(coach_to_dto).collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(e) => {
            tracing::error!("Error listing coaches: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing coaches").into_response()
        }
    }
}

/// Coach options for dropdowns; degrades to an empty list on storage failure
pub async fn coach_options(State(state): State<AppState>) -> Response {
    info!("GET /api/coaches/options");
    let options: Vec<CoachOption> = state
        .coach_service
        .coach_picklist()
        .into_iter()
        .map(|o| CoachOption {
            id: o.id,
            name: o.name,
        })
        .collect();
    (StatusCode::OK, Json(options)).into_response()
}

pub async fn create_coach(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateCoachRequest>,
) -> Response {
    info!("POST /api/coaches - name: {}", request.name);
    if let Err(denied) = check_permission(&headers, |p| p.manage_coaches) {
        return denied;
    }

    let command = CreateCoachCommand {
        name: request.name,
        email: request.email,
        phone: request.phone,
    };
    match state.coach_service.create_coach(command) {
        Ok(result) => (StatusCode::CREATED, Json(coach_to_dto(result.coach))).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

pub async fn get_coach(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/coaches/{}", id);
    match state.coach_service.get_coach(&id) {
        Ok(Some(coach)) => (StatusCode::OK, Json(coach_to_dto(coach))).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Coach not found").into_response(),
        Err(e) => {
            tracing::error!("Error fetching coach: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching coach").into_response()
        }
    }
}

pub async fn update_coach(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdateCoachRequest>,
) -> Response {
    info!("PUT /api/coaches/{}", id);
    if let Err(denied) = check_permission(&headers, |p| p.manage_coaches) {
        return denied;
    }

    let command = UpdateCoachCommand {
        coach_id: id,
        name: request.name,
        email: request.email,
        phone: request.phone,
        status: request.status,
    };
    match state.coach_service.update_coach(command) {
        Ok(result) => (StatusCode::OK, Json(coach_to_dto(result.coach))).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

pub async fn delete_coach(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    info!("DELETE /api/coaches/{}", id);
    if let Err(denied) = check_permission(&headers, |p| p.manage_coaches) {
        return denied;
    }

    match state.coach_service.delete_coach(&id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::CsvConnection;
    use axum::http::HeaderValue;
    use tempfile::tempdir;

    fn setup_state() -> (AppState, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let conn = CsvConnection::new(temp_dir.path()).unwrap();
        let state = AppState {
            assignment_service: AssignmentService::new(conn.clone()),
            couple_service: CoupleService::new(conn.clone()),
            coach_service: CoachService::new(conn.clone()),
            distribution_service: DistributionService::new(conn),
        };
        (state, temp_dir)
    }

    fn role_headers(role: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-role", HeaderValue::from_str(role).unwrap());
        headers
    }

    #[tokio::test]
    async fn test_distribute_endpoint_end_to_end() {
        let (state, _temp_dir) = setup_state();

        let created = create_assignment(
            State(state.clone()),
            role_headers("admin"),
            Json(CreateAssignmentRequest {
                title: "Week 1".to_string(),
                description: None,
                content: "Discuss".to_string(),
                week_number: 1,
                due_date: None,
            }),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let assignments = state.assignment_service.list_assignments().unwrap();
        let assignment_id = assignments[0].id.clone();

        state
            .couple_service
            .create_couple(CreateCoupleCommand {
                partner_one_name: "Jordan".to_string(),
                partner_two_name: "Sam".to_string(),
                email: "js@example.com".to_string(),
                phone: None,
                coach_id: None,
            })
            .unwrap();

        let response = distribute_assignment(
            State(state.clone()),
            Path(assignment_id.clone()),
            role_headers("admin"),
            Json(DistributeRequest {
                mode: "all".to_string(),
                coach_id: None,
                couple_ids: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        // Re-running the same distribution is a no-op, not an error
        let rerun = distribute_assignment(
            State(state.clone()),
            Path(assignment_id),
            role_headers("admin"),
            Json(DistributeRequest {
                mode: "all".to_string(),
                coach_id: None,
                couple_ids: None,
            }),
        )
        .await;
        assert_eq!(rerun.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_couple_role_cannot_distribute() {
        let (state, _temp_dir) = setup_state();
        let response = distribute_assignment(
            State(state),
            Path("assignment::1".to_string()),
            role_headers("couple"),
            Json(DistributeRequest {
                mode: "all".to_string(),
                coach_id: None,
                couple_ids: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_missing_role_header_is_rejected() {
        let (state, _temp_dir) = setup_state();
        let response = create_assignment(
            State(state),
            HeaderMap::new(),
            Json(CreateAssignmentRequest {
                title: "Week 1".to_string(),
                description: None,
                content: "Discuss".to_string(),
                week_number: 1,
                due_date: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_distribute_unknown_assignment_returns_404() {
        let (state, _temp_dir) = setup_state();
        let response = distribute_assignment(
            State(state),
            Path("assignment::ghost".to_string()),
            role_headers("admin"),
            Json(DistributeRequest {
                mode: "all".to_string(),
                coach_id: None,
                couple_ids: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_target_mode_is_bad_request() {
        let (state, _temp_dir) = setup_state();
        let response = distribute_assignment(
            State(state),
            Path("assignment::1".to_string()),
            role_headers("admin"),
            Json(DistributeRequest {
                mode: "everyone".to_string(),
                coach_id: None,
                couple_ids: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
