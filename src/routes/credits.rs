use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{ApiError, Result},
    models::credits::{
        BalanceResponse, CreditPackage, CreditSystemStatus, GrantCreditsRequest,
        GrantCreditsResponse, HistoryResponse, InitAccountRequest, InitAccountResponse,
        PackagesResponse, UseCreditsRequest, UseCreditsResponse,
    },
};

/// GET /api/v1/credits/balance/{user_id}
///
/// Auto-initializes unknown users with the launch grant before answering.
#[instrument(skip(state))]
pub async fn get_balance(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BalanceResponse>> {
    let balance = state.credits_service.get_balance(&user_id).await?;

    Ok(Json(BalanceResponse {
        success: true,
        user_id,
        balance,
        free_mode: state.credits_service.free_mode(),
    }))
}

/// POST /api/v1/credits/init
#[instrument(skip(state, request))]
pub async fn init_account(
    State(state): State<AppState>,
    Json(request): Json<InitAccountRequest>,
) -> Result<Json<InitAccountResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let (account, already_existed) = state.credits_service.init_account(&request.user_id).await?;

    let message = if already_existed {
        "User already initialized".to_string()
    } else {
        format!("Welcome! You got {} free credits!", account.balance)
    };

    Ok(Json(InitAccountResponse {
        success: true,
        balance: account.balance,
        already_existed,
        message,
    }))
}

/// POST /api/v1/credits/use
#[instrument(skip(state, request))]
pub async fn use_credits(
    State(state): State<AppState>,
    Json(request): Json<UseCreditsRequest>,
) -> Result<Json<UseCreditsResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let outcome = state
        .credits_service
        .debit(&request.user_id, request.amount, &request.description)
        .await?;

    let message = if outcome.free_mode {
        "Generated! (Free during beta - credits not deducted)".to_string()
    } else {
        format!(
            "{} credit(s) used. Balance: {}",
            outcome.credits_used, outcome.new_balance
        )
    };

    Ok(Json(UseCreditsResponse {
        success: true,
        credits_used: outcome.credits_used,
        new_balance: outcome.new_balance,
        free_mode: outcome.free_mode,
        message,
    }))
}

/// POST /api/v1/credits/grant
#[instrument(skip(state, request))]
pub async fn grant_credits(
    State(state): State<AppState>,
    Json(request): Json<GrantCreditsRequest>,
) -> Result<Json<GrantCreditsResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let account = state
        .credits_service
        .credit(
            &request.user_id,
            request.amount,
            request.kind,
            &request.description,
            request.payment_id,
        )
        .await?;

    Ok(Json(GrantCreditsResponse {
        success: true,
        new_balance: account.balance,
        total_purchased: account.total_purchased,
    }))
}

/// GET /api/v1/credits/history/{user_id}
#[instrument(skip(state))]
pub async fn get_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<HistoryResponse>> {
    let transactions = state.credits_service.get_history(&user_id).await?;
    let total = transactions.len();

    Ok(Json(HistoryResponse {
        success: true,
        transactions: transactions.into_iter().map(Into::into).collect(),
        total,
        free_mode: state.credits_service.free_mode(),
    }))
}

/// GET /api/v1/credits/packages
#[instrument(skip(state))]
pub async fn get_packages(State(state): State<AppState>) -> Json<PackagesResponse> {
    let free_mode = state.credits_service.free_mode();
    let message = if free_mode {
        "Launch Special! All features FREE during beta.".to_string()
    } else {
        "Available credit packages".to_string()
    };

    Json(PackagesResponse {
        success: true,
        free_mode,
        message,
        packages: CreditPackage::launch_catalog(state.credits_service.initial_grant()),
    })
}

/// GET /api/v1/credits/status
#[instrument(skip(state))]
pub async fn credit_system_status(State(state): State<AppState>) -> Json<CreditSystemStatus> {
    let free_mode = state.credits_service.free_mode();

    Json(CreditSystemStatus {
        free_mode,
        free_credits: state.credits_service.initial_grant(),
        message: if free_mode {
            "Launch mode: All features free!".to_string()
        } else {
            "Paid mode active".to_string()
        },
        payments_enabled: !free_mode,
    })
}
