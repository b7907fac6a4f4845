use log::info;

use crate::db::Store;
use crate::dto::ChargeBalanceResponse;
use crate::errors::AppError;

/// Largest single top-up accepted, exclusive.
pub const MAX_RECHARGE: f64 = 1_000_000.0;

pub async fn charge_balance(user_id: i32, amount: f64, store: &dyn Store) -> Result<ChargeBalanceResponse, AppError> {
    if amount >= MAX_RECHARGE {
        return Err(AppError::validation("Maximum recharge amount is $1000000"));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::validation("Recharge amount must be greater than $0"));
    }
    if store.find_user(user_id).await?.is_none() {
        return Err(AppError::validation("Invalid user"));
    }

    let new_balance = store
        .credit_balance(user_id, amount)
        .await?
        .ok_or_else(|| AppError::validation("Invalid user"))?;
    info!("user {} charged {}, balance now {}", user_id, amount, new_balance);
    Ok(ChargeBalanceResponse {
        success: true,
        new_balance,
    })
}

pub async fn get_balance(user_id: i32, store: &dyn Store) -> Result<f64, AppError> {
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::validation("Invalid user"))?;
    Ok(user.balance)
}
