use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
};

pub fn require_staff(claims: &Claims) -> AppResult<()> {
    if !claims.role.is_staff() {
        return Err(AppError::Forbidden(
            "Only staff can perform this action".to_string(),
        ));
    }
    Ok(())
}
