use crate::error::AppError;
use bcrypt::{hash, verify};

/// Cost used when none is configured, matching the hashes already stored by earlier deployments.
pub const DEFAULT_HASH_COST: u32 = 10;

pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "Qwerty@123";
        let hashed = hash_password(password, TEST_COST).unwrap();

        assert_ne!(hashed, password);
        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("Qwerty@124", &hashed).unwrap());
    }

    #[test]
    fn test_invalid_cost_is_an_error() {
        assert!(matches!(
            hash_password("Qwerty@123", 1),
            Err(AppError::InternalServerError(_))
        ));
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        match verify_password("Qwerty@123", "invalidhashformat") {
            Err(AppError::InternalServerError(msg)) => {
                assert!(msg.contains("Failed to verify password"));
            }
            Ok(false) => {}
            Ok(true) => panic!("Password verification should fail for invalid hash format"),
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }
}
