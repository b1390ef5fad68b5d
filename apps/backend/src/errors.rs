//! Error codes for the Hearts backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication & Authorization
    Unauthorized,
    UnauthorizedMissingBearer,
    UnauthorizedInvalidToken,
    Forbidden,
    NotSeated,

    // Request validation / lobby errors
    ValidationError,
    BadRequest,
    TableFull,
    AlreadyJoined,
    WrongStatus,

    // Not found
    GameNotFound,
    NotFound,

    // System
    DbError,
    DbUnavailable,
    Internal,
    ConfigError,
    StoreUnavailable,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            Self::UnauthorizedInvalidToken => "UNAUTHORIZED_INVALID_TOKEN",
            Self::Forbidden => "FORBIDDEN",
            Self::NotSeated => "NOT_SEATED",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::TableFull => "TABLE_FULL",
            Self::AlreadyJoined => "ALREADY_JOINED",
            Self::WrongStatus => "WRONG_STATUS",
            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",
            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_are_unique() {
        let all = [
            ErrorCode::Unauthorized,
            ErrorCode::UnauthorizedMissingBearer,
            ErrorCode::UnauthorizedInvalidToken,
            ErrorCode::Forbidden,
            ErrorCode::NotSeated,
            ErrorCode::ValidationError,
            ErrorCode::BadRequest,
            ErrorCode::TableFull,
            ErrorCode::AlreadyJoined,
            ErrorCode::WrongStatus,
            ErrorCode::GameNotFound,
            ErrorCode::NotFound,
            ErrorCode::DbError,
            ErrorCode::DbUnavailable,
            ErrorCode::Internal,
            ErrorCode::ConfigError,
            ErrorCode::StoreUnavailable,
        ];
        let set: HashSet<&str> = all.iter().map(|c| c.as_str()).collect();
        assert_eq!(set.len(), all.len());
    }
}
