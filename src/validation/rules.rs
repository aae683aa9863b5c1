use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use lazy_static::lazy_static;
use serde_json::Value;
use std::future::{ready, Ready};
use uuid::Uuid;

use super::{path_params, Check, Rule, RuleSet};
use crate::auth::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::error::AppError;
use crate::models::{CreateTaskInput, UpdateTaskInput};

/// Ties a request payload type to the rules checked before it is deserialized.
pub trait ValidationRules {
    fn rules() -> &'static RuleSet;
}

const TITLE_LENGTH: Check = Check::Length {
    min: Some(3),
    max: Some(100),
};

// Matches the VARCHAR(255) columns of `users`.
const USER_FIELD_LENGTH: Check = Check::Length {
    min: None,
    max: Some(255),
};

lazy_static! {
    pub static ref CREATE_TASK_RULES: RuleSet = RuleSet::new(vec![
        Rule::body("title")
            .check(Check::Required, "Title is required")
            .check(Check::IsString, "Title must be a string")
            .check(TITLE_LENGTH, "Title must be between 3 and 100 characters"),
        Rule::body("description")
            .optional()
            .check(Check::IsString, "Description must be a string"),
    ]);

    pub static ref UPDATE_TASK_RULES: RuleSet = RuleSet::new(vec![
        Rule::param("id").check(Check::Uuid, "Invalid task ID"),
        Rule::body("title")
            .optional()
            .check(Check::IsString, "Title must be a string")
            .check(TITLE_LENGTH, "Title must be between 3 and 100 characters"),
        Rule::body("description")
            .optional()
            .check(Check::IsString, "Description must be a string"),
    ]);

    pub static ref TASK_ID_RULES: RuleSet = RuleSet::new(vec![
        Rule::param("id").check(Check::Uuid, "Invalid task ID"),
    ]);

    pub static ref REGISTER_RULES: RuleSet = RuleSet::new(vec![
        Rule::body("name")
            .check(Check::Required, "Name is required")
            .check(Check::IsString, "Name must be a string")
            .check(USER_FIELD_LENGTH, "Name must be at most 255 characters"),
        Rule::body("email")
            .check(Check::Required, "Email is required")
            .check(Check::Email, "Please provide a valid email")
            .check(USER_FIELD_LENGTH, "Email must be at most 255 characters"),
        Rule::body("password")
            .check(Check::Required, "Password is required")
            .check(Check::IsString, "Password must be a string")
            .check(
                Check::Length { min: Some(6), max: None },
                "Password must be at least 6 characters",
            ),
    ]);

    pub static ref LOGIN_RULES: RuleSet = RuleSet::new(vec![
        Rule::body("email")
            .check(Check::Required, "Email is required")
            .check(Check::Email, "Please provide a valid email"),
        Rule::body("password")
            .check(Check::Required, "Password is required")
            .check(Check::IsString, "Password must be a string"),
    ]);

    pub static ref REFRESH_RULES: RuleSet = RuleSet::new(vec![
        Rule::body("refreshToken")
            .check(Check::Required, "Refresh token is required")
            .check(Check::IsString, "Refresh token must be a string"),
    ]);
}

impl ValidationRules for CreateTaskInput {
    fn rules() -> &'static RuleSet {
        &CREATE_TASK_RULES
    }
}

impl ValidationRules for UpdateTaskInput {
    fn rules() -> &'static RuleSet {
        &UPDATE_TASK_RULES
    }
}

impl ValidationRules for RegisterRequest {
    fn rules() -> &'static RuleSet {
        &REGISTER_RULES
    }
}

impl ValidationRules for LoginRequest {
    fn rules() -> &'static RuleSet {
        &LOGIN_RULES
    }
}

impl ValidationRules for RefreshRequest {
    fn rules() -> &'static RuleSet {
        &REFRESH_RULES
    }
}

/// The `{id}` path segment of a task route, checked against [`TASK_ID_RULES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Parses a segment that already passed the id rule.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        Uuid::parse_str(raw)
            .map(TaskId)
            .map_err(|_| AppError::BadRequest("Invalid task ID".into()))
    }
}

impl FromRequest for TaskId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let params = path_params(req);
        ready(TASK_ID_RULES.check(&params, &Value::Null).and_then(|_| {
            let raw = params.get("id").and_then(Value::as_str).unwrap_or_default();
            TaskId::parse(raw)
        }))
    }
}
