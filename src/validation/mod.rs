//! Declarative request validation.
//!
//! A [`RuleSet`] is an ordered list of [`Rule`]s, each an ordered list of
//! `(Check, message)` pairs against one named field. Evaluation never stops at the
//! first failure: every rule and every check runs, and all violations are reported
//! together as `AppError::Validation` (HTTP 400).
//!
//! The [`Validated`] extractor evaluates `T::rules()` against the JSON body and the
//! route's path parameters before deserializing into `T`.

pub mod rules;

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{AppError, FieldViolation};

pub use rules::{TaskId, ValidationRules};

/// Where a rule looks up its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Body,
    Param,
}

/// A single predicate over a field value. `None` means the field is absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// Present, not null, and not an empty string, array or object.
    Required,
    IsString,
    /// Character count within the bounds. Absent or null counts as empty and
    /// numbers or booleans are measured as text. Arrays and objects fail.
    Length { min: Option<u64>, max: Option<u64> },
    Email,
    /// The id format check.
    Uuid,
}

impl Check {
    pub fn passes(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Check::Required, Some(value)) => match value {
                Value::Null => false,
                Value::String(s) => !s.is_empty(),
                Value::Array(items) => !items.is_empty(),
                Value::Object(fields) => !fields.is_empty(),
                _ => true,
            },
            (Check::IsString, Some(value)) => value.is_string(),
            (Check::Length { min, max }, value) => {
                let text = match value {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    Some(_) => return false,
                };
                validator::validate_length(text.as_str(), *min, *max, None)
            }
            (Check::Email, Some(Value::String(s))) => validator::validate_email(s.as_str()),
            (Check::Uuid, Some(Value::String(s))) => Uuid::parse_str(s).is_ok(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub location: Location,
    pub field: &'static str,
    /// Absent optional fields skip every check. `null` still counts as present.
    pub optional: bool,
    pub checks: Vec<(Check, &'static str)>,
}

impl Rule {
    pub fn body(field: &'static str) -> Self {
        Self {
            location: Location::Body,
            field,
            optional: false,
            checks: Vec::new(),
        }
    }

    pub fn param(field: &'static str) -> Self {
        Self {
            location: Location::Param,
            ..Self::body(field)
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn check(mut self, check: Check, message: &'static str) -> Self {
        self.checks.push((check, message));
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Runs every rule and returns all violations in rule order.
    pub fn evaluate(&self, params: &Map<String, Value>, body: &Value) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        for rule in &self.rules {
            let value = match rule.location {
                Location::Body => body.get(rule.field),
                Location::Param => params.get(rule.field),
            };
            if rule.optional && value.is_none() {
                continue;
            }
            for (check, message) in &rule.checks {
                if !check.passes(value) {
                    violations.push(FieldViolation {
                        field: rule.field.to_string(),
                        message: message.to_string(),
                    });
                }
            }
        }

        violations
    }

    pub fn check(&self, params: &Map<String, Value>, body: &Value) -> Result<(), AppError> {
        let violations = self.evaluate(params, body);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(violations))
        }
    }
}

/// Path parameters of the matched route as a JSON object.
pub fn path_params(req: &HttpRequest) -> Map<String, Value> {
    req.match_info()
        .iter()
        .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
        .collect()
}

/// JSON body that passed `T::rules()`.
#[derive(Debug)]
pub struct Validated<T>(pub T);

impl<T> Validated<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> FromRequest for Validated<T>
where
    T: ValidationRules + DeserializeOwned + 'static,
{
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        let json = web::Json::<Value>::from_request(&req, payload);

        Box::pin(async move {
            let body = json
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?
                .into_inner();

            T::rules().check(&path_params(&req), &body)?;

            serde_json::from_value(body)
                .map(Validated)
                .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))
        })
    }
}
