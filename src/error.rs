use actix_web::{http::header, http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;
use thiserror::Error;

use crate::locale::Locale;

/// Kind of record a lookup was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Driver,
    Passenger,
    TravelRequest,
    User,
}

impl Resource {
    fn name(&self, locale: Locale) -> &'static str {
        match self {
            Resource::Driver => locale.text("Motorista", "Driver"),
            Resource::Passenger => locale.text("Passageiro", "Passenger"),
            Resource::TravelRequest => locale.text("Solicitação de viagem", "Travel request"),
            Resource::User => locale.text("Usuário", "User"),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name(Locale::En))
    }
}

/// What is wrong with an input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    Empty,
    Length { min: usize, max: usize },
    Malformed(String),
}

/// A rejected input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub problem: FieldProblem,
}

impl FieldError {
    pub fn missing(field: &str) -> Self {
        Self { field: field.to_string(), problem: FieldProblem::Missing }
    }

    pub fn empty(field: &str) -> Self {
        Self { field: field.to_string(), problem: FieldProblem::Empty }
    }

    pub fn length(field: &str, min: usize, max: usize) -> Self {
        Self { field: field.to_string(), problem: FieldProblem::Length { min, max } }
    }

    pub fn malformed(field: &str, detail: impl Into<String>) -> Self {
        Self { field: field.to_string(), problem: FieldProblem::Malformed(detail.into()) }
    }

    fn message(&self, locale: Locale) -> String {
        let field = &self.field;
        match (&self.problem, locale) {
            (FieldProblem::Missing, Locale::PtBr) => format!("O campo '{}' é obrigatório", field),
            (FieldProblem::Missing, Locale::En) => format!("Field '{}' is required", field),
            (FieldProblem::Empty, Locale::PtBr) => format!("O campo '{}' não pode estar vazio", field),
            (FieldProblem::Empty, Locale::En) => format!("Field '{}' must not be empty", field),
            (FieldProblem::Length { min, max }, Locale::PtBr) => {
                format!("O campo '{}' deve ter entre {} e {} caracteres", field, min, max)
            }
            (FieldProblem::Length { min, max }, Locale::En) => {
                format!("Field '{}' must have between {} and {} characters", field, min, max)
            }
            (FieldProblem::Malformed(detail), Locale::PtBr) => {
                format!("O campo '{}' é inválido: {}", field, detail)
            }
            (FieldProblem::Malformed(detail), Locale::En) => {
                format!("Field '{}' is invalid: {}", field, detail)
            }
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message(Locale::En))
    }
}

#[derive(Error, Debug)]
pub enum CtrError {
    #[error("{resource} {id} not found")]
    NotFound { resource: Resource, id: i64 },

    #[error("Invalid request data: {0}")]
    Validation(FieldError),

    #[error("Directions service failure: {0}")]
    ExternalService(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl CtrError {
    pub fn not_found(resource: Resource, id: i64) -> Self {
        CtrError::NotFound { resource, id }
    }

    /// Machine readable error code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            CtrError::NotFound { .. } => "not_found",
            CtrError::Validation(_) => "validation_error",
            CtrError::ExternalService(_) => "service_unavailable",
            CtrError::Unauthorized => "unauthorized",
            CtrError::Forbidden => "forbidden",
            CtrError::Conflict(_) => "conflict",
            CtrError::Config(_) | CtrError::Internal(_) => "internal_error",
        }
    }

    /// Client facing message in the given locale. Internal details are never exposed.
    pub fn message(&self, locale: Locale) -> String {
        match self {
            CtrError::NotFound { resource, id } => match locale {
                Locale::PtBr => format!("{} {} não encontrado", resource.name(locale), id),
                Locale::En => format!("{} {} not found", resource.name(locale), id),
            },
            CtrError::Validation(field) => field.message(locale),
            CtrError::ExternalService(_) => locale
                .text(
                    "O serviço de rotas está indisponível no momento",
                    "The directions service is currently unavailable",
                )
                .to_string(),
            CtrError::Unauthorized => locale
                .text("Autenticação necessária", "Authentication required")
                .to_string(),
            CtrError::Forbidden => locale
                .text(
                    "Você não tem permissão para executar esta operação",
                    "You are not allowed to perform this operation",
                )
                .to_string(),
            CtrError::Conflict(_) => locale
                .text(
                    "O registro está em uso e não pode ser removido",
                    "The record is in use and cannot be removed",
                )
                .to_string(),
            CtrError::Config(_) | CtrError::Internal(_) => locale
                .text("Ocorreu um erro interno no servidor", "An internal server error occurred")
                .to_string(),
        }
    }

    /// Renders the error as an HTTP response in the given locale.
    pub fn response_for(&self, locale: Locale) -> HttpResponse {
        match self {
            CtrError::ExternalService(detail) => {
                log::warn!("Directions service failure: {}", detail);
            }
            CtrError::Config(detail) | CtrError::Internal(detail) => {
                log::error!("Internal error: {}", detail);
            }
            _ => {}
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let CtrError::Unauthorized = self {
            builder.insert_header((header::WWW_AUTHENTICATE, r#"Basic realm="ctr""#));
        }
        builder
            .insert_header((header::CONTENT_LANGUAGE, locale.tag()))
            .json(json!({
                "error": self.code(),
                "message": self.message(locale)
            }))
    }

    pub fn localized(self, locale: Locale) -> LocalizedError {
        LocalizedError { error: self, locale }
    }
}

impl From<FieldError> for CtrError {
    fn from(err: FieldError) -> Self {
        CtrError::Validation(err)
    }
}

impl ResponseError for CtrError {
    fn status_code(&self) -> StatusCode {
        match self {
            CtrError::NotFound { .. } => StatusCode::NOT_FOUND,
            CtrError::Validation(_) => StatusCode::BAD_REQUEST,
            CtrError::ExternalService(_) => StatusCode::SERVICE_UNAVAILABLE,
            CtrError::Unauthorized => StatusCode::UNAUTHORIZED,
            CtrError::Forbidden => StatusCode::FORBIDDEN,
            CtrError::Conflict(_) => StatusCode::CONFLICT,
            CtrError::Config(_) | CtrError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.response_for(Locale::default())
    }
}

/// An error bound to the locale of the request that produced it.
/// Used where actix renders the error itself (extractors).
#[derive(Error, Debug)]
#[error("{error}")]
pub struct LocalizedError {
    pub error: CtrError,
    pub locale: Locale,
}

impl ResponseError for LocalizedError {
    fn status_code(&self) -> StatusCode {
        self.error.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        self.error.response_for(self.locale)
    }
}
