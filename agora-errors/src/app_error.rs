use crate::FieldErrors;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("Non authentifié")]
    Unauthenticated,

    #[error("Profil incomplet")]
    RegistrationIncomplete,

    #[error("Accès refusé: {0}")]
    Forbidden(String),

    #[error("Introuvable: {0}")]
    NotFound(String),

    #[error("Données invalides: {0}")]
    Validation(FieldErrors),

    #[error("Conflit: {0}")]
    Conflict(String),

    #[error("Erreur de base de données: {0}")]
    Database(String),

    #[error("Erreur de téléchargement: {0}")]
    Storage(String),

    #[error("Erreur d'authentification: {0}")]
    Identity(String),

    #[error("Erreur interne: {0}")]
    Internal(String),
}

impl FromStr for AppError {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("Non authentifié") {
            Ok(AppError::Unauthenticated)
        } else if s.starts_with("Profil incomplet") {
            Ok(AppError::RegistrationIncomplete)
        } else if s.starts_with("Accès refusé") {
            Ok(AppError::Forbidden(s.to_string()))
        } else if s.starts_with("Introuvable") {
            Ok(AppError::NotFound(s.to_string()))
        } else if s.starts_with("Conflit") {
            Ok(AppError::Conflict(s.to_string()))
        } else if s.starts_with("Erreur de base de données") {
            Ok(AppError::Database(s.to_string()))
        } else if s.starts_with("Erreur de téléchargement") {
            Ok(AppError::Storage(s.to_string()))
        } else if s.starts_with("Erreur d'authentification") {
            Ok(AppError::Identity(s.to_string()))
        } else {
            Ok(AppError::Internal(s.to_string()))
        }
    }
}

impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Vous devez être connecté pour continuer.".to_string(),
            Self::RegistrationIncomplete => {
                "Complétez votre profil avant de continuer.".to_string()
            }
            Self::Forbidden(_) => "Vous n'avez pas les droits pour cette action.".to_string(),
            Self::NotFound(what) => format!("{what} introuvable."),
            Self::Validation(errors) => errors.to_string(),
            Self::Conflict(msg) => msg.clone(),
            // create/update/delete flows show the raw backend message inline
            Self::Database(msg) => format!("Une erreur est survenue: {msg}"),
            Self::Storage(msg) => format!("Échec du téléchargement de l'image: {msg}"),
            Self::Identity(_) => "Connexion impossible. Réessayez plus tard.".to_string(),
            Self::Internal(_) => "Un problème est survenu. Réessayez plus tard.".to_string(),
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(field, message);
        Self::Validation(errors)
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

#[cfg(feature = "ssr")]
mod ssr_impl {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    #[derive(serde::Serialize)]
    struct ErrorResponse {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        fields: Option<crate::FieldErrors>,
    }

    impl AppError {
        pub fn status_code(&self) -> StatusCode {
            match self {
                AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
                AppError::RegistrationIncomplete | AppError::Forbidden(_) => {
                    StatusCode::FORBIDDEN
                }
                AppError::NotFound(_) => StatusCode::NOT_FOUND,
                AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AppError::Conflict(_) => StatusCode::CONFLICT,
                AppError::Storage(_) | AppError::Identity(_) => StatusCode::BAD_GATEWAY,
                AppError::Database(_) | AppError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }

        /// Error handed back from a Leptos server function.
        pub fn to_server_error(&self) -> server_fn::ServerFnError {
            server_fn::ServerFnError::new(self.user_message())
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = self.status_code();
            if status.is_server_error() {
                tracing::error!("request failed: {}", self);
            }
            let fields = match &self {
                AppError::Validation(errors) => Some(errors.clone()),
                _ => None,
            };
            let body = ErrorResponse {
                message: self.user_message(),
                fields,
            };
            (status, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_display() {
        let err = AppError::NotFound("Événement".to_string());
        let parsed: AppError = err.to_string().parse().unwrap();
        assert!(matches!(parsed, AppError::NotFound(_)));

        let parsed: AppError = AppError::Unauthenticated.to_string().parse().unwrap();
        assert!(matches!(parsed, AppError::Unauthenticated));
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let mut errors = FieldErrors::new();
        errors.push("title", "Le titre est requis");
        errors.push("contact", "Le contact est requis");
        let msg = AppError::from(errors).user_message();
        assert!(msg.contains("title: Le titre est requis"));
        assert!(msg.contains("contact: Le contact est requis"));
    }
}
