//! Error responses of the HTTP API

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::model::ModelError;
use crate::query::QueryError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Parâmetros de data_inicial e data_final são obrigatórios.")]
    MissingDates,

    #[error("Formato de data inválido. Use o formato YYYY-MM-DD.")]
    InvalidDate,

    #[error("Parâmetro {name} inválido: {value:?} não é um número inteiro positivo.")]
    InvalidNumber { name: &'static str, value: String },

    #[error("Parâmetro limite inválido: {value} excede o máximo de {max}.")]
    PageSizeTooLarge { value: u32, max: u32 },

    #[error("{0}")]
    InvalidRequest(#[from] ModelError),

    #[error("Nenhum dado encontrado para o intervalo de datas fornecido.")]
    NoData,

    #[error("Banco de dados indisponível: {0}")]
    Backend(#[from] QueryError),

    #[error("Os dados ainda não foram carregados.")]
    SnapshotUnavailable,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingDates
            | Self::InvalidDate
            | Self::InvalidNumber { .. }
            | Self::PageSizeTooLarge { .. }
            | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NoData => StatusCode::NOT_FOUND,
            Self::Backend(_) | Self::SnapshotUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // an empty result is an answer, not a failure
        let body = match self {
            Self::NoData => json!({ "message": self.to_string() }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
