// HTTP response utilities - JSON envelope, error mapping and PNG bodies
use crate::application::errors::DashboardError;
use axum::{
    Json,
    body::Body,
    http::{HeaderValue, Response, StatusCode, header},
    response::IntoResponse,
};
use serde::Serialize;

/// `{success, data?, message?}`, the same shape the rovers answer with
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
        })
    }
}

impl ApiResponse<()> {
    pub fn ok_message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            message: Some(message.into()),
        })
    }

    pub fn failure(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: false,
            data: None,
            message: Some(message.into()),
        })
    }
}

impl DashboardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::Validation(_) => StatusCode::BAD_REQUEST,
            DashboardError::InvalidCredentials | DashboardError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            DashboardError::VehicleNotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::NoActiveVehicle | DashboardError::ScanInProgress => StatusCode::CONFLICT,
            DashboardError::ConnectionFailed { .. } | DashboardError::Remote(_) => {
                StatusCode::BAD_GATEWAY
            }
            DashboardError::Storage(_) | DashboardError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, ApiResponse::failure(self.to_string())).into_response()
    }
}

/// Serve an encoded frame as `image/png`
pub fn png_response(png: Vec<u8>) -> Result<Response<Body>, StatusCode> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/png")
        .header(header::CACHE_CONTROL, "no-store")
        .header(header::CONTENT_LENGTH, HeaderValue::from(png.len()))
        .body(Body::from(png))
        .map_err(|e| {
            tracing::error!("Response build error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_statuses() {
        assert_eq!(
            DashboardError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DashboardError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            DashboardError::VehicleNotFound("v".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(DashboardError::ScanInProgress.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            DashboardError::Remote("down".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_envelope_omits_empty_fields() {
        let Json(body) = ApiResponse::ok(vec![1, 2]);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"success": true, "data": [1, 2]})
        );

        let Json(body) = ApiResponse::failure("Invalid email or password");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"success": false, "message": "Invalid email or password"})
        );
    }

    #[test]
    fn test_png_headers() {
        let response = png_response(vec![0u8; 12]).unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "12");
    }
}
