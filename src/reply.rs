//! Handler reply types.
//!
//! A handler either names a client-side view and hands it a context, or
//! returns the bare API envelope. Both serialize to JSON; the front end
//! decides how to render them.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub enum Reply {
    /// Named view plus the context the renderer feeds into it.
    View { view: &'static str, context: Value },

    /// Plain envelope for operations with no view.
    Api {
        success: bool,
        message: Option<String>,
        data: Option<Value>,
    },
}

impl Reply {
    pub fn view(view: &'static str, context: Value) -> Self {
        Self::View { view, context }
    }

    pub fn ok() -> Self {
        Self::Api {
            success: true,
            message: None,
            data: None,
        }
    }

    pub fn data(data: Value) -> Self {
        Self::Api {
            success: true,
            message: None,
            data: Some(data),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Self::View { view, context } => Json(json!({
                "view": view,
                "context": context,
            }))
            .into_response(),
            Self::Api {
                success,
                message,
                data,
            } => Json(json!({
                "success": success,
                "message": message,
                "data": data,
            }))
            .into_response(),
        }
    }
}
