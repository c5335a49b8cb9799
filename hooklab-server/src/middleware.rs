use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::ApiError;
use crate::state::AppState;
use hooklab_types::User;

pub const SESSION_HEADER: &str = "X-Session-Token";

/// Who is making the request, resolved once from the session header
#[derive(Clone, Debug, Default)]
pub struct RequestIdentity {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl RequestIdentity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User, token: String) -> Self {
        Self {
            user: Some(user),
            token: Some(token),
        }
    }

    pub fn require_user(&self) -> Result<&User, ApiError> {
        self.user
            .as_ref()
            .ok_or_else(|| ApiError::Unauthorized("You must be logged in".to_string()))
    }

    /// Authentication first, then the admin bit
    pub fn require_admin(&self) -> Result<&User, ApiError> {
        let user = self.require_user()?;
        if !user.is_admin {
            return Err(ApiError::Forbidden("Not authorized".to_string()));
        }
        Ok(user)
    }
}

/// Resolve the session token (if any) into a `RequestIdentity` extension.
///
/// Missing, unknown or expired tokens all become an anonymous identity;
/// handlers decide whether that is acceptable.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let identity = match token {
        Some(token) => match resolve(&state, &token) {
            Ok(Some(user)) => RequestIdentity::authenticated(user, token),
            Ok(None) => RequestIdentity::anonymous(),
            Err(e) => {
                tracing::debug!("Ignoring session token: {:#}", e);
                RequestIdentity::anonymous()
            }
        },
        None => RequestIdentity::anonymous(),
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}

fn resolve(state: &AppState, token: &str) -> anyhow::Result<Option<User>> {
    let user_id = state.session_manager.validate_session(token)?;
    state.users().get_by_id(&user_id)
}
