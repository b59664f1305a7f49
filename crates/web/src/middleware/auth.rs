use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use storage::{
    credentials::verify_password, error::StorageError,
    repository::participant::ParticipantRepository,
};

use crate::error::{WebError, WebResult};
use crate::state::AppState;

/// The participant a request acts for, if it carried valid credentials
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requester(pub Option<i64>);

impl Requester {
    pub fn id(&self) -> Option<i64> {
        self.0
    }

    /// Mutations need a known requester
    pub fn require(&self) -> WebResult<i64> {
        self.0.ok_or(WebError::Unauthorized)
    }
}

/// Attach a [`Requester`] to every request. Missing credentials yield an
/// anonymous requester; wrong ones are rejected outright.
pub async fn identify(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let requester = match request.headers().get(AUTHORIZATION) {
        None => Requester(None),
        Some(value) => {
            let (username, password) = parse_basic(value).ok_or(WebError::Unauthorized)?;
            Requester(Some(authenticate(&state, &username, &password).await?))
        }
    };

    request.extensions_mut().insert(requester);
    Ok(next.run(request).await)
}

async fn authenticate(state: &AppState, username: &str, password: &str) -> WebResult<i64> {
    let participant = match ParticipantRepository::new(state.db.pool())
        .find_by_username(username)
        .await
    {
        Ok(participant) => participant,
        Err(StorageError::NotFound) => {
            tracing::warn!("Login attempt for unknown user '{}'", username);
            return Err(WebError::Unauthorized);
        }
        Err(e) => return Err(e.into()),
    };

    let valid = participant
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(password, hash));
    if !valid {
        tracing::warn!("Invalid password for '{}'", username);
        return Err(WebError::Unauthorized);
    }

    Ok(participant.id)
}

fn parse_basic(value: &HeaderValue) -> Option<(String, String)> {
    let encoded = value.to_str().ok()?.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (username, password) = text.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let header = HeaderValue::from_str(&format!("Basic {}", STANDARD.encode("jim:s3:cret")))
            .unwrap();
        assert_eq!(
            parse_basic(&header),
            Some(("jim".to_string(), "s3:cret".to_string()))
        );
    }

    #[test]
    fn test_parse_basic_rejects_other_schemes() {
        assert_eq!(parse_basic(&HeaderValue::from_static("Bearer abc")), None);
        assert_eq!(parse_basic(&HeaderValue::from_static("Basic !!!")), None);
    }
}
