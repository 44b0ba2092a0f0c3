use app_cryptography::jwt::{Algorithm, Claims, SessionInfo, generate_token, validate_token};
use app_dto::auth::login::PostLoginOutput;
use app_error::AppError;
use app_schema::auth::user::{AuthUser, Role};
use app_state::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::*;

pub const ACCESS_TOKEN_HEADER: &str = "x-auth-access-token";
pub const NOT_LOGGED_IN: &str = "You are not logged in! Please log in to get access.";
pub const NO_PERMISSION: &str = "You do not have permission to perform this action";

fn access_token(state: &AppState, user: &AuthUser) -> Result<String, AppError> {
    let now = Utc::now();
    let exp = now + Duration::minutes(state.config.jwt_access_session_minutes);
    let claims = Claims::new(user, now.timestamp(), exp.timestamp());
    Ok(generate_token(
        Algorithm::HS256,
        &state.config.jwt_access_key,
        &claims,
    )?)
}

/// Mints both tokens for a freshly authenticated user and records the
/// refresh token under the user's session key.
pub async fn issue_tokens(state: &AppState, user: &AuthUser) -> Result<PostLoginOutput, AppError> {
    let now = Utc::now();
    let refresh_days = state.config.jwt_refresh_session_days;
    let refresh_exp = now + Duration::days(refresh_days);
    let refresh_claims = Claims::new(user, now.timestamp(), refresh_exp.timestamp());
    let refresh_token = generate_token(
        Algorithm::HS256,
        &state.config.jwt_refresh_key,
        &refresh_claims,
    )?;
    let info = SessionInfo {
        id: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
        session: user.session,
        token: refresh_token.clone(),
    };
    let ttl = u64::try_from(refresh_days.max(1) * 24 * 60 * 60).unwrap_or(u64::MAX);
    state
        .sessions
        .set(&user.session_key(), &serde_json::to_string(&info)?, ttl)
        .await?;
    Ok(PostLoginOutput {
        access_token: access_token(state, user)?,
        refresh_token,
    })
}

pub async fn revoke_session(state: &AppState, user: &AuthUser) -> Result<(), AppError> {
    state.sessions.del(&[&user.session_key()]).await
}

/// Splits `Bearer <access_token> <refresh_token>`.
fn bearer_tokens(header: &str) -> Option<(&str, &str)> {
    let mut parts = header.split_whitespace();
    let scheme = parts.next()?;
    let access = parts.next()?;
    let refresh = parts.next()?;
    if !scheme.eq_ignore_ascii_case("bearer") || parts.next().is_some() {
        return None;
    }
    Some((access, refresh))
}

/// Falls back to the refresh token when the access token is no longer valid.
/// The refresh token must still be the one stored for its session.
async fn refresh_access(
    state: &AppState,
    refresh_token: &str,
) -> Result<Option<(AuthUser, String)>, AppError> {
    let Ok(data) =
        validate_token::<Claims>(Algorithm::HS256, &state.config.jwt_refresh_key, refresh_token)
    else {
        return Ok(None);
    };
    let user = data.claims.user();
    let Some(stored) = state.sessions.get(&user.session_key()).await? else {
        return Ok(None);
    };
    let info: SessionInfo = serde_json::from_str(&stored)?;
    if info.token != refresh_token {
        return Ok(None);
    }
    let token = access_token(state, &user)?;
    Ok(Some((user, token)))
}

pub async fn web_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    info!(
        "Authorization Middleware Running for {} {}",
        req.method(),
        req.uri()
    );

    let unauthorized = || AppError::unauthorized(NOT_LOGGED_IN).into_response();

    let header: String = match req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        Some(v) => v.to_owned(),
        None => return unauthorized(),
    };
    let Some((access, refresh)) = bearer_tokens(&header) else {
        return unauthorized();
    };

    let (user, token) = match validate_token::<Claims>(
        Algorithm::HS256,
        &state.config.jwt_access_key,
        access,
    ) {
        Ok(data) => {
            info!("User {} approved using access token", data.claims.email);
            (data.claims.user(), access.to_owned())
        }
        Err(_) => match refresh_access(&state, refresh).await {
            Ok(Some((user, token))) => {
                info!("User {} approved using refresh token", user.email);
                (user, token)
            }
            Ok(None) => return unauthorized(),
            Err(e) => return e.into_response(),
        },
    };

    req.extensions_mut().insert(user);
    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&token) {
        res.headers_mut().insert(ACCESS_TOKEN_HEADER, value);
    }
    res
}

fn require_role(req: &Request, role: Role) -> Result<(), AppError> {
    match req.extensions().get::<AuthUser>() {
        None => Err(AppError::unauthorized(NOT_LOGGED_IN)),
        Some(user) if user.role != role => Err(AppError::forbidden(NO_PERMISSION)),
        Some(_) => Ok(()),
    }
}

/// Runs after [`web_auth_middleware`]; admits staff only.
pub async fn staff_only(req: Request, next: Next) -> Response {
    match require_role(&req, Role::Staff) {
        Ok(()) => next.run(req).await,
        Err(e) => e.into_response(),
    }
}

/// Runs after [`web_auth_middleware`]; admits customers only.
pub async fn customer_only(req: Request, next: Next) -> Response {
    match require_role(&req, Role::Customer) {
        Ok(()) => next.run(req).await,
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use app_config::AppConfig;
    use axum::{
        Extension, Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
    };
    use tower::ServiceExt;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            id: match role {
                Role::Customer => "7".to_owned(),
                Role::Staff => "5f0c2c52-3f3a-4a39-9bd8-4c8f07a1c0de".to_owned(),
            },
            name: "Unit".to_owned(),
            email: "unit@a2hl.test".to_owned(),
            role,
            session: 42,
        }
    }

    fn app(state: Arc<AppState>) -> Router {
        let customers = Router::new()
            .route(
                "/customer",
                get(|Extension(user): Extension<AuthUser>| async move { user.email }),
            )
            .layer(middleware::from_fn(customer_only));
        Router::new()
            .merge(customers)
            .layer(middleware::from_fn_with_state(
                state.clone(),
                web_auth_middleware,
            ))
            .with_state(state)
    }

    fn request(authorization: Option<String>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/customer");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn expired_access(state: &AppState, user: &AuthUser) -> String {
        let claims = Claims::new(user, 0, Utc::now().timestamp() - 3600);
        generate_token(Algorithm::HS256, &state.config.jwt_access_key, &claims).unwrap()
    }

    #[test]
    fn bearer_header_needs_both_tokens() {
        assert_eq!(bearer_tokens("Bearer a r"), Some(("a", "r")));
        assert_eq!(bearer_tokens("bearer a r"), Some(("a", "r")));
        assert_eq!(bearer_tokens("Bearer a"), None);
        assert_eq!(bearer_tokens("Basic a r"), None);
        assert_eq!(bearer_tokens("Bearer a r x"), None);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let (state, _) = AppState::in_memory(AppConfig::default());
        let res = app(Arc::new(state)).oneshot(request(None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_access_token_is_echoed() {
        let (state, _) = AppState::in_memory(AppConfig::default());
        let tokens = issue_tokens(&state, &user(Role::Customer)).await.unwrap();
        let res = app(Arc::new(state))
            .oneshot(request(Some(format!(
                "Bearer {} {}",
                tokens.access_token, tokens.refresh_token
            ))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(ACCESS_TOKEN_HEADER).unwrap(),
            tokens.access_token.as_str()
        );
    }

    #[tokio::test]
    async fn stored_refresh_token_mints_new_access_token() {
        let (state, _) = AppState::in_memory(AppConfig::default());
        let customer = user(Role::Customer);
        let tokens = issue_tokens(&state, &customer).await.unwrap();
        let stale = expired_access(&state, &customer);
        let state = Arc::new(state);

        let res = app(state.clone())
            .oneshot(request(Some(format!("Bearer {} {}", stale, tokens.refresh_token))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let fresh = res.headers().get(ACCESS_TOKEN_HEADER).unwrap().to_str().unwrap();
        assert_ne!(fresh, stale);

        revoke_session(&state, &customer).await.unwrap();
        let res = app(state)
            .oneshot(request(Some(format!("Bearer {} {}", stale, tokens.refresh_token))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_role_is_forbidden() {
        let (state, _) = AppState::in_memory(AppConfig::default());
        let tokens = issue_tokens(&state, &user(Role::Staff)).await.unwrap();
        let res = app(Arc::new(state))
            .oneshot(request(Some(format!(
                "Bearer {} {}",
                tokens.access_token, tokens.refresh_token
            ))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
