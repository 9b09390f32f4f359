use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db::{
    now_rfc3339, to_timestamp, CheckUserRequest, CheckUserResponse, CurrentUserResponse,
    LoginRequest, LoginResponse, MessageResponse, PasswordResetConfirm, PasswordResetRequest,
    PasswordResetRequestResponse, RegisterRequest, RegisterResponse, Session, User, UserResponse,
};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    normalize_email, normalize_phone, validate_email, validate_password, validate_person_name,
    validate_phone,
};

/// Cookie carrying the session token for browser clients
pub const SESSION_COOKIE: &str = "easyevents_session";

/// Lifetime of a password reset token
const RESET_TOKEN_MINUTES: i64 = 60;

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Generate a random token
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Hash a token for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Build the session cookie. `max_age` of `None` makes it a browser-session cookie.
fn session_cookie(token: &str, max_age: Option<i64>, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    if let Some(seconds) = max_age {
        cookie = cookie.max_age(time::Duration::seconds(seconds));
    }
    if secure {
        cookie = cookie.secure(true);
    }
    cookie.build()
}

/// Insert a session row and return the raw token
async fn create_session(
    pool: &sqlx::SqlitePool,
    user_id: &str,
    lifetime: chrono::Duration,
) -> Result<String, ApiError> {
    let token = generate_token();
    let token_hash = hash_token(&token);
    let expires_at = to_timestamp(chrono::Utc::now() + lifetime);

    sqlx::query("INSERT INTO sessions (id, user_id, token_hash, expires_at) VALUES (?, ?, ?, ?)")
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(&token_hash)
        .bind(&expires_at)
        .execute(pool)
        .await?;

    Ok(token)
}

/// Delete sessions whose expiry has passed; returns the number of rows removed
pub async fn purge_expired_sessions(pool: &sqlx::SqlitePool) -> Result<u64, ApiError> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now_rfc3339())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Register a new user
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let first_name = request.first_name.trim().to_string();
    let last_name = request.last_name.trim().to_string();
    let email = normalize_email(&request.email);
    let phone = request.phone.trim().to_string();

    if first_name.is_empty() || last_name.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("כל השדות הנדרשים חייבים להיות מלאים"));
    }

    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("firstName", validate_person_name(&first_name))
        .check("lastName", validate_person_name(&last_name))
        .check("email", validate_email(&email))
        .check("phone", validate_phone(&phone))
        .check("password", validate_password(&request.password));
    errors.finish()?;

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("משתמש עם אימייל זה כבר קיים במערכת").with_redirect("/login"));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let password_hash = hash_password(&request.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("שגיאה בשמירת המשתמש")
    })?;
    let now = now_rfc3339();
    let phone = if phone.is_empty() {
        None
    } else {
        Some(normalize_phone(&phone))
    };

    sqlx::query(
        r#"
        INSERT INTO users (id, first_name, last_name, email, phone, password_hash, newsletter, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&first_name)
    .bind(&last_name)
    .bind(&email)
    .bind(&phone)
    .bind(&password_hash)
    .bind(request.newsletter)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create user: {}", e);
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::conflict("משתמש עם אימייל זה כבר קיים במערכת").with_redirect("/login")
        } else {
            ApiError::database("שגיאה בשמירת המשתמש")
        }
    })?;

    info!(user_id = %id, "Registered new user");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "ההרשמה בוצעה בהצלחה!".to_string(),
            user: UserResponse {
                id,
                first_name,
                last_name,
                email,
                phone,
            },
        }),
    ))
}

/// Login endpoint; sets the session cookie and also returns the token for API clients
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let email = normalize_email(&request.email);

    if email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("נא למלא את כל השדות"));
    }
    if let Err(e) = validate_email(&email) {
        return Err(ApiError::validation_field("email", e));
    }

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    let user = user.ok_or_else(|| {
        ApiError::not_found("המשתמש אינו קיים במערכת. האם תרצה להירשם?").with_redirect("/register")
    })?;

    if !verify_password(&request.password, &user.password_hash) {
        warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(ApiError::unauthorized("הסיסמה שגויה. נסה שוב."));
    }

    let auth = &state.config.auth;
    let (lifetime, max_age) = if request.remember {
        let lifetime = chrono::Duration::days(auth.remember_days);
        (lifetime, Some(lifetime.num_seconds()))
    } else {
        (chrono::Duration::hours(auth.session_hours), None)
    };

    let purged = purge_expired_sessions(&state.db).await?;
    if purged > 0 {
        debug!(purged, "Removed expired sessions");
    }

    let token = create_session(&state.db, &user.id, lifetime).await?;
    let jar = jar.add(session_cookie(&token, max_age, auth.cookie_secure));

    info!(user_id = %user.id, remember = request.remember, "User logged in");

    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            message: format!("שלום {}! התחברת בהצלחה", user.first_name),
            token,
            user: UserResponse::from(user),
        }),
    ))
}

/// Logout: drop the session row and the cookie
pub async fn logout(
    State(state): State<Arc<AppState>>,
    user: User,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    if let Some(token) = extract_token(&headers) {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(hash_token(&token))
            .execute(&state.db)
            .await?;
    }

    info!(user_id = %user.id, "User logged out");

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Json(MessageResponse::ok("התנתקת בהצלחה"))))
}

/// Current logged-in user, if any
pub async fn current_user(user: Option<User>) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        authenticated: user.is_some(),
        user: user.map(UserResponse::from),
    })
}

/// Check if a user exists by email
pub async fn check_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CheckUserRequest>,
) -> Result<Json<CheckUserResponse>, ApiError> {
    let email = normalize_email(&request.email);
    if email.is_empty() {
        return Err(ApiError::validation_field("email", "נא להזין כתובת אימייל"));
    }

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    Ok(Json(CheckUserResponse {
        exists: existing.is_some(),
    }))
}

/// Issue a password reset token. The answer is the same whether or not the email exists.
pub async fn request_password_reset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<Json<PasswordResetRequestResponse>, ApiError> {
    let email = normalize_email(&request.email);
    if let Err(e) = validate_email(&email) {
        return Err(ApiError::validation_field("email", e));
    }

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    let mut reset_token = None;
    if let Some(user) = user {
        let token = generate_token();
        let expires_at = to_timestamp(chrono::Utc::now() + chrono::Duration::minutes(RESET_TOKEN_MINUTES));

        sqlx::query(
            "UPDATE users SET reset_token_hash = ?, reset_token_expires_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(hash_token(&token))
        .bind(&expires_at)
        .bind(now_rfc3339())
        .bind(&user.id)
        .execute(&state.db)
        .await?;

        info!(user_id = %user.id, expires_at = %expires_at, "Password reset requested");

        if state.config.auth.expose_reset_tokens {
            reset_token = Some(token);
        }
    }

    Ok(Json(PasswordResetRequestResponse {
        success: true,
        message: "אם הכתובת רשומה במערכת, נשלח אליה קישור לאיפוס הסיסמה".to_string(),
        reset_token,
    }))
}

/// Set a new password using a reset token; every existing session is revoked
pub async fn confirm_password_reset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PasswordResetConfirm>,
) -> Result<Json<MessageResponse>, ApiError> {
    if request.token.is_empty() || request.email.trim().is_empty() {
        return Err(ApiError::bad_request("קישור האיפוס אינו תקין"));
    }
    if let Err(e) = validate_password(&request.password) {
        return Err(ApiError::validation_field("password", e));
    }

    let invalid = || ApiError::bad_request("קישור האיפוס אינו תקין או שפג תוקפו");

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(normalize_email(&request.email))
        .fetch_optional(&state.db)
        .await?;
    let user = user.ok_or_else(invalid)?;

    let (stored_hash, expires_at) = match (&user.reset_token_hash, &user.reset_token_expires_at) {
        (Some(hash), Some(expires_at)) => (hash, expires_at),
        _ => return Err(invalid()),
    };

    // Use constant-time comparison to prevent timing attacks
    let provided_hash = hash_token(&request.token);
    let matches: bool = stored_hash.as_bytes().ct_eq(provided_hash.as_bytes()).into();
    if !matches || expires_at.as_str() <= now_rfc3339().as_str() {
        warn!(user_id = %user.id, "Rejected password reset token");
        return Err(invalid());
    }

    let password_hash = hash_password(&request.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("שגיאה בעדכון הסיסמה")
    })?;

    let mut tx = state.db.begin().await?;

    sqlx::query(
        r#"
        UPDATE users SET
            password_hash = ?,
            reset_token_hash = NULL,
            reset_token_expires_at = NULL,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&password_hash)
    .bind(now_rfc3339())
    .bind(&user.id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(&user.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(user_id = %user.id, "Password reset completed");

    Ok(Json(MessageResponse::ok("הסיסמה עודכנה בהצלחה")))
}

/// Extract the token from the Authorization header or the session cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization").and_then(|h| h.to_str().ok()) {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Get the user owning a live session token
pub async fn get_current_user(pool: &sqlx::SqlitePool, token: &str) -> Result<User, ApiError> {
    let session: Option<Session> =
        sqlx::query_as("SELECT * FROM sessions WHERE token_hash = ? AND expires_at > ?")
            .bind(hash_token(token))
            .bind(now_rfc3339())
            .fetch_optional(pool)
            .await?;

    let session = session.ok_or_else(|| ApiError::unauthorized("נדרשת התחברות"))?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&session.user_id)
        .fetch_optional(pool)
        .await?;

    user.ok_or_else(|| ApiError::unauthorized("נדרשת התחברות"))
}

/// Extractor for getting the current authenticated user from a request
#[async_trait]
impl FromRequestParts<Arc<AppState>> for User {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers).ok_or_else(|| ApiError::unauthorized("נדרשת התחברות"))?;
        get_current_user(&state.db, &token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("abcd1234").unwrap();
        assert!(verify_password("abcd1234", &hash));
        assert!(!verify_password("abcd12345", &hash));
        assert!(!verify_password("abcd1234", "not-a-hash"));
    }

    #[test]
    fn test_tokens_are_random_and_hashed() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert_eq!(hash_token(&a), hash_token(&a));
        assert_ne!(hash_token(&a), a);
    }

    #[test]
    fn test_extract_token_prefers_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert("Cookie", HeaderValue::from_static("easyevents_session=from-cookie"));
        assert_eq!(extract_token(&headers).as_deref(), Some("from-cookie"));

        headers.insert("Authorization", HeaderValue::from_static("Bearer from-header"));
        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_extract_token_missing() {
        let mut headers = HeaderMap::new();
        assert!(extract_token(&headers).is_none());
        headers.insert("Authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_token(&headers).is_none());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok", Some(3600), true);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));

        let cookie = session_cookie("tok", None, false);
        assert!(cookie.max_age().is_none());
        assert!(cookie.secure().is_none());
    }

    #[tokio::test]
    async fn test_purge_expired_sessions_keeps_live_ones() {
        let pool = crate::db::init_in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, email, password_hash) VALUES ('u1', 'דנה', 'כהן', 'dana@example.com', 'x')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let live = create_session(&pool, "u1", chrono::Duration::hours(1)).await.unwrap();
        create_session(&pool, "u1", chrono::Duration::hours(-1)).await.unwrap();
        create_session(&pool, "u1", chrono::Duration::days(-30)).await.unwrap();

        assert_eq!(purge_expired_sessions(&pool).await.unwrap(), 2);
        assert_eq!(purge_expired_sessions(&pool).await.unwrap(), 0);

        let remaining: Vec<(String,)> = sqlx::query_as("SELECT token_hash FROM sessions")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, vec![(hash_token(&live),)]);
    }
}
