use axum::{
    async_trait,
    body::Body,
    extract::{FromRef, FromRequestParts, Json, State},
    http::request::Parts,
    http::{Response, StatusCode},
    response::IntoResponse,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{Duration, Utc};
use email_address::EmailAddress;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;

use common::{User, UserID};

use crate::{
    config::AppConfig,
    db::{DbError, SelectBy},
    AppError,
};

/// How long an issued access token stays valid.
const TOKEN_LIFETIME_MINUTES: i64 = 15;

/// The contents of an access token.
#[derive(Serialize, Deserialize)]
pub struct Claims {
    /// The expiry time of the token.
    pub exp: usize,
    /// The time the token was issued.
    pub iat: usize,
    /// The id of the user the token was issued to.
    ///
    /// The id is used rather than the email so that tokens survive a profile
    /// email change.
    pub sub: i64,
}

impl Claims {
    pub fn user_id(&self) -> UserID {
        UserID::new(self.sub)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    AppConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::InvalidToken)?;

        let app_config = parts
            .extract_with_state::<AppConfig, _>(state)
            .await
            .map_err(|_| AuthError::InvalidToken)?;

        let token_data = decode_jwt(bearer.token(), app_config.decoding_key())?;

        Ok(token_data.claims)
    }
}

/// The credentials presented at sign-in.
#[derive(Deserialize)]
pub struct Credentials {
    pub email: EmailAddress,
    pub password: String,
}

/// The response body for a successful sign-in.
#[derive(Serialize, Deserialize)]
pub struct TokenResponse {
    pub access: String,
}

#[derive(Debug)]
pub enum AuthError {
    WrongCredentials,
    MissingCredentials,
    TokenCreation,
    InvalidToken,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response<Body> {
        let (status, error_message) = match self {
            AuthError::WrongCredentials => (StatusCode::UNAUTHORIZED, "Wrong credentials"),
            AuthError::MissingCredentials => (StatusCode::BAD_REQUEST, "Missing credentials"),
            AuthError::TokenCreation => (StatusCode::INTERNAL_SERVER_ERROR, "Token creation error"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Handler for sign-in requests.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email does not belong to a registered user.
/// - The password is not correct.
/// - The account has been deactivated.
/// - An internal error occurred when verifying the password.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn sign_in(
    State(state): State<AppConfig>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenResponse>, AuthError> {
    let user = User::select(
        &credentials.email,
        &state.db_connection().lock().unwrap(),
    )
    .map_err(|e| match e {
        DbError::NotFound => AuthError::WrongCredentials,
        _ => {
            tracing::error!("Error matching user: {e:?}");
            AuthError::InternalError
        }
    })?;

    if !user.is_active() {
        return Err(AuthError::WrongCredentials);
    }

    let password = unsafe { common::RawPassword::new_unchecked(credentials.password) };

    let password_is_correct = user.password_hash().verify(&password).map_err(|e| {
        tracing::error!("Error verifying password: {}", e);
        AuthError::InternalError
    })?;

    if !password_is_correct {
        return Err(AuthError::WrongCredentials);
    }

    let access = encode_jwt(user.id(), state.encoding_key())?;

    Ok(Json(TokenResponse { access }))
}

/// Look up the user a set of claims was issued to.
///
/// Route handlers call this before touching any resource so that every
/// operation is scoped to an existing, authenticated user. A token whose
/// user no longer exists is treated as an invalid credential, not as a
/// missing resource.
pub fn authenticated_user(claims: &Claims, connection: &Connection) -> Result<User, AppError> {
    User::select(claims.user_id(), connection).map_err(|e| match e {
        DbError::NotFound => AppError::Unauthorized,
        e => {
            tracing::error!("Error loading user for token: {e:?}");
            AppError::InternalError
        }
    })
}

fn encode_jwt(user_id: UserID, encoding_key: &EncodingKey) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = (now + Duration::minutes(TOKEN_LIFETIME_MINUTES)).timestamp() as usize;
    let iat = now.timestamp() as usize;
    let claims = Claims {
        exp,
        iat,
        sub: user_id.as_i64(),
    };

    encode(&Header::default(), &claims, encoding_key).map_err(|e| {
        tracing::error!("Error encoding JWT: {}", e);
        AuthError::TokenCreation
    })
}

fn decode_jwt(jwt_token: &str, decoding_key: &DecodingKey) -> Result<TokenData<Claims>, AuthError> {
    decode(jwt_token, decoding_key, &Validation::default()).map_err(|_| AuthError::InvalidToken)
}
