//! # Sign-in
//!
//! Login, registration and the current user, all through the [`Gateway`].
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Sign-in Flow                                  │
//! │                                                                         │
//! │  login(credentials)                                                     │
//! │    │  POST /auth/login   form: username=<email>, password               │
//! │    ▼                                                                    │
//! │  { access_token, token_type }  or  { user, token: { access_token } }    │
//! │    │                                                                    │
//! │    ├──► Session::start(access_token)                                    │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  user from the response, else GET /users/me                             │
//! │                                                                         │
//! │  register(registration)   POST /auth/register  → created User           │
//! │  current_user()           GET  /users/me       → User                   │
//! │  logout()                 Session::end, user forgotten                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures surface as [`ClientError`]; `user_message()` gives the server's
//! `detail` or the generic unexpected-error text.

use std::sync::{Arc, PoisonError, RwLock};

use pantry_core::validation::{validate_credentials, validate_registration};
use pantry_core::{Credentials, Registration, User};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ClientResult, GatewayError};
use crate::gateway::{Gateway, GatewayRequest};
use crate::session::Session;

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const ME_PATH: &str = "/users/me";

/// Signs users in and out of a [`Session`].
pub struct Auth {
    gateway: Arc<dyn Gateway>,
    session: Arc<Session>,
    user: RwLock<Option<User>>,
}

impl Auth {
    pub fn new(gateway: Arc<dyn Gateway>, session: Arc<Session>) -> Self {
        Auth {
            gateway,
            session,
            user: RwLock::new(None),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// The user from the last successful login or `current_user` call.
    pub fn user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Exchanges credentials for an access token and starts the session.
    ///
    /// A token is kept even when the follow-up user lookup fails.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<User> {
        validate_credentials(credentials)?;

        let request = GatewayRequest::post_form(LOGIN_PATH, credentials.form_fields());
        let response = self.gateway.send(request).await.map_err(|e| {
            warn!(error = %e, "Sign-in failed");
            e
        })?;

        let token = access_token(&response)
            .ok_or_else(|| GatewayError::Decode("sign-in response has no access_token".to_string()))?;
        self.session.start(token)?;
        info!(email = %credentials.email.trim(), "Signed in");

        match response.get("user").filter(|user| user.is_object()) {
            Some(user) => {
                let user: User = serde_json::from_value(user.clone())?;
                self.remember(Some(user.clone()));
                Ok(user)
            }
            None => self.current_user().await,
        }
    }

    /// Creates an account. Does not sign in.
    pub async fn register(&self, registration: &Registration) -> ClientResult<User> {
        validate_registration(registration)?;

        let body = serde_json::to_value(registration)?;
        let response = self
            .gateway
            .send(GatewayRequest::post(REGISTER_PATH, body))
            .await
            .map_err(|e| {
                warn!(error = %e, "Registration failed");
                e
            })?;

        let user: User = serde_json::from_value(response)?;
        info!(user_id = user.id, "Registered");
        Ok(user)
    }

    /// Fetches the signed-in user and remembers it.
    pub async fn current_user(&self) -> ClientResult<User> {
        let response = self.gateway.send(GatewayRequest::get(ME_PATH)).await?;
        let user: User = serde_json::from_value(response)?;
        debug!(user_id = user.id, "Loaded current user");
        self.remember(Some(user.clone()));
        Ok(user)
    }

    /// Ends the session and forgets the user.
    pub fn logout(&self) {
        self.session.end();
        self.remember(None);
    }

    fn remember(&self, user: Option<User>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user;
    }
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("signed_in", &self.is_signed_in())
            .field("user", &self.user().map(|user| user.id))
            .finish()
    }
}

/// The token sits at the top level, or under `token` when the server also
/// returns the user.
fn access_token(response: &Value) -> Option<&str> {
    response
        .get("access_token")
        .or_else(|| response.pointer("/token/access_token"))
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
}
