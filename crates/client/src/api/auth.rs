//! Login, registration and the shop sign-up OTP flow.

use drovo_core::{Email, UserType};
use secrecy::SecretString;
use tracing::instrument;

use super::types::{
    AuthResponse, Credentials, GoogleLogin, GoogleRegistration, OtpRequest, OtpVerification,
};
use super::{ApiClient, Auth, field, message};
use crate::error::Result;

impl ApiClient {
    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, password), fields(email = %email, %role))]
    pub async fn login(
        &self,
        email: &Email,
        password: &str,
        role: UserType,
    ) -> Result<SecretString> {
        let credentials = Credentials {
            name: None,
            email: email.clone(),
            password: password.to_string(),
            role,
        };
        let mut body = self.post_json("api/login", Auth::Anonymous, &credentials).await?;
        Ok(SecretString::from(field::<String>(&mut body, "token")?))
    }

    /// Register a customer account.
    ///
    /// Shops sign up through [`ApiClient::send_otp`] instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the account cannot be created or the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(&self, name: &str, email: &Email, password: &str) -> Result<SecretString> {
        let credentials = Credentials {
            name: Some(name.to_string()),
            email: email.clone(),
            password: password.to_string(),
            role: UserType::User,
        };
        let mut body = self
            .post_json("api/register", Auth::Anonymous, &credentials)
            .await?;
        Ok(SecretString::from(field::<String>(&mut body, "token")?))
    }

    /// Start a shop sign-up by mailing a one-time password.
    ///
    /// # Errors
    ///
    /// Returns an error if the server refuses the sign-up or the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn send_otp(&self, email: &Email, password: &str) -> Result<Option<String>> {
        let request = OtpRequest {
            email: email.clone(),
            password: password.to_string(),
        };
        let body = self.post_json("api/send-otp", Auth::Anonymous, &request).await?;
        Ok(message(&body))
    }

    /// Finish a shop sign-up; returns the new shop's session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the OTP is wrong or the request fails.
    #[instrument(skip(self, verification), fields(email = %verification.email))]
    pub async fn verify_otp(&self, verification: &OtpVerification) -> Result<SecretString> {
        let mut body = self
            .post_json("api/verify-otp", Auth::Anonymous, verification)
            .await?;
        Ok(SecretString::from(field::<String>(&mut body, "token")?))
    }

    /// Exchange an identity-provider ID token for a session.
    ///
    /// When `is_new_user` is set the account still has to be created with
    /// [`ApiClient::register_google`].
    ///
    /// # Errors
    ///
    /// Returns an error if the ID token is rejected or the request fails.
    #[instrument(skip(self, id_token))]
    pub async fn login_google(&self, id_token: &str, user_type: UserType) -> Result<AuthResponse> {
        let request = GoogleLogin {
            token: id_token.to_string(),
            user_type,
        };
        let body = self
            .post_json("api/login/google", Auth::Anonymous, &request)
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Create an account for a first-time identity-provider login.
    ///
    /// # Errors
    ///
    /// Returns an error if the account cannot be created or the request fails.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register_google(&self, registration: &GoogleRegistration) -> Result<SecretString> {
        let mut body = self
            .post_json("api/register-google", Auth::Anonymous, registration)
            .await?;
        Ok(SecretString::from(field::<String>(&mut body, "token")?))
    }
}
