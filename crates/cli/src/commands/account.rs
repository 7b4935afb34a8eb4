//! Login, sign-up and session commands.

#![allow(clippy::print_stdout)]

use drovo_client::Store;
use drovo_client::api::types::OtpVerification;
use drovo_core::UserType;

use super::{parse_email, print_message};

/// `drovo login`
pub async fn login(
    store: &mut Store,
    email: &str,
    password: &str,
    role: UserType,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = parse_email(email)?;
    store.login(&email, password, role).await?;
    println!("Logged in as {email} ({role})");
    Ok(())
}

/// `drovo register`
pub async fn register(
    store: &mut Store,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = parse_email(email)?;
    store.register(name, &email, password).await?;
    println!("Welcome, {name}!");
    Ok(())
}

/// `drovo signup-shop`
pub async fn signup_shop(
    store: &mut Store,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = parse_email(email)?;
    let message = store.api().send_otp(&email, password).await?;
    print_message(message, "OTP sent successfully!");
    println!("Finish with: drovo verify-shop --name <shop name> --email {email} --otp <code>");
    Ok(())
}

/// `drovo verify-shop`
pub async fn verify_shop(
    store: &mut Store,
    name: &str,
    email: &str,
    password: &str,
    otp: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let verification = OtpVerification {
        email: parse_email(email)?,
        otp: otp.trim().to_string(),
        name: name.to_string(),
        password: password.to_string(),
    };
    store.verify_shop_signup(&verification).await?;
    println!("OTP verified. Pick a plan with `drovo plans` and run `drovo subscribe create`.");
    Ok(())
}

/// `drovo logout`
pub fn logout(store: &mut Store) -> Result<(), Box<dyn std::error::Error>> {
    store.logout()?;
    println!("Logged out");
    Ok(())
}

/// `drovo whoami`
pub fn whoami(store: &Store) {
    let session = store.session();
    if !session.is_authenticated() {
        println!("Not logged in");
        return;
    }
    match (session.user_type(), session.shop_name()) {
        (UserType::Shop, Some(name)) => println!("Logged in as shop {name}"),
        (user_type, _) => println!("Logged in ({user_type})"),
    }
}
