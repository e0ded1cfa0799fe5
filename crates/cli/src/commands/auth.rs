//! Session commands: login, logout, register.

use std::io::{BufRead, Write};

use bee_commerce_client::Storefront;

/// Log in and persist the session.
pub async fn login(
    shop: &mut Storefront,
    username: &str,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = resolve_password(password)?;
    let session = shop.login(username, &password).await?;

    let name = session
        .claims()
        .and_then(bee_commerce_client::Claims::display_name)
        .unwrap_or_else(|| username.to_string());
    println!("Logged in as {name}");
    Ok(())
}

/// Forget the stored session.
pub fn logout(shop: &mut Storefront) -> Result<(), Box<dyn std::error::Error>> {
    shop.logout()?;
    println!("Logged out");
    Ok(())
}

/// Create an account, then log in with it.
pub async fn register(
    shop: &mut Storefront,
    username: &str,
    email: &str,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = resolve_password(password)?;
    shop.register(username, email, &password).await?;
    println!("Account created, logged in as {username}");
    Ok(())
}

/// Use the given password, or prompt for one on stdin.
fn resolve_password(password: Option<String>) -> Result<String, std::io::Error> {
    if let Some(password) = password {
        return Ok(password);
    }
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
