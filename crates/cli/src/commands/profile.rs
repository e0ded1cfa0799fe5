//! Profile commands.

use bee_commerce_client::{Profile, ProfileUpdate, Storefront};

/// Print the logged-in user's profile.
pub async fn show(shop: &Storefront) -> Result<(), Box<dyn std::error::Error>> {
    let profile = shop.profile().await?;
    print_profile(&profile);
    Ok(())
}

/// Apply the given field changes, leaving omitted fields untouched.
pub async fn update(
    shop: &Storefront,
    username: Option<String>,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Empty name strings clear the field; DRF expects an explicit null.
    let update = ProfileUpdate {
        username,
        email,
        first_name: first_name.map(|s| if s.is_empty() { None } else { Some(s) }),
        last_name: last_name.map(|s| if s.is_empty() { None } else { Some(s) }),
    };
    if update.is_empty() {
        println!("Nothing to update");
        return Ok(());
    }

    let profile = shop.update_profile(&update).await?;
    println!("Profile updated");
    print_profile(&profile);
    Ok(())
}

fn print_profile(profile: &Profile) {
    println!("Username:   {}", profile.username);
    println!("Email:      {}", profile.email);
    println!(
        "Name:       {} {}",
        profile.first_name.as_deref().unwrap_or("-"),
        profile.last_name.as_deref().unwrap_or("-")
    );
    if let Some(joined) = profile.date_joined {
        println!("Joined:     {}", joined.format("%Y-%m-%d"));
    }
}
