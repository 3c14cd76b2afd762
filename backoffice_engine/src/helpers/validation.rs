pub const MIN_PASSWORD_LENGTH: usize = 6;

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!("Password must be at least {MIN_PASSWORD_LENGTH} characters long"));
    }
    Ok(())
}

/// Returns the trimmed name, or an error if nothing is left.
pub fn validate_display_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name is required".to_string());
    }
    Ok(name.to_string())
}
