// utils/referral_code.rs
use rand::{distr::Alphanumeric, Rng};

/// 8-character uppercase alphanumeric code. Uniqueness is enforced by the
/// database constraint; callers retry on collision.
pub fn generate_referral_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect::<String>()
        .to_uppercase()
}

pub fn generate_referral_link(base_url: &str, code: &str) -> String {
    format!("{}/register?ref={}", base_url, code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_shape() {
        let code = generate_referral_code();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(code, code.to_uppercase());
    }

    #[test]
    fn test_referral_link() {
        assert_eq!(
            generate_referral_link("https://example.com", "AB12CD34"),
            "https://example.com/register?ref=AB12CD34"
        );
    }
}
