use rand::Rng;

/// Session discriminator embedded in tokens and session keys.
pub fn session_id() -> u64 {
    let mut rng = rand::thread_rng();
    rng.r#gen()
}

/// Twelve-digit payment account number; never starts with zero.
pub fn account_number() -> String {
    let mut rng = rand::thread_rng();
    let first: u8 = rng.gen_range(1..=9);
    let rest: u64 = rng.gen_range(0..100_000_000_000);
    format!("{first}{rest:011}")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn account_numbers_are_twelve_digits() {
        for _ in 0..64 {
            let n = account_number();
            assert_eq!(n.len(), 12);
            assert!(n.chars().all(|c| c.is_ascii_digit()));
            assert!(!n.starts_with('0'));
        }
    }
}
