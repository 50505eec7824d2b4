//! Initial passwords for newly created users.

use rand::Rng;
use zeroize::Zeroizing;

/// Characters an initial password is drawn from.
pub const PASSWORD_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!";

/// Length of every generated password.
pub const PASSWORD_LENGTH: usize = 16;

/// Draw a password of [`PASSWORD_LENGTH`] characters uniformly from
/// [`PASSWORD_CHARSET`].
///
/// The password is handed to the dashboard once and never logged; users are
/// expected to reset it.
pub fn generate_password<R: Rng + ?Sized>(rng: &mut R) -> Zeroizing<String> {
    let password: String = (0..PASSWORD_LENGTH)
        .map(|_| char::from(PASSWORD_CHARSET[rng.random_range(0..PASSWORD_CHARSET.len())]))
        .collect();
    Zeroizing::new(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(42)]
    fn passwords_use_charset_and_fixed_length(#[case] seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let password = generate_password(&mut rng);
        assert_eq!(password.len(), PASSWORD_LENGTH);
        assert!(password.bytes().all(|b| PASSWORD_CHARSET.contains(&b)));
    }

    #[rstest]
    fn successive_passwords_differ() {
        let mut rng = StdRng::seed_from_u64(99);
        let first = generate_password(&mut rng);
        let second = generate_password(&mut rng);
        assert_ne!(first, second);
    }
}
