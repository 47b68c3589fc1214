use rand::{Rng, distributions::Alphanumeric};

pub const SHORT_CODE_LEN: usize = 6;

/// Random `[a-zA-Z0-9]{6}` code. Uniqueness is checked by the caller.
pub fn generate() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SHORT_CODE_LEN)
        .map(char::from)
        .collect()
}
