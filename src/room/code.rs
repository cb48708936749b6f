use rand::Rng;

/// Room code alphabet without look-alike glyphs (no I, O, 0 or 1)
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const CODE_LENGTH: usize = 6;

/// Trait for generating candidate room codes
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Draws each character uniformly from [`CODE_ALPHABET`]
pub struct RandomCodeGenerator;

impl RandomCodeGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..CODE_LENGTH)
            .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
            .collect()
    }
}

/// Canonical form of a user-typed code
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
