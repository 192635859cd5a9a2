use sha2::{Digest, Sha256};

/// Deterrent password gate. Only the digest of the expected password is kept,
/// and a pass lasts for the running session.
#[derive(Debug, Clone)]
pub struct Gate {
    expected: Option<[u8; 32]>,
    unlocked: bool,
    pub input: String,
    pub failed: bool,
}

impl Gate {
    pub fn new(password: Option<&str>) -> Self {
        let expected = password.map(digest);
        Self {
            unlocked: expected.is_none(),
            expected,
            input: String::new(),
            failed: false,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn push_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    /// Checks the typed input and clears it either way.
    pub fn attempt(&mut self) -> bool {
        let candidate = std::mem::take(&mut self.input);
        let ok = match self.expected {
            Some(expected) => digest(&candidate) == expected,
            None => true,
        };
        self.unlocked |= ok;
        self.failed = !ok;
        ok
    }

    pub fn masked_input(&self) -> String {
        "•".repeat(self.input.chars().count())
    }
}

fn digest(text: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(text.as_bytes()));
    out
}
