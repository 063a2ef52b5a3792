use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the ScriptPublicKey Version
pub type ScriptPublicKeyVersion = u16;

/// Represents a Script Public Key in the UTXO model.
///
/// The script bytes are opaque to consensus; only their length matters for
/// mass accounting.
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptPublicKey {
    pub version: ScriptPublicKeyVersion,
    pub script: Vec<u8>,
}

impl ScriptPublicKey {
    pub fn new(version: ScriptPublicKeyVersion, script: Vec<u8>) -> Self {
        Self { version, script }
    }

    pub fn script(&self) -> &[u8] {
        &self.script
    }
}

impl fmt::Display for ScriptPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}:{}", self.version, hex::encode(&self.script))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_version_and_script() {
        let spk = ScriptPublicKey::new(1, vec![0xde, 0xad]);
        assert_eq!(spk.to_string(), "v1:dead");
    }
}
