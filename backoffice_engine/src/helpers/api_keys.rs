use rand::RngCore;

pub const API_KEY_PREFIX: &str = "apikey_";

/// A fresh API key: the prefix followed by 32 random bytes, hex encoded.
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{API_KEY_PREFIX}{}", hex::encode(bytes))
}
