use rand::Rng;

use pastelite_common::{ID_LENGTH, KEY_PREFIX, MAX_ID_LENGTH};

/// Alfabeto URL-safe de 64 símbolos (6 bits por caractere).
const ALPHABET: &[u8; 64] = b"useandom-26T198340PX75pxJACKVERYMINDBUSHWOLF_GQZbfghjklqvwyzrict";

/// Gera um identificador curto e URL-safe.
///
/// Não há checagem de unicidade contra o backend: com 60 bits uma colisão é
/// improvável, e se acontecer a entrada anterior é sobrescrita.
pub fn generate_id() -> String {
    let mut bytes = [0u8; ID_LENGTH];
    rand::thread_rng().fill(&mut bytes[..]);
    bytes
        .iter()
        .map(|b| ALPHABET[(b & 63) as usize] as char)
        .collect()
}

/// Chave namespaced usada em todos os backends.
pub fn paste_key(id: &str) -> String {
    format!("{KEY_PREFIX}{id}")
}

/// Identificadores fora do alfabeto nunca foram gerados aqui.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_ID_LENGTH && id.bytes().all(|b| ALPHABET.contains(&b))
}
