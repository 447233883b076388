use rand::Rng;
use uuid::Uuid;

/// Session ids come from the session RNG so replays carry the same id.
pub fn generate_session_id(rng: &mut impl Rng) -> Uuid {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}
