/// Length of a participant id
pub const PARTICIPANT_ID_LEN: usize = 8;

/// Generate a short participant id: the first 8 hex digits of a v4 UUID,
/// uppercased (`"3F9A0C1B"`).
pub fn participant_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    uuid[..PARTICIPANT_ID_LEN].to_ascii_uppercase()
}
