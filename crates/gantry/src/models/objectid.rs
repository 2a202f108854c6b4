use uuid::Uuid;

/// Build a prefixed unique identifier such as `msg_1f0c...`
pub fn create_object_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}
