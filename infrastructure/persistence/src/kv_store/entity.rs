use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct KvEntryEntity {
    pub key: String,
    pub value: Vec<u8>,
}

impl KvEntryEntity {
    pub fn into_value(self) -> Vec<u8> {
        self.value
    }
}
