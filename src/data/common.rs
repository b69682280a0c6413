use uuid::Uuid;

/// Fresh 128-bit random id, hex encoded without dashes.
pub fn new_uuid() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Dual addressing for ordered collections: position or uuid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    Index(usize),
    Uuid(&'a str),
}

impl From<usize> for Key<'_> {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(uuid: &'a str) -> Self {
        Key::Uuid(uuid)
    }
}

impl<'a> From<&'a String> for Key<'a> {
    fn from(uuid: &'a String) -> Self {
        Key::Uuid(uuid.as_str())
    }
}
