pub const UNKNOWN_NAME: &str = "/<unknown>";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Container {
    pub id:    String,
    pub name:  String,
    pub image: String,
}

impl Container {
    /// Stand-in metadata for a container that could not be inspected,
    /// typically because it was already removed.
    pub fn unknown(id: &str) -> Self {
        Self {
            id:    id.to_owned(),
            name:  UNKNOWN_NAME.to_owned(),
            image: String::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_NAME
    }
}
