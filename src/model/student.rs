use serde::{Deserialize, Serialize};

/// A member of the class. The `nis` student number is unique by convention only;
/// nothing in this system enforces it.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub nis: String,
}

impl Student {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        nis: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nis: nis.into(),
        }
    }
}
