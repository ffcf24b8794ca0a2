use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One directory entry: a badge UID and the name it was registered under.
/// The UID is the opaque string the reader reports for the tag and is the
/// directory's primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "uid": "04:A3:1B:2F",
        "name": "Alice Carter"
    })
)]
pub struct UserRecord {
    #[schema(example = "04:A3:1B:2F")]
    pub uid: String,

    #[schema(example = "Alice Carter")]
    pub name: String,
}
