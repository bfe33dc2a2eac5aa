/// One status of a status group, e.g. `Open` in `Sales_InvoiceStatus`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub id: i64,

    /// Key used by callers to refer to the status
    pub key: String,

    /// Name of the status group
    pub group: String,
}

impl Status {
    pub fn new(id: i64, group: impl Into<String>, key: impl Into<String>) -> Status {
        Status {
            id,
            key: key.into(),
            group: group.into(),
        }
    }
}
