/// A decoded `data:<mime>;base64,<payload>` attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub mime_type: &'a str,
    /// Still base64-encoded; the model API takes base64 inline data as-is.
    pub base64_payload: &'a str,
}

/// Parse a base64 data-URI. Returns `None` for anything that doesn't match
/// the exact `data:<mime>;base64,<payload>` format; callers pass such values
/// through untouched rather than rejecting the request.
pub fn parse(value: &str) -> Option<DataUri<'_>> {
    let rest = value.strip_prefix("data:")?;
    let (mime_type, payload) = rest.split_once(";base64,")?;
    if mime_type.is_empty() || payload.is_empty() {
        return None;
    }
    Some(DataUri {
        mime_type,
        base64_payload: payload,
    })
}
