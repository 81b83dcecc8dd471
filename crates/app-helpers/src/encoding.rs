use base64::Engine;

#[must_use]
pub fn to_base64<T>(data: T) -> String
where
    T: AsRef<[u8]>,
{
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(data)
}

pub fn from_base64<T>(data: T) -> Result<Vec<u8>, base64::DecodeError>
where
    T: AsRef<[u8]>,
{
    base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(data)
}
