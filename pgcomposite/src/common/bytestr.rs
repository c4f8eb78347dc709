use bytes::Bytes;

/// A cheaply cloneable and sliceable str.
///
/// Field names and text values are kept as `ByteStr` so decoding a record
/// does not copy them out of the frame buffer.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteStr {
    bytes: Bytes,
}

impl ByteStr {
    /// Converts a `Bytes` to a `ByteStr`.
    pub fn from_utf8(bytes: Bytes) -> Result<Self, std::str::Utf8Error> {
        std::str::from_utf8(&bytes)?;
        Ok(Self { bytes })
    }

    /// Creates `ByteStr` instance from str slice, by copying it.
    pub fn copy_from_str(string: &str) -> Self {
        Self { bytes: Bytes::copy_from_slice(string.as_bytes()) }
    }

    /// Creates a new `ByteStr` from a static str.
    ///
    /// The returned `ByteStr` will point directly to the static str. There is
    /// no allocating or copying.
    pub const fn from_static(string: &'static str) -> Self {
        Self { bytes: Bytes::from_static(string.as_bytes()) }
    }

    /// Returns the underlying bytes.
    pub fn as_bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Consume self into the underlying bytes.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn as_str(&self) -> &str {
        self
    }
}

impl AsRef<str> for ByteStr {
    fn as_ref(&self) -> &str {
        // SAFETY: constructors only accept valid utf8 and `Bytes` is immutable
        unsafe { std::str::from_utf8_unchecked(&self.bytes) }
    }
}

impl std::ops::Deref for ByteStr {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_ref()
    }
}

impl std::borrow::Borrow<str> for ByteStr {
    fn borrow(&self) -> &str {
        self
    }
}

impl std::hash::Hash for ByteStr {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        <str as std::hash::Hash>::hash(self, state)
    }
}

impl From<&'static str> for ByteStr {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

impl From<String> for ByteStr {
    fn from(value: String) -> Self {
        Self { bytes: Bytes::from(value.into_bytes()) }
    }
}

impl PartialEq<str> for ByteStr {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ByteStr {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl std::fmt::Display for ByteStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <str as std::fmt::Display>::fmt(self, f)
    }
}

impl std::fmt::Debug for ByteStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <str as std::fmt::Debug>::fmt(self, f)
    }
}
