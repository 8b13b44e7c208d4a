use crate::error::EnvelopeError;
use crate::types::{
    ENVELOPE_VERSION_V1, Envelope, FIXED_HEADER_LEN, MAX_ENVELOPE_LEN, MAX_METADATA_LEN,
    MIN_ENVELOPE_LEN, NONCE_LEN, Nonce, TAG_LEN, Tag,
};
use bytes::BufMut;

/// Serializes an envelope into its self-delimiting wire form.
///
/// # Errors
/// Returns [`EnvelopeError::Malformed`] if the metadata or the whole envelope exceeds
/// the format limits, so that nothing is produced that the peer would refuse to decode.
pub fn encode(
    nonce: &Nonce,
    ciphertext: &[u8],
    tag: &Tag,
    metadata: &[u8],
) -> Result<Vec<u8>, EnvelopeError> {
    if metadata.len() > MAX_METADATA_LEN {
        return Err(malformed(format!(
            "metadata is {} bytes, limit is {MAX_METADATA_LEN}",
            metadata.len()
        )));
    }
    let total = MIN_ENVELOPE_LEN + ciphertext.len() + metadata.len();
    if total > MAX_ENVELOPE_LEN {
        return Err(malformed(format!("envelope is {total} bytes, limit is {MAX_ENVELOPE_LEN}")));
    }

    // Both fit: MAX_ENVELOPE_LEN < u32::MAX and MAX_METADATA_LEN < u16::MAX.
    let ct_len = u32::try_from(ciphertext.len()).map_err(|_| malformed("ciphertext too long"))?;
    let meta_len = u16::try_from(metadata.len()).map_err(|_| malformed("metadata too long"))?;

    let mut buf = Vec::with_capacity(total);
    buf.put_u8(ENVELOPE_VERSION_V1);
    buf.put_slice(nonce.as_bytes());
    buf.put_slice(tag.as_bytes());
    buf.put_u32(ct_len);
    buf.put_slice(ciphertext);
    buf.put_u16(meta_len);
    buf.put_slice(metadata);

    Ok(buf)
}

/// Parses the wire form back into an [`Envelope`].
///
/// Every length prefix is checked against the format limit and the bytes actually
/// remaining before anything is copied.
///
/// # Errors
/// Returns [`EnvelopeError::Malformed`] for truncated input, unknown versions,
/// overrunning or oversized lengths, and trailing bytes.
pub fn decode(bytes: &[u8]) -> Result<Envelope, EnvelopeError> {
    if bytes.len() < MIN_ENVELOPE_LEN {
        return Err(malformed(format!(
            "input is {} bytes, minimum is {MIN_ENVELOPE_LEN}",
            bytes.len()
        )));
    }
    if bytes.len() > MAX_ENVELOPE_LEN {
        return Err(malformed(format!(
            "input is {} bytes, limit is {MAX_ENVELOPE_LEN}",
            bytes.len()
        )));
    }

    let mut reader = Reader::new(bytes);

    let version = reader.u8()?;
    if version != ENVELOPE_VERSION_V1 {
        return Err(EnvelopeError::Malformed {
            message: "unsupported version".into(),
            context: Some(format!("version={version}").into()),
        });
    }

    let nonce = Nonce::from_bytes(reader.array::<NONCE_LEN>()?);
    let tag = Tag::from_bytes(reader.array::<TAG_LEN>()?);

    let ct_len = usize::try_from(reader.u32()?).map_err(|_| malformed("ciphertext length"))?;
    if ct_len > MAX_ENVELOPE_LEN - MIN_ENVELOPE_LEN {
        return Err(malformed(format!("ciphertext length {ct_len} exceeds limit")));
    }
    let ciphertext = reader.take(ct_len)?.to_vec();

    let meta_len = usize::from(reader.u16()?);
    if meta_len > MAX_METADATA_LEN {
        return Err(malformed(format!("metadata length {meta_len} exceeds {MAX_METADATA_LEN}")));
    }
    let metadata = reader.take(meta_len)?.to_vec();

    if reader.remaining() != 0 {
        return Err(malformed(format!("{} trailing bytes", reader.remaining())));
    }

    Ok(Envelope { nonce, tag, ciphertext, metadata })
}

impl Envelope {
    /// Encodes this envelope. See [`encode`].
    ///
    /// # Errors
    /// Returns [`EnvelopeError::Malformed`] if the envelope exceeds the format limits.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
        encode(&self.nonce, &self.ciphertext, &self.tag, &self.metadata)
    }

    /// Decodes an envelope. See [`decode`].
    ///
    /// # Errors
    /// Returns [`EnvelopeError::Malformed`] if `bytes` is not exactly one well-formed envelope.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        decode(bytes)
    }
}

fn malformed(message: impl Into<std::borrow::Cow<'static, str>>) -> EnvelopeError {
    EnvelopeError::Malformed { message: message.into(), context: None }
}

/// Bounds-checked cursor. Never panics, never allocates.
struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    const fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    const fn remaining(&self) -> usize {
        self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], EnvelopeError> {
        if n > self.buf.len() {
            return Err(malformed(format!(
                "length prefix {n} overruns buffer ({} bytes left)",
                self.buf.len()
            )));
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], EnvelopeError> {
        self.take(N)?.try_into().map_err(|_| malformed("fixed-width field"))
    }

    fn u8(&mut self) -> Result<u8, EnvelopeError> {
        Ok(self.array::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16, EnvelopeError> {
        Ok(u16::from_be_bytes(self.array::<2>()?))
    }

    fn u32(&mut self) -> Result<u32, EnvelopeError> {
        Ok(u32::from_be_bytes(self.array::<4>()?))
    }
}

const _: () = assert!(FIXED_HEADER_LEN == 33);
