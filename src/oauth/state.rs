/// Bytes of entropy in each `state` value.
pub const STATE_BYTES: usize = 16;

/// Fresh hex-encoded `state` for one authorization request.
pub fn generate_state() -> String {
    let mut buf = [0u8; STATE_BYTES];
    rand::Rng::fill_bytes(&mut rand::rng(), &mut buf);
    buf.iter().map(|b| format!("{b:02x}")).collect()
}
