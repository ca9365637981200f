//! Protocol limits shared by clients and the feed store.

/// Maximum attachment size in bytes before encoding (10 MiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Maximum number of messages fetched in a single page request.
pub const DEFAULT_PAGE_CAP: usize = 20;

/// Number of messages listed when the caller does not ask for a count.
pub const DEFAULT_LIST_COUNT: usize = 10;

/// Maximum username length in bytes.
pub const MAX_USERNAME_LEN: usize = 64;

/// Upper bound on the base64 length of an attachment that fits
/// [`MAX_ATTACHMENT_BYTES`].
pub const fn max_encoded_attachment_len() -> usize {
    (MAX_ATTACHMENT_BYTES as usize).div_ceil(3) * 4
}
