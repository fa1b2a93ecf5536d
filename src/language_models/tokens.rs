use std::sync::OnceLock;

use tiktoken_rs::{cl100k_base, CoreBPE};

fn encoder() -> Option<&'static CoreBPE> {
    static ENCODER: OnceLock<Option<CoreBPE>> = OnceLock::new();

    ENCODER
        .get_or_init(|| {
            cl100k_base()
                .inspect_err(|e| log::warn!("Failed to load cl100k_base tokenizer: {e}"))
                .ok()
        })
        .as_ref()
}

/// Count tokens with the `cl100k_base` encoding; `None` if the encoding is unavailable.
pub fn num_tokens_from_str(text: &str) -> Option<usize> {
    encoder().map(|bpe| bpe.encode_with_special_tokens(text).len())
}
