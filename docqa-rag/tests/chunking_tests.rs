//! Property tests for fixed-size chunking.

use docqa_rag::chunking::{Chunker, FixedSizeChunker, chunk_text};
use proptest::prelude::*;

mod prop_chunk_reconstruction {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Concatenating the chunks in order reproduces the input exactly.
        #[test]
        fn chunks_concatenate_to_original(text in "\\PC{0,300}", size in 1usize..64) {
            let chunks = chunk_text(&text, size).unwrap();
            let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
            prop_assert_eq!(rebuilt, text);
        }

        /// There are exactly ceil(len / size) chunks, counting characters.
        #[test]
        fn chunk_count_is_ceiling_of_length_over_size(
            text in "\\PC{0,300}",
            size in 1usize..64,
        ) {
            let len = text.chars().count();
            let chunks = chunk_text(&text, size).unwrap();
            prop_assert_eq!(chunks.len(), len.div_ceil(size));
        }

        /// Every chunk but the last has exactly `size` characters, and
        /// positions and offsets follow the input.
        #[test]
        fn chunks_are_full_windows_in_order(text in "\\PC{1,300}", size in 1usize..64) {
            let chunks = chunk_text(&text, size).unwrap();
            let last = chunks.len() - 1;
            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.position, i);
                prop_assert_eq!(chunk.start, i * size);
                let chars = chunk.text.chars().count();
                if i < last {
                    prop_assert_eq!(chars, size);
                } else {
                    prop_assert!(chars >= 1 && chars <= size);
                }
            }
        }

        /// With overlap, each chunk starts `size - overlap` characters after
        /// the previous one and the final chunk reaches the end of the text.
        #[test]
        fn overlapping_chunks_cover_the_text(
            text in "[a-z]{1,200}",
            size in 2usize..40,
            overlap_seed in 0usize..40,
        ) {
            let overlap = overlap_seed % size;
            let chunker = FixedSizeChunker::new(size, overlap).unwrap();
            let chunks = chunker.chunk(&text);
            let step = size - overlap;

            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.start, i * step);
                let end = chunk.start + chunk.text.len();
                prop_assert_eq!(&text[chunk.start..end], chunk.text.as_str());
            }
            let last = chunks.last().unwrap();
            prop_assert_eq!(last.start + last.text.len(), text.len());
        }
    }
}

#[test]
fn empty_text_yields_no_chunks() {
    assert!(chunk_text("", 5).unwrap().is_empty());
}

#[test]
fn four_word_document_splits_into_four_chunks() {
    let chunks = chunk_text("AAAA BBBB CCCC DDDD", 5).unwrap();
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["AAAA ", "BBBB ", "CCCC ", "DDDD"]);
}
