//! Property tests for the flat L2 index.

use docqa_rag::FlatL2IndexBuilder;
use docqa_rag::error::RagError;
use docqa_rag::inmemory::{FlatL2Index, squared_l2};
use docqa_rag::vectorindex::{IndexBuilder, VectorIndex};
use proptest::prelude::*;

const DIM: usize = 8;

fn arb_vector(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-10.0f32..10.0f32, dim)
}

/// *For any* non-empty set of vectors and any query, search SHALL return
/// `min(k, len)` hits ordered by non-decreasing distance, with equal
/// distances ordered by position.
mod prop_search_ordering {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_sorted_by_distance_and_bounded_by_k(
            vectors in proptest::collection::vec(arb_vector(DIM), 1..40),
            query in arb_vector(DIM),
            k in 1usize..50,
        ) {
            let count = vectors.len();
            let index = FlatL2Index::build(vectors).unwrap();
            let hits = index.search(&query, k).unwrap();

            prop_assert_eq!(hits.len(), k.min(count));
            for window in hits.windows(2) {
                prop_assert!(
                    window[0].distance <= window[1].distance,
                    "results not in ascending order: {} > {}",
                    window[0].distance,
                    window[1].distance,
                );
                if window[0].distance == window[1].distance {
                    prop_assert!(window[0].position < window[1].position);
                }
            }
        }

        #[test]
        fn exact_vector_is_recovered_at_distance_zero(
            vectors in proptest::collection::vec(arb_vector(DIM), 1..20),
            pick in any::<prop::sample::Index>(),
        ) {
            let target = pick.index(vectors.len());
            let query = vectors[target].clone();
            let index = FlatL2Index::build(vectors.clone()).unwrap();
            let hit = index.search(&query, 1).unwrap()[0];

            prop_assert_eq!(hit.distance, 0.0);
            // A duplicate earlier in the list wins the tie.
            let first_equal =
                vectors.iter().position(|v| squared_l2(v, &query) == 0.0).unwrap();
            prop_assert_eq!(hit.position, first_equal);
        }
    }
}

#[test]
fn search_with_chunk_vector_returns_that_chunk() {
    let vectors = vec![
        vec![1.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
    ];
    let index = FlatL2IndexBuilder.build(vectors).unwrap();

    let hits = index.search(&[0.0, 1.0, 0.0], 1).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].position, 1);
    assert_eq!(hits[0].distance, 0.0);
}

#[test]
fn distances_are_squared_euclidean() {
    let vectors = vec![vec![0.0, 0.0], vec![3.0, 4.0]];
    let index = FlatL2Index::build(vectors).unwrap();
    let hits = index.search(&[0.0, 0.0], 2).unwrap();
    assert_eq!(hits[1].position, 1);
    assert_eq!(hits[1].distance, 25.0);
    assert_eq!(squared_l2(&[1.0, 1.0], &[2.0, 3.0]), 5.0);
}

#[test]
fn ties_are_broken_by_position() {
    let index = FlatL2Index::build(vec![vec![1.0], vec![-1.0], vec![1.0]]).unwrap();
    let positions: Vec<usize> = index
        .search(&[0.0], 3)
        .unwrap()
        .into_iter()
        .map(|h| h.position)
        .collect();
    assert_eq!(positions, [0, 1, 2]);
}

#[test]
fn build_rejects_empty_input() {
    let err = FlatL2Index::build(Vec::new()).unwrap_err();
    assert!(matches!(err, RagError::EmptyInput(_)));
}

#[test]
fn build_rejects_inconsistent_dimensions() {
    let vectors = vec![vec![1.0, 2.0], vec![1.0, 2.0], vec![1.0]];
    let err = FlatL2Index::build(vectors).unwrap_err();
    match err {
        RagError::DimensionMismatch {
            expected,
            actual,
            position,
        } => {
            assert_eq!((expected, actual, position), (2, 1, 2));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn build_rejects_zero_length_vectors() {
    assert!(matches!(
        FlatL2Index::build(vec![Vec::new()]),
        Err(RagError::DimensionMismatch { actual: 0, .. })
    ));
}

#[test]
fn search_rejects_bad_query_and_zero_k() {
    let index = FlatL2Index::build(vec![vec![1.0, 2.0]]).unwrap();
    assert!(matches!(
        index.search(&[1.0], 1),
        Err(RagError::DimensionMismatch { .. })
    ));
    assert!(matches!(
        index.search(&[1.0, 2.0], 0),
        Err(RagError::InvalidArgument(_))
    ));
}

#[test]
fn index_reports_its_size() {
    let index = FlatL2IndexBuilder
        .build(vec![vec![1.0, 2.0], vec![3.0, 4.0]])
        .unwrap();
    assert_eq!(index.len(), 2);
    assert!(!index.is_empty());
    assert_eq!(index.dimensions(), 2);
}
