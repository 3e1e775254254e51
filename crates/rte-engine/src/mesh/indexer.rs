use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::FaceVertexRef;

/// Output of [`deduplicate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexedRefs {
    /// Distinct references in first-occurrence order.
    pub unique: Vec<FaceVertexRef>,
    /// One entry per input reference: its position in `unique`.
    pub indices: Vec<u32>,
}

/// Collapses repeated face-vertex references into a unique vertex order plus
/// an index buffer.
///
/// Single pass over `refs`; order follows the input, nothing is sorted. Index
/// validity is not checked here, see [`super::pack`].
pub fn deduplicate(refs: &[FaceVertexRef]) -> IndexedRefs {
    let mut seen: HashMap<FaceVertexRef, u32> = HashMap::with_capacity(refs.len());
    let mut out = IndexedRefs {
        unique: Vec::new(),
        indices: Vec::with_capacity(refs.len()),
    };

    for r in refs {
        let index = match seen.entry(*r) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let next = out.unique.len() as u32;
                out.unique.push(*r);
                *e.insert(next)
            }
        };
        out.indices.push(index);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(raw: &[(u32, u32, u32)]) -> Vec<FaceVertexRef> {
        raw.iter().copied().map(FaceVertexRef::from).collect()
    }

    #[test]
    fn repeated_corner_reuses_index() {
        let input = refs(&[(0, 0, 0), (1, 0, 0), (2, 0, 0), (0, 0, 0)]);
        let out = deduplicate(&input);
        assert_eq!(out.unique.len(), 3);
        assert_eq!(out.indices, vec![0, 1, 2, 0]);
    }

    #[test]
    fn differing_normal_is_a_distinct_vertex() {
        let input = refs(&[(0, 0, 0), (0, 1, 0), (0, 0, 1), (0, 0, 0)]);
        let out = deduplicate(&input);
        assert_eq!(out.unique, input[..3].to_vec());
        assert_eq!(out.indices, vec![0, 1, 2, 0]);
    }

    #[test]
    fn every_index_maps_back_to_its_input() {
        let input = refs(&[
            (3, 1, 2),
            (0, 0, 0),
            (3, 1, 2),
            (5, 5, 5),
            (0, 0, 0),
            (0, 0, 1),
            (5, 5, 5),
        ]);
        let out = deduplicate(&input);

        assert!(out.unique.len() <= input.len());
        assert_eq!(out.indices.len(), input.len());
        for (i, r) in input.iter().enumerate() {
            let idx = out.indices[i] as usize;
            assert!(idx < out.unique.len());
            assert_eq!(out.unique[idx], *r);
        }
    }

    #[test]
    fn same_input_same_output() {
        let input = refs(&[(2, 0, 1), (1, 1, 1), (2, 0, 1), (0, 2, 2), (1, 1, 1)]);
        assert_eq!(deduplicate(&input), deduplicate(&input));
    }

    #[test]
    fn empty_input() {
        let out = deduplicate(&[]);
        assert!(out.unique.is_empty());
        assert!(out.indices.is_empty());
    }
}
