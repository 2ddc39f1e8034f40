use std::collections::HashMap;

use crate::{length::LengthExpr, types::VideoId};

/// Keep the videos whose duration is known and satisfies every expression.
///
/// With no expressions the input is returned untouched. Otherwise a video
/// missing from `durations` is dropped, never assumed to pass.
pub fn filter_by_length(
    videos: &[VideoId],
    durations: &HashMap<VideoId, u64>,
    exprs: &[LengthExpr],
) -> Vec<VideoId> {
    if exprs.is_empty() {
        return videos.to_vec();
    }

    videos
        .iter()
        .filter(|id| match durations.get(*id) {
            Some(&secs) => exprs.iter().all(|e| e.matches(secs as f64)),
            None => false,
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::length::{Comparator, parse_length_filters};

    fn id(s: &str) -> VideoId {
        VideoId::parse(s).unwrap()
    }

    fn durations(pairs: &[(&str, u64)]) -> HashMap<VideoId, u64> {
        pairs.iter().map(|(k, v)| (id(k), *v)).collect()
    }

    #[test]
    fn four_minute_boundaries() {
        let videos = vec![id("AAAAAAAAAAA")];
        let known = durations(&[("AAAAAAAAAAA", 290)]);

        let longer = parse_length_filters(&["+4m"]).unwrap();
        assert_eq!(filter_by_length(&videos, &known, &longer), videos);

        let shorter = parse_length_filters(&["-4m"]).unwrap();
        assert!(filter_by_length(&videos, &known, &shorter).is_empty());
    }

    #[test]
    fn unknown_duration_only_survives_without_filters() {
        let videos = vec![id("AAAAAAAAAAA"), id("BBBBBBBBBBB")];
        let known = durations(&[("AAAAAAAAAAA", 600)]);

        assert_eq!(filter_by_length(&videos, &known, &[]), videos);

        let exprs = vec![LengthExpr::new(Comparator::GreaterOrEqual, 0.0)];
        assert_eq!(
            filter_by_length(&videos, &known, &exprs),
            vec![id("AAAAAAAAAAA")]
        );
    }

    #[test]
    fn expressions_combine_with_and_and_keep_order() {
        let videos = vec![
            id("CCCCCCCCCCC"),
            id("AAAAAAAAAAA"),
            id("BBBBBBBBBBB"),
            id("DDDDDDDDDDD"),
        ];
        let known = durations(&[
            ("AAAAAAAAAAA", 400),
            ("BBBBBBBBBBB", 8000),
            ("CCCCCCCCCCC", 1000),
            ("DDDDDDDDDDD", 100),
        ]);
        let exprs = parse_length_filters(&["+5m,-2h"]).unwrap();

        assert_eq!(
            filter_by_length(&videos, &known, &exprs),
            vec![id("CCCCCCCCCCC"), id("AAAAAAAAAAA")]
        );
    }
}
